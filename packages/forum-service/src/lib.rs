pub mod authors;
pub mod collaborators;
pub mod endorsements;
pub mod extensions;
pub mod follow;
pub mod sorted;

mod error;

pub use collaborators::StoreCollaborators;
pub use endorsements::{EndorseResponse, UnendorseResponse};
pub use error::{Error, Result};
pub use extensions::{
	Extensions, FilteredTidsHook, SelectorOverride, SortOptions, SortOptionsHook, TopicComparator,
};
pub use sorted::{SortedTopics, TopicListing};

use std::sync::Arc;

use forum_config::Topics;
use forum_domain::{Cid, Pid, Tid, Uid};
use forum_storage::{BoxFuture, ForumStore, models::TopicRecord};

/// Answers "may this actor do that" for topics, categories and posts.
pub trait PrivilegeGate
where
	Self: Send + Sync,
{
	/// Keeps the tids the actor may read (`topics:read`), preserving input order.
	fn filter_readable_tids<'a>(
		&'a self,
		tids: &'a [Tid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<Tid>>>;

	fn filter_readable_cids<'a>(
		&'a self,
		cids: &'a [Cid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<Cid>>>;

	/// Every category the actor may read topics in.
	fn readable_cids<'a>(&'a self, uid: Uid) -> BoxFuture<'a, Result<Vec<Cid>>>;

	fn is_administrator<'a>(&'a self, uid: Uid) -> BoxFuture<'a, Result<bool>>;

	fn can_endorse<'a>(&'a self, pid: Pid, uid: Uid) -> BoxFuture<'a, Result<bool>>;
}

pub trait PinExpiry
where
	Self: Send + Sync,
{
	/// Drops pinned tids whose pin has expired. Expired topics list as regular topics afterwards.
	fn filter_expired_pins<'a>(&'a self, tids: &'a [Tid]) -> BoxFuture<'a, Result<Vec<Tid>>>;
}

/// Per-actor read state, watch lists, ignores and blocks.
pub trait TopicSignals
where
	Self: Send + Sync,
{
	fn filter_watched_tids<'a>(
		&'a self,
		tids: &'a [Tid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<Tid>>>;

	/// One flag per requested cid, true where the actor ignores the category.
	fn ignored_categories<'a>(
		&'a self,
		cids: &'a [Cid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<bool>>>;

	/// Drops topics authored by users the actor has blocked.
	fn filter_blocked<'a>(
		&'a self,
		uid: Uid,
		topics: Vec<TopicRecord>,
	) -> BoxFuture<'a, Result<Vec<TopicRecord>>>;

	fn filter_new_tids<'a>(&'a self, tids: &'a [Tid], uid: Uid) -> BoxFuture<'a, Result<Vec<Tid>>>;

	fn filter_unreplied_tids<'a>(&'a self, tids: &'a [Tid]) -> BoxFuture<'a, Result<Vec<Tid>>>;

	fn filter_not_ignored_tids<'a>(
		&'a self,
		tids: &'a [Tid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<Tid>>>;
}

#[derive(Clone)]
pub struct Collaborators {
	pub privileges: Arc<dyn PrivilegeGate>,
	pub pins: Arc<dyn PinExpiry>,
	pub signals: Arc<dyn TopicSignals>,
}
impl Collaborators {
	pub fn new(
		privileges: Arc<dyn PrivilegeGate>,
		pins: Arc<dyn PinExpiry>,
		signals: Arc<dyn TopicSignals>,
	) -> Self {
		Self { privileges, pins, signals }
	}

	/// Every collaborator answered from the forum's own sorted sets.
	pub fn from_store(store: Arc<dyn ForumStore>) -> Self {
		let collaborators = Arc::new(StoreCollaborators::new(store));

		Self { privileges: collaborators.clone(), pins: collaborators.clone(), signals: collaborators }
	}
}

pub struct TopicService {
	pub cfg: Topics,
	pub store: Arc<dyn ForumStore>,
	pub collaborators: Collaborators,
	pub extensions: Extensions,
}
impl TopicService {
	pub fn new(cfg: Topics, store: Arc<dyn ForumStore>) -> Self {
		let collaborators = Collaborators::from_store(store.clone());

		Self { cfg, store, collaborators, extensions: Extensions::default() }
	}

	pub fn with_collaborators(
		cfg: Topics,
		store: Arc<dyn ForumStore>,
		collaborators: Collaborators,
	) -> Self {
		Self { cfg, store, collaborators, extensions: Extensions::default() }
	}

	pub fn with_extensions(mut self, extensions: Extensions) -> Self {
		self.extensions = extensions;

		self
	}

	pub(crate) fn recent_max_topics(&self) -> usize {
		self.cfg.recent_max_topics as usize
	}
}

/// Current wall clock time in milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> i64 {
	(time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
