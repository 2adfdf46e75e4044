use std::{future::Future, pin::Pin};

use forum_domain::{Pid, Tid, Uid, sort::SortKey};

use crate::{
	Result,
	models::{Endorsement, PostRecord, TopicRecord, UserCounter, UserRecord},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
	Asc,
	Desc,
}
impl Order {
	pub fn for_sort(sort: &SortKey) -> Self {
		if sort.is_ascending() { Self::Asc } else { Self::Desc }
	}
}

/// Inclusive score bounds plus an optional page inside the matching members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
	pub min: f64,
	pub max: f64,
	pub offset: usize,
	pub count: Option<usize>,
}
impl ScoreRange {
	pub fn at_least(min: f64) -> Self {
		Self { min, max: f64::INFINITY, offset: 0, count: None }
	}

	pub fn limit(mut self, count: usize) -> Self {
		self.count = Some(count);

		self
	}
}

/// Weighted intersection. A member's score is the weighted sum of its scores in every set.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersect {
	pub sets: Vec<String>,
	pub weights: Vec<f64>,
	pub start: usize,
	pub stop: i64,
	pub order: Order,
}
impl Intersect {
	/// Scores come from the first set only; the remaining sets act as membership filters.
	pub fn scored_by_first(sets: Vec<String>, start: usize, stop: i64, order: Order) -> Self {
		let weights = (0..sets.len()).map(|idx| if idx == 0 { 1.0 } else { 0.0 }).collect();

		Self { sets, weights, start, stop, order }
	}

	pub(crate) fn weight(&self, idx: usize) -> f64 {
		self.weights.get(idx).copied().unwrap_or(1.0)
	}
}

/// Which open-ended topic fields to hydrate alongside the core record.
#[derive(Debug, Clone, Copy)]
pub enum ExtraFields<'a> {
	None,
	Only(&'a [String]),
	All,
}
impl ExtraFields<'_> {
	pub(crate) fn keeps(&self, field: &str) -> bool {
		match self {
			Self::None => false,
			Self::Only(fields) => fields.iter().any(|value| value == field),
			Self::All => true,
		}
	}
}

/// Key/value store with per-key scored membership plus forum record hydration.
///
/// Positional ranges are zero-based and inclusive; a negative `stop` reads to the end. Ranges
/// over several keys read their union, summing the scores of shared members. Members with equal
/// scores are ordered by member value.
pub trait ForumStore
where
	Self: Send + Sync,
{
	fn range<'a>(
		&'a self,
		keys: &'a [String],
		start: usize,
		stop: i64,
		order: Order,
	) -> BoxFuture<'a, Result<Vec<String>>>;

	fn range_by_score<'a>(
		&'a self,
		keys: &'a [String],
		order: Order,
		range: ScoreRange,
	) -> BoxFuture<'a, Result<Vec<String>>>;

	fn intersect<'a>(&'a self, query: &'a Intersect) -> BoxFuture<'a, Result<Vec<String>>>;

	fn scores<'a>(
		&'a self,
		key: &'a str,
		members: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Option<f64>>>>;

	fn is_member<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>>;

	fn is_member_of_sets<'a>(
		&'a self,
		keys: &'a [String],
		member: &'a str,
	) -> BoxFuture<'a, Result<Vec<bool>>>;

	fn card<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>>;

	fn add<'a>(&'a self, key: &'a str, score: f64, member: &'a str) -> BoxFuture<'a, Result<()>>;

	fn remove<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>>;

	/// One entry per requested tid, `None` where the topic does not exist.
	fn topics<'a>(
		&'a self,
		tids: &'a [Tid],
		extra: ExtraFields<'a>,
	) -> BoxFuture<'a, Result<Vec<Option<TopicRecord>>>>;

	fn put_topic<'a>(&'a self, topic: &'a TopicRecord) -> BoxFuture<'a, Result<()>>;

	fn set_topic_endorsed<'a>(&'a self, tid: Tid, endorsed: bool) -> BoxFuture<'a, Result<()>>;

	fn posts<'a>(&'a self, pids: &'a [Pid]) -> BoxFuture<'a, Result<Vec<Option<PostRecord>>>>;

	fn put_post<'a>(&'a self, post: &'a PostRecord) -> BoxFuture<'a, Result<()>>;

	fn users<'a>(&'a self, uids: &'a [Uid]) -> BoxFuture<'a, Result<Vec<Option<UserRecord>>>>;

	fn put_user<'a>(&'a self, user: &'a UserRecord) -> BoxFuture<'a, Result<()>>;

	fn set_user_counter<'a>(
		&'a self,
		uid: Uid,
		counter: UserCounter,
		value: i64,
	) -> BoxFuture<'a, Result<()>>;

	fn endorsement<'a>(&'a self, pid: Pid) -> BoxFuture<'a, Result<Option<Endorsement>>>;

	fn put_endorsement<'a>(
		&'a self,
		pid: Pid,
		endorsement: &'a Endorsement,
	) -> BoxFuture<'a, Result<()>>;

	fn delete_endorsement<'a>(&'a self, pid: Pid) -> BoxFuture<'a, Result<()>>;
}

/// Number of members a positional range may return, `None` when unbounded.
pub(crate) fn positional_count(start: usize, stop: i64) -> Option<usize> {
	if stop < 0 {
		return None;
	}

	let stop = stop as usize;

	Some(if stop < start { 0 } else { stop - start + 1 })
}
