//! Writes forum records together with the sorted-set entries a live forum keeps for them.

use serde_json::Value;

use forum_domain::{Cid, Pid, Tid, Uid};
use forum_storage::{
	ForumStore, keys,
	models::{PostRecord, TopicRecord, UserRecord},
};

use crate::Result;

#[derive(Debug, Clone)]
pub struct TopicFixture {
	record: TopicRecord,
}
impl TopicFixture {
	/// Owner defaults to uid 1; creation and last post time default to `tid * 1000`.
	pub fn new(tid: Tid, cid: Cid) -> Self {
		Self {
			record: TopicRecord {
				tid,
				uid: 1,
				cid,
				title: format!("Topic {tid}"),
				timestamp: tid * 1_000,
				last_post_time: tid * 1_000,
				post_count: 1,
				..Default::default()
			},
		}
	}

	pub fn owner(mut self, uid: Uid) -> Self {
		self.record.uid = uid;

		self
	}

	pub fn title(mut self, title: &str) -> Self {
		self.record.title = title.to_string();

		self
	}

	pub fn created(mut self, timestamp: i64) -> Self {
		self.record.timestamp = timestamp;

		self
	}

	pub fn last_post(mut self, timestamp: i64) -> Self {
		self.record.last_post_time = timestamp;

		self
	}

	pub fn posts(mut self, post_count: i64) -> Self {
		self.record.post_count = post_count;

		self
	}

	pub fn views(mut self, view_count: i64) -> Self {
		self.record.view_count = view_count;

		self
	}

	pub fn votes(mut self, upvotes: i64, downvotes: i64) -> Self {
		self.record.upvotes = upvotes;
		self.record.downvotes = downvotes;

		self
	}

	pub fn pinned(mut self) -> Self {
		self.record.pinned = true;

		self
	}

	pub fn pin_expiry(mut self, expiry: i64) -> Self {
		self.record.pinned = true;
		self.record.pin_expiry = Some(expiry);

		self
	}

	pub fn deleted(mut self) -> Self {
		self.record.deleted = true;

		self
	}

	pub fn tags(mut self, tags: &[&str]) -> Self {
		self.record.tags = tags.iter().map(|tag| (*tag).to_string()).collect();

		self
	}

	pub fn extra(mut self, field: &str, value: Value) -> Self {
		self.record.extra.insert(field.to_string(), value);

		self
	}

	pub fn build(self) -> TopicRecord {
		self.record
	}
}

/// Registers a category and grants `topics:read` to each listed uid or pseudo-group.
pub async fn seed_category(store: &dyn ForumStore, cid: Cid, readers: &[&str]) -> Result<()> {
	store.add(keys::ALL_CATEGORIES, cid as f64, &cid.to_string()).await?;

	let readers_key = keys::category_readers(cid);

	for reader in readers {
		store.add(&readers_key, 0.0, reader).await?;
	}

	Ok(())
}

pub async fn seed_public_category(store: &dyn ForumStore, cid: Cid) -> Result<()> {
	seed_category(store, cid, &[keys::REGISTERED_USERS, keys::GUESTS]).await
}

pub async fn seed_topic(store: &dyn ForumStore, topic: &TopicRecord) -> Result<()> {
	store.put_topic(topic).await?;

	let tid = topic.tid.to_string();
	let cid = topic.cid;
	let created = topic.timestamp as f64;
	let mut entries = vec![
		("topics:recent".to_string(), topic.last_post_time as f64),
		("topics:tid".to_string(), created),
		(keys::TOPICS_BY_POST_COUNT.to_string(), topic.post_count as f64),
		("topics:votes".to_string(), topic.votes() as f64),
		("topics:views".to_string(), topic.view_count as f64),
	];

	// Pinned topics leave the per-category sort sets while pinned.
	if topic.pinned {
		entries.push((keys::category_pinned_tids(cid), created));
	} else {
		entries.extend(topic.category_sort_entries());
	}

	for tag in &topic.tags {
		entries.push((keys::tag_topics(tag), created));
		entries.push((keys::category_tag_topics(cid, tag), created));
	}

	for (key, score) in entries {
		store.add(&key, score, &tid).await?;
	}

	Ok(())
}

pub async fn seed_topics(store: &dyn ForumStore, topics: &[TopicRecord]) -> Result<()> {
	for topic in topics {
		seed_topic(store, topic).await?;
	}

	Ok(())
}

/// Stores a reply and indexes it under its topic and category.
pub async fn seed_reply(
	store: &dyn ForumStore,
	cid: Cid,
	pid: Pid,
	tid: Tid,
	uid: Uid,
	timestamp: i64,
) -> Result<PostRecord> {
	let post = PostRecord { pid, tid, uid, timestamp, anonymous: false };
	let member = pid.to_string();

	store.put_post(&post).await?;
	store.add(&keys::topic_posts(tid), timestamp as f64, &member).await?;
	store.add(&keys::category_pids(cid), timestamp as f64, &member).await?;

	Ok(post)
}

pub async fn seed_user(store: &dyn ForumStore, uid: Uid, username: &str) -> Result<UserRecord> {
	let user = UserRecord {
		uid,
		username: username.to_string(),
		userslug: username.to_lowercase(),
		status: "online".to_string(),
		..Default::default()
	};

	store.put_user(&user).await?;

	Ok(user)
}

pub async fn make_admin(store: &dyn ForumStore, uid: Uid) -> Result<()> {
	store.add(keys::ADMINISTRATORS, 0.0, &uid.to_string()).await?;

	Ok(())
}

pub async fn make_global_moderator(store: &dyn ForumStore, uid: Uid) -> Result<()> {
	store.add(keys::GLOBAL_MODERATORS, 0.0, &uid.to_string()).await?;

	Ok(())
}
