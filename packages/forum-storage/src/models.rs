use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use forum_domain::{Cid, Pid, Tid, Uid};

use crate::keys;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
	pub tid: Tid,
	pub uid: Uid,
	pub cid: Cid,
	pub title: String,
	/// Creation time in milliseconds.
	pub timestamp: i64,
	#[serde(rename = "lastposttime")]
	pub last_post_time: i64,
	#[serde(rename = "postcount")]
	pub post_count: i64,
	#[serde(rename = "viewcount")]
	pub view_count: i64,
	pub upvotes: i64,
	pub downvotes: i64,
	pub pinned: bool,
	#[serde(rename = "pinExpiry", default, skip_serializing_if = "Option::is_none")]
	pub pin_expiry: Option<i64>,
	pub deleted: bool,
	pub endorsed: bool,
	pub tags: Vec<String>,
	/// Fields outside the core record, only populated when requested.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl TopicRecord {
	pub fn votes(&self) -> i64 {
		self.upvotes - self.downvotes
	}

	pub fn has_tag(&self, tag: &str) -> bool {
		self.tags.iter().any(|value| value == tag)
	}

	/// Pinned with no expiry, or an expiry still ahead of `now` (ms).
	pub fn pinned_at(&self, now: i64) -> bool {
		self.pinned && self.pin_expiry.is_none_or(|expiry| expiry > now)
	}

	/// Per-category sort sets an unpinned topic is listed in, with its score in each.
	pub fn category_sort_entries(&self) -> Vec<(String, f64)> {
		let cid = self.cid;

		vec![
			(keys::category_tids(cid), self.last_post_time as f64),
			(keys::category_tids_created(cid), self.timestamp as f64),
			(keys::category_tids_sorted(cid, "posts"), self.post_count as f64),
			(keys::category_tids_sorted(cid, "votes"), self.votes() as f64),
			(keys::category_tids_sorted(cid, "views"), self.view_count as f64),
		]
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
	pub pid: Pid,
	pub tid: Tid,
	pub uid: Uid,
	pub timestamp: i64,
	#[serde(default)]
	pub anonymous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
	pub uid: Uid,
	pub username: String,
	pub userslug: String,
	pub picture: String,
	pub status: String,
	#[serde(rename = "followerCount")]
	pub follower_count: i64,
	#[serde(rename = "followingCount")]
	pub following_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
	pub endorsed: bool,
	#[serde(rename = "endorsedBy")]
	pub endorsed_by: Uid,
	#[serde(rename = "endorsedAt")]
	pub endorsed_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCounter {
	Followers,
	Following,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pins_lapse_at_their_expiry() {
		let open = TopicRecord { pinned: true, ..Default::default() };
		let timed = TopicRecord { pinned: true, pin_expiry: Some(1_000), ..Default::default() };

		assert!(open.pinned_at(5_000));
		assert!(timed.pinned_at(999));
		assert!(!timed.pinned_at(1_000));
		assert!(!TopicRecord::default().pinned_at(0));
	}

	#[test]
	fn category_sort_entries_score_each_sort() {
		let topic = TopicRecord {
			cid: 4,
			timestamp: 10,
			last_post_time: 20,
			post_count: 3,
			view_count: 7,
			upvotes: 5,
			downvotes: 1,
			..Default::default()
		};

		assert_eq!(topic.category_sort_entries(), vec![
			("cid:4:tids".to_string(), 20.0),
			("cid:4:tids:create".to_string(), 10.0),
			("cid:4:tids:posts".to_string(), 3.0),
			("cid:4:tids:votes".to_string(), 4.0),
			("cid:4:tids:views".to_string(), 7.0),
		]);
	}
}
