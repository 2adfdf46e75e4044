//! Sorted-set key layout shared by every store implementation.

use forum_domain::{Cid, Tid, Uid};

pub const ALL_CATEGORIES: &str = "categories:cid";
pub const ADMINISTRATORS: &str = "group:administrators:members";
pub const GLOBAL_MODERATORS: &str = "group:Global Moderators:members";
pub const TOPICS_BY_POST_COUNT: &str = "topics:posts";

pub const REGISTERED_USERS: &str = "registered-users";
pub const GUESTS: &str = "guests";

pub fn category_tids(cid: Cid) -> String {
	format!("cid:{cid}:tids")
}

pub fn category_tids_sorted(cid: Cid, suffix: &str) -> String {
	format!("cid:{cid}:tids:{suffix}")
}

pub fn category_tids_created(cid: Cid) -> String {
	category_tids_sorted(cid, "create")
}

pub fn category_pinned_tids(cid: Cid) -> String {
	category_tids_sorted(cid, "pinned")
}

pub fn category_pids(cid: Cid) -> String {
	format!("cid:{cid}:pids")
}

pub fn category_tag_topics(cid: Cid, tag: &str) -> String {
	format!("cid:{cid}:tag:{tag}:topics")
}

pub fn category_ignorers(cid: Cid) -> String {
	format!("cid:{cid}:ignorers")
}

pub fn category_readers(cid: Cid) -> String {
	format!("cid:{cid}:privileges:topics:read")
}

pub fn tag_topics(tag: &str) -> String {
	format!("tag:{tag}:topics")
}

pub fn topic_posts(tid: Tid) -> String {
	format!("tid:{tid}:posts")
}

pub fn topic_endorsed(tid: Tid) -> String {
	format!("topic:{tid}:endorsed")
}

pub fn followed_tids(uid: Uid) -> String {
	format!("uid:{uid}:followed_tids")
}

pub fn ignored_tids(uid: Uid) -> String {
	format!("uid:{uid}:ignored_tids")
}

pub fn read_tids(uid: Uid) -> String {
	format!("uid:{uid}:tids_read")
}

pub fn blocked_uids(uid: Uid) -> String {
	format!("uid:{uid}:blocked_uids")
}

pub fn following(uid: Uid) -> String {
	format!("following:{uid}")
}

pub fn following_remote(uid: Uid) -> String {
	format!("followingRemote:{uid}")
}

pub fn followers(uid: Uid) -> String {
	format!("followers:{uid}")
}

pub fn followers_remote(uid: Uid) -> String {
	format!("followersRemote:{uid}")
}
