//! Default collaborators answered from the forum's own sorted sets and records.

use std::{collections::HashSet, sync::Arc};

use futures::future;

use forum_domain::{Cid, Pid, Tid, Uid};
use forum_storage::{BoxFuture, ExtraFields, ForumStore, Order, keys, models::TopicRecord};

use crate::{PinExpiry, PrivilegeGate, Result, TopicSignals, now_ms};

pub struct StoreCollaborators {
	store: Arc<dyn ForumStore>,
}
impl StoreCollaborators {
	pub fn new(store: Arc<dyn ForumStore>) -> Self {
		Self { store }
	}

	async fn administrator(&self, uid: Uid) -> Result<bool> {
		if uid <= 0 {
			return Ok(false);
		}

		Ok(self.store.is_member(keys::ADMINISTRATORS, &uid.to_string()).await?)
	}

	/// A category is readable when the actor, or the pseudo-group they fall in, holds
	/// `topics:read` on it.
	async fn category_readable(&self, cid: Cid, uid: Uid) -> Result<bool> {
		let group = if uid > 0 { keys::REGISTERED_USERS } else { keys::GUESTS };
		let members = vec![uid.to_string(), group.to_string()];
		let scores = self.store.scores(&keys::category_readers(cid), &members).await?;

		Ok(scores.iter().any(Option::is_some))
	}

	async fn readable_of(&self, cids: &[Cid], uid: Uid) -> Result<Vec<Cid>> {
		if self.administrator(uid).await? {
			return Ok(cids.to_vec());
		}

		let checks = future::join_all(cids.iter().map(|cid| self.category_readable(*cid, uid))).await;
		let mut readable = Vec::with_capacity(cids.len());

		for (cid, check) in cids.iter().zip(checks) {
			if check? {
				readable.push(*cid);
			}
		}

		Ok(readable)
	}

	async fn all_readable(&self, uid: Uid) -> Result<Vec<Cid>> {
		let keys = [keys::ALL_CATEGORIES.to_string()];
		let cids = parse_ids(self.store.range(&keys, 0, -1, Order::Asc).await?);

		self.readable_of(&cids, uid).await
	}

	async fn readable_tids(&self, tids: &[Tid], uid: Uid) -> Result<Vec<Tid>> {
		let topics = self.store.topics(tids, ExtraFields::None).await?;
		let administrator = self.administrator(uid).await?;
		let mut cids: Vec<Cid> = topics.iter().flatten().map(|topic| topic.cid).collect();

		cids.sort_unstable();
		cids.dedup();

		let readable: HashSet<Cid> = self.readable_of(&cids, uid).await?.into_iter().collect();

		Ok(topics
			.iter()
			.flatten()
			.filter(|topic| readable.contains(&topic.cid))
			.filter(|topic| !topic.deleted || administrator || (uid > 0 && topic.uid == uid))
			.map(|topic| topic.tid)
			.collect())
	}

	async fn endorser(&self, uid: Uid) -> Result<bool> {
		if uid <= 0 {
			return Ok(false);
		}

		let groups = [keys::ADMINISTRATORS.to_string(), keys::GLOBAL_MODERATORS.to_string()];
		let memberships = self.store.is_member_of_sets(&groups, &uid.to_string()).await?;

		Ok(memberships.into_iter().any(|member| member))
	}

	/// Unpins topics whose pin has expired and returns the tids still pinned.
	async fn unexpired_pins(&self, tids: &[Tid]) -> Result<Vec<Tid>> {
		let now = now_ms();
		let topics = self.store.topics(tids, ExtraFields::All).await?;
		let mut expired = HashSet::new();

		for topic in topics.into_iter().flatten() {
			if topic.pin_expiry.is_some_and(|expiry| expiry <= now) {
				expired.insert(topic.tid);
				self.unpin(topic).await?;
			}
		}

		Ok(tids.iter().copied().filter(|tid| !expired.contains(tid)).collect())
	}

	/// Moves a topic from its category's pinned set back into the category sort sets.
	async fn unpin(&self, mut topic: TopicRecord) -> Result<()> {
		let member = topic.tid.to_string();

		topic.pinned = false;
		topic.pin_expiry = None;

		self.store.put_topic(&topic).await?;
		self.store.remove(&keys::category_pinned_tids(topic.cid), &member).await?;

		for (key, score) in topic.category_sort_entries() {
			self.store.add(&key, score, &member).await?;
		}

		tracing::info!(tid = topic.tid, cid = topic.cid, "Expired pin removed.");

		Ok(())
	}

	/// Keeps tids whose presence in `key` matches `present`.
	async fn by_membership(&self, key: &str, tids: &[Tid], present: bool) -> Result<Vec<Tid>> {
		let scores = self.store.scores(key, &members(tids)).await?;

		Ok(tids
			.iter()
			.zip(scores)
			.filter(|(_, score)| score.is_some() == present)
			.map(|(tid, _)| *tid)
			.collect())
	}

	async fn ignored(&self, cids: &[Cid], uid: Uid) -> Result<Vec<bool>> {
		if uid <= 0 {
			return Ok(vec![false; cids.len()]);
		}

		let member = uid.to_string();
		let ignorer_keys: Vec<String> = cids.iter().map(|cid| keys::category_ignorers(*cid)).collect();
		let checks =
			future::join_all(ignorer_keys.iter().map(|key| self.store.is_member(key, &member)))
				.await;

		let mut ignored = Vec::with_capacity(cids.len());

		for check in checks {
			ignored.push(check?);
		}

		Ok(ignored)
	}

	async fn unblocked(&self, uid: Uid, mut topics: Vec<TopicRecord>) -> Result<Vec<TopicRecord>> {
		if uid <= 0 {
			return Ok(topics);
		}

		let keys = [keys::blocked_uids(uid)];
		let blocked: HashSet<Uid> =
			parse_ids(self.store.range(&keys, 0, -1, Order::Desc).await?).into_iter().collect();

		topics.retain(|topic| !blocked.contains(&topic.uid));

		Ok(topics)
	}

	async fn unreplied(&self, tids: &[Tid]) -> Result<Vec<Tid>> {
		let scores = self.store.scores(keys::TOPICS_BY_POST_COUNT, &members(tids)).await?;

		Ok(tids
			.iter()
			.zip(scores)
			.filter(|(_, score)| score.is_some_and(|posts| posts <= 1.0))
			.map(|(tid, _)| *tid)
			.collect())
	}
}

impl PrivilegeGate for StoreCollaborators {
	fn filter_readable_tids<'a>(
		&'a self,
		tids: &'a [Tid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<Tid>>> {
		Box::pin(self.readable_tids(tids, uid))
	}

	fn filter_readable_cids<'a>(
		&'a self,
		cids: &'a [Cid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<Cid>>> {
		Box::pin(self.readable_of(cids, uid))
	}

	fn readable_cids<'a>(&'a self, uid: Uid) -> BoxFuture<'a, Result<Vec<Cid>>> {
		Box::pin(self.all_readable(uid))
	}

	fn is_administrator<'a>(&'a self, uid: Uid) -> BoxFuture<'a, Result<bool>> {
		Box::pin(self.administrator(uid))
	}

	fn can_endorse<'a>(&'a self, _pid: Pid, uid: Uid) -> BoxFuture<'a, Result<bool>> {
		Box::pin(self.endorser(uid))
	}
}

impl PinExpiry for StoreCollaborators {
	fn filter_expired_pins<'a>(&'a self, tids: &'a [Tid]) -> BoxFuture<'a, Result<Vec<Tid>>> {
		Box::pin(self.unexpired_pins(tids))
	}
}

impl TopicSignals for StoreCollaborators {
	fn filter_watched_tids<'a>(
		&'a self,
		tids: &'a [Tid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<Tid>>> {
		Box::pin(async move {
			if uid <= 0 {
				return Ok(Vec::new());
			}

			self.by_membership(&keys::followed_tids(uid), tids, true).await
		})
	}

	fn ignored_categories<'a>(
		&'a self,
		cids: &'a [Cid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<bool>>> {
		Box::pin(self.ignored(cids, uid))
	}

	fn filter_blocked<'a>(
		&'a self,
		uid: Uid,
		topics: Vec<TopicRecord>,
	) -> BoxFuture<'a, Result<Vec<TopicRecord>>> {
		Box::pin(self.unblocked(uid, topics))
	}

	fn filter_new_tids<'a>(&'a self, tids: &'a [Tid], uid: Uid) -> BoxFuture<'a, Result<Vec<Tid>>> {
		Box::pin(async move {
			if uid <= 0 {
				return Ok(Vec::new());
			}

			self.by_membership(&keys::read_tids(uid), tids, false).await
		})
	}

	fn filter_unreplied_tids<'a>(&'a self, tids: &'a [Tid]) -> BoxFuture<'a, Result<Vec<Tid>>> {
		Box::pin(self.unreplied(tids))
	}

	fn filter_not_ignored_tids<'a>(
		&'a self,
		tids: &'a [Tid],
		uid: Uid,
	) -> BoxFuture<'a, Result<Vec<Tid>>> {
		Box::pin(async move {
			if uid <= 0 {
				return Ok(tids.to_vec());
			}

			self.by_membership(&keys::ignored_tids(uid), tids, false).await
		})
	}
}

pub(crate) fn members(ids: &[i64]) -> Vec<String> {
	ids.iter().map(i64::to_string).collect()
}

/// Parses sorted-set members back into ids, skipping anything that is not an integer.
pub(crate) fn parse_ids(members: Vec<String>) -> Vec<i64> {
	members.into_iter().filter_map(|member| member.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_ids_skips_foreign_members() {
		let members = vec!["3".to_string(), "remote@example.org".to_string(), "-1".to_string()];

		assert_eq!(parse_ids(members), vec![3, -1]);
	}

	#[test]
	fn members_render_ids() {
		assert_eq!(members(&[1, 20]), vec!["1".to_string(), "20".to_string()]);
	}
}
