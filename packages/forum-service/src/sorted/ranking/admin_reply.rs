use std::collections::{HashMap, HashSet};

use futures::future;

use forum_domain::{Pid, Tid, Uid};
use forum_storage::{Order, keys, models::TopicRecord};

use crate::{Result, TopicService, collaborators::parse_ids};

/// Latest administrator reply timestamp per topic, `0` when there is none.
pub(super) type AdminReplyMap = HashMap<Tid, i64>;

impl TopicService {
	/// Never fails: a broken derivation ranks every topic as if no admin had replied.
	pub(super) async fn admin_reply_map(&self, topics: &[TopicRecord]) -> AdminReplyMap {
		match self.derive_admin_replies(topics).await {
			Ok(map) => map,
			Err(err) => {
				tracing::warn!(error = %err, "Admin reply derivation failed. Ranking without it.");

				AdminReplyMap::new()
			},
		}
	}

	async fn derive_admin_replies(&self, topics: &[TopicRecord]) -> Result<AdminReplyMap> {
		let mut tids: Vec<Tid> = topics.iter().map(|topic| topic.tid).collect();

		tids.sort_unstable();
		tids.dedup();

		let window_stop = self.cfg.admin_reply_window as i64 - 1;
		let reply_sets: Vec<[String; 1]> = tids.iter().map(|tid| [keys::topic_posts(*tid)]).collect();
		let ranges = future::join_all(
			reply_sets.iter().map(|sets| self.store.range(sets, 0, window_stop, Order::Desc)),
		)
		.await;
		let mut replies: Vec<(Tid, Vec<Pid>)> = Vec::with_capacity(tids.len());

		for (tid, range) in tids.iter().zip(ranges) {
			replies.push((*tid, parse_ids(range?)));
		}

		let mut pids: Vec<Pid> = replies.iter().flat_map(|(_, pids)| pids.iter().copied()).collect();

		pids.sort_unstable();
		pids.dedup();

		let posts: HashMap<Pid, (Uid, i64)> = self
			.store
			.posts(&pids)
			.await?
			.into_iter()
			.flatten()
			.map(|post| (post.pid, (post.uid, post.timestamp)))
			.collect();
		let admins = self.administrators(posts.values().map(|(uid, _)| *uid)).await;

		tracing::debug!(
			topics = tids.len(),
			replies = pids.len(),
			admins = admins.len(),
			"Admin reply window scanned."
		);

		Ok(replies
			.into_iter()
			.map(|(tid, pids)| {
				let latest = pids
					.iter()
					.filter_map(|pid| posts.get(pid))
					.filter(|(uid, _)| admins.contains(uid))
					.map(|(_, timestamp)| *timestamp)
					.fold(0, i64::max);

				(tid, latest)
			})
			.collect())
	}

	/// Distinct authors that hold administrator status. A failed check counts as not admin.
	async fn administrators(&self, uids: impl Iterator<Item = Uid>) -> HashSet<Uid> {
		let mut uids: Vec<Uid> = uids.filter(|uid| *uid > 0).collect();

		uids.sort_unstable();
		uids.dedup();

		let privileges = &self.collaborators.privileges;
		let checks = future::join_all(uids.iter().map(|uid| privileges.is_administrator(*uid))).await;

		uids.into_iter()
			.zip(checks)
			.filter_map(|(uid, check)| match check {
				Ok(true) => Some(uid),
				Ok(false) => None,
				Err(err) => {
					tracing::warn!(uid, error = %err, "Administrator check failed. Treating as non-admin.");

					None
				},
			})
			.collect()
	}
}
