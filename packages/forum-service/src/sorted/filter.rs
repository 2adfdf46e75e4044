use std::collections::HashSet;

use forum_domain::{Cid, Tid, UNCATEGORIZED_CID, query::TopicQuery, sort::TopicFilter};
use forum_storage::{ExtraFields, models::TopicRecord};

use crate::{Result, TopicService};

impl TopicService {
	/// Applies read state, privileges, category ignores, blocks and scope, preserving order.
	pub(super) async fn filter_tids(&self, query: &TopicQuery, tids: Vec<Tid>) -> Result<Vec<Tid>> {
		let uid = query.uid;
		let signals = &self.collaborators.signals;
		let tids = match query.filter {
			Some(TopicFilter::New) => signals.filter_new_tids(&tids, uid).await?,
			Some(TopicFilter::Unreplied) => signals.filter_unreplied_tids(&tids).await?,
			Some(TopicFilter::Watched) | None => signals.filter_not_ignored_tids(&tids, uid).await?,
		};
		let tids = self.collaborators.privileges.filter_readable_tids(&tids, uid).await?;
		let topics: Vec<TopicRecord> =
			self.store.topics(&tids, ExtraFields::None).await?.into_iter().flatten().collect();
		let mut topic_cids: Vec<Cid> =
			topics.iter().map(|topic| topic.cid).filter(|cid| *cid != 0).collect();

		topic_cids.sort_unstable();
		topic_cids.dedup();

		let (ignored, unblocked) = futures::join!(
			self.ignored_cids(query, &topic_cids),
			signals.filter_blocked(uid, topics)
		);
		let ignored = ignored?;
		let tids: Vec<Tid> = unblocked?
			.iter()
			.filter(|topic| included(query, &ignored, topic))
			.map(|topic| topic.tid)
			.collect();

		match &self.extensions.filtered_tids {
			Some(hook) => hook.filter(query, tids).await,
			None => Ok(tids),
		}
	}

	async fn ignored_cids(&self, query: &TopicQuery, cids: &[Cid]) -> Result<HashSet<Cid>> {
		if query.cids.is_some() || query.is_watched() || self.cfg.disable_recent_category_filter {
			return Ok(HashSet::new());
		}

		let flags = self.collaborators.signals.ignored_categories(cids, query.uid).await?;

		Ok(cids.iter().zip(flags).filter(|(_, ignored)| *ignored).map(|(cid, _)| *cid).collect())
	}
}

fn included(query: &TopicQuery, ignored: &HashSet<Cid>, topic: &TopicRecord) -> bool {
	if topic.cid == 0 || ignored.contains(&topic.cid) {
		return false;
	}

	let in_scope = match &query.cids {
		Some(cids) => cids.contains(&topic.cid),
		None => topic.cid != UNCATEGORIZED_CID,
	};

	in_scope && query.tags.iter().all(|tag| topic.has_tag(tag))
}

#[cfg(test)]
mod tests {
	use forum_domain::query::SortedTopicsRequest;

	use super::*;

	fn topic(cid: Cid, tags: &[&str]) -> TopicRecord {
		TopicRecord {
			tid: 1,
			cid,
			tags: tags.iter().map(|tag| tag.to_string()).collect(),
			..Default::default()
		}
	}

	fn query(req: SortedTopicsRequest) -> TopicQuery {
		TopicQuery::try_from(req).expect("Valid request.")
	}

	#[test]
	fn uncategorized_topics_only_show_when_requested() {
		let none = HashSet::new();

		assert!(!included(&query(SortedTopicsRequest::new(1)), &none, &topic(-1, &[])));
		assert!(included(&query(SortedTopicsRequest::new(1).cids(vec![-1])), &none, &topic(-1, &[])));
		assert!(!included(&query(SortedTopicsRequest::new(1)), &none, &topic(0, &[])));
	}

	#[test]
	fn requested_tags_must_all_be_present() {
		let none = HashSet::new();
		let q = query(SortedTopicsRequest::new(1).tags(vec!["rust".to_string(), "async".to_string()]));

		assert!(included(&q, &none, &topic(2, &["async", "rust", "tokio"])));
		assert!(!included(&q, &none, &topic(2, &["rust"])));
	}

	#[test]
	fn ignored_and_out_of_scope_categories_are_dropped() {
		let ignored = HashSet::from([3]);

		assert!(!included(&query(SortedTopicsRequest::new(1)), &ignored, &topic(3, &[])));
		assert!(!included(&query(SortedTopicsRequest::new(1).cids(vec![2])), &ignored, &topic(4, &[])));
	}
}
