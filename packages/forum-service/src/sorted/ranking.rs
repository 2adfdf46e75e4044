mod admin_reply;
mod comparators;

use forum_domain::{Tid, query::TopicQuery, sort::SortKey};
use forum_storage::{ExtraFields, models::TopicRecord};

use crate::{Result, SortOptions, TopicComparator, TopicService, now_ms};

impl TopicService {
	/// Orders candidates by the requested sort. Topics that fail to hydrate are dropped.
	pub(super) async fn rank(&self, query: &TopicQuery, tids: Vec<Tid>) -> Result<Vec<Tid>> {
		if keeps_selection_order(query) {
			return Ok(tids);
		}

		let mut options = SortOptions::default();

		if let Some(hook) = &self.extensions.sort_options {
			hook.extend(query, &mut options);
		}

		let hydrated = self.store.topics(&tids, ExtraFields::Only(&options.extra_fields)).await?;
		let mut topics: Vec<TopicRecord> = hydrated.into_iter().flatten().collect();
		let compare: TopicComparator = match options.comparators.get(query.sort.as_str()) {
			Some(compare) => compare.clone(),
			None if query.sort.is_admin_replied() =>
				comparators::admin_replied(self.admin_reply_map(&topics).await),
			None => comparators::builtin(&query.sort),
		};

		if query.float_pinned || query.selects_pinned() {
			let now = now_ms();

			topics.sort_by(|a, b| {
				b.pinned_at(now).cmp(&a.pinned_at(now)).then_with(|| compare(a, b))
			});
		} else {
			topics.sort_by(|a, b| compare(a, b));
		}

		tracing::debug!(sort = %query.sort, ranked = topics.len(), "Candidates ranked.");

		Ok(topics.into_iter().map(|topic| topic.tid).collect())
	}
}

/// True when the selector already produced the final order.
fn keeps_selection_order(query: &TopicQuery) -> bool {
	let unscoped = query.term.is_all_time()
		&& query.cids.is_none()
		&& query.tags.is_empty()
		&& !query.is_watched()
		&& !query.float_pinned
		&& !query.sort.is_admin_replied();

	unscoped || (query.sort == SortKey::Posts && !query.term.is_all_time())
}

#[cfg(test)]
mod tests {
	use forum_domain::query::SortedTopicsRequest;

	use super::*;

	fn query(req: SortedTopicsRequest) -> TopicQuery {
		TopicQuery::try_from(req).expect("Valid request.")
	}

	#[test]
	fn plain_global_listing_keeps_selection_order() {
		assert!(keeps_selection_order(&query(SortedTopicsRequest::new(1).sort("votes"))));
		assert!(keeps_selection_order(&query(
			SortedTopicsRequest::new(1).sort("posts").term("week").cids(vec![2])
		)));
	}

	#[test]
	fn scoped_or_derived_listings_are_reranked() {
		assert!(!keeps_selection_order(&query(SortedTopicsRequest::new(1).cids(vec![2]))));
		assert!(!keeps_selection_order(&query(SortedTopicsRequest::new(1).float_pinned(true))));
		assert!(!keeps_selection_order(&query(SortedTopicsRequest::new(1).sort("admin-replied"))));
		assert!(!keeps_selection_order(&query(SortedTopicsRequest::new(1).filter("watched"))));
		assert!(!keeps_selection_order(&query(SortedTopicsRequest::new(1).term("day"))));
	}
}
