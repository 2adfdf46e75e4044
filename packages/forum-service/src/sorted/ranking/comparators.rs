use std::{cmp::Ordering, sync::Arc};

use forum_domain::sort::SortKey;
use forum_storage::models::TopicRecord;

use super::admin_reply::AdminReplyMap;
use crate::TopicComparator;

type Compare = fn(&TopicRecord, &TopicRecord) -> Ordering;

/// Built-in ordering for a sort keyword; unknown keywords rank like `recent`.
pub(super) fn builtin(sort: &SortKey) -> TopicComparator {
	let compare: Compare = match sort {
		SortKey::Old => old,
		SortKey::Create => create,
		SortKey::Posts => posts,
		SortKey::Votes => votes,
		SortKey::Views => views,
		SortKey::Recent | SortKey::AdminReplied | SortKey::Custom(_) => recent,
	};

	Arc::new(compare)
}

/// Latest admin reply first, then most recently active.
pub(super) fn admin_replied(map: AdminReplyMap) -> TopicComparator {
	Arc::new(move |a: &TopicRecord, b: &TopicRecord| {
		let latest_a = map.get(&a.tid).copied().unwrap_or(0);
		let latest_b = map.get(&b.tid).copied().unwrap_or(0);

		latest_b.cmp(&latest_a).then_with(|| recent(a, b))
	})
}

fn recent(a: &TopicRecord, b: &TopicRecord) -> Ordering {
	b.last_post_time.cmp(&a.last_post_time)
}

fn old(a: &TopicRecord, b: &TopicRecord) -> Ordering {
	a.last_post_time.cmp(&b.last_post_time)
}

fn create(a: &TopicRecord, b: &TopicRecord) -> Ordering {
	b.timestamp.cmp(&a.timestamp)
}

fn posts(a: &TopicRecord, b: &TopicRecord) -> Ordering {
	b.post_count.cmp(&a.post_count).then_with(|| b.view_count.cmp(&a.view_count))
}

fn votes(a: &TopicRecord, b: &TopicRecord) -> Ordering {
	b.votes().cmp(&a.votes()).then_with(|| b.post_count.cmp(&a.post_count))
}

fn views(a: &TopicRecord, b: &TopicRecord) -> Ordering {
	b.view_count.cmp(&a.view_count)
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn topic(tid: i64) -> TopicRecord {
		TopicRecord { tid, ..Default::default() }
	}

	fn order(mut topics: Vec<TopicRecord>, compare: TopicComparator) -> Vec<i64> {
		topics.sort_by(|a, b| compare(a, b));

		topics.into_iter().map(|topic| topic.tid).collect()
	}

	#[test]
	fn votes_break_ties_on_post_count() {
		let p = TopicRecord { upvotes: 6, downvotes: 1, post_count: 2, ..topic(1) };
		let q = TopicRecord { upvotes: 5, post_count: 9, ..topic(2) };

		assert_eq!(order(vec![p, q], builtin(&SortKey::Votes)), vec![2, 1]);
	}

	#[test]
	fn posts_break_ties_on_views() {
		let a = TopicRecord { post_count: 4, view_count: 10, ..topic(1) };
		let b = TopicRecord { post_count: 4, view_count: 30, ..topic(2) };
		let c = TopicRecord { post_count: 7, ..topic(3) };

		assert_eq!(order(vec![a, b, c], builtin(&SortKey::Posts)), vec![3, 2, 1]);
	}

	#[test]
	fn unknown_keyword_ranks_like_recent() {
		let a = TopicRecord { last_post_time: 100, ..topic(1) };
		let b = TopicRecord { last_post_time: 300, ..topic(2) };

		assert_eq!(
			order(vec![a.clone(), b.clone()], builtin(&SortKey::Custom("hot".to_string()))),
			vec![2, 1]
		);
		assert_eq!(order(vec![b, a], builtin(&SortKey::Old)), vec![1, 2]);
	}

	#[test]
	fn admin_replies_rank_first_then_recent_activity() {
		let x = TopicRecord { last_post_time: 50, ..topic(1) };
		let y = TopicRecord { last_post_time: 90, ..topic(2) };
		let z = TopicRecord { last_post_time: 70, ..topic(3) };
		let map = HashMap::from([(1, 50), (2, 0)]);

		assert_eq!(order(vec![y, z, x], admin_replied(map)), vec![1, 2, 3]);
	}
}
