use std::collections::{HashMap, HashSet};

use futures::future;

use forum_domain::{Cid, Pid, Tid, UNCATEGORIZED_CID, query::TopicQuery, sort::SortKey};
use forum_storage::{Intersect, Order, ScoreRange, keys};

use crate::{Result, TopicService, collaborators::parse_ids, now_ms};

impl TopicService {
	/// Resolves the candidate tids for a query. Duplicates are possible when a tid is both
	/// pinned and present in a category sort set.
	pub(super) async fn select_candidates(&self, query: &TopicQuery) -> Result<Vec<Tid>> {
		if let Some(selector) = &self.extensions.selector
			&& let Some(tids) = selector.select(query).await?
		{
			return Ok(tids);
		}

		if let Some(window) = query.term.window_ms() {
			let since = now_ms() - window;
			let tids = if query.sort == SortKey::Posts {
				self.most_posts_in_term(query, since).await?
			} else {
				self.created_in_term(query, since).await?
			};

			if query.is_watched() {
				return self.collaborators.signals.filter_watched_tids(&tids, query.uid).await;
			}

			return Ok(tids);
		}
		if query.is_watched() {
			return self.watched_tids(query).await;
		}
		if let Some(cids) = &query.cids {
			return self.category_tids(query, cids).await;
		}
		if !query.tags.is_empty() {
			return self.tagged_tids(query).await;
		}

		let sets = [query.sort.global_set().to_string()];
		let tids = self.store.range(&sets, 0, self.last_rank(), Order::for_sort(&query.sort)).await?;

		Ok(parse_ids(tids))
	}

	/// Inclusive stop that caps a positional range at `recent_max_topics`.
	fn last_rank(&self) -> i64 {
		self.recent_max_topics() as i64 - 1
	}

	/// Requested categories the actor may read, or every readable real category.
	async fn term_cids(&self, query: &TopicQuery) -> Result<Vec<Cid>> {
		let privileges = &self.collaborators.privileges;

		match &query.cids {
			Some(cids) => privileges.filter_readable_cids(cids, query.uid).await,
			None => Ok(privileges
				.readable_cids(query.uid)
				.await?
				.into_iter()
				.filter(|cid| *cid != UNCATEGORIZED_CID)
				.collect()),
		}
	}

	async fn created_in_term(&self, query: &TopicQuery, since: i64) -> Result<Vec<Tid>> {
		let cids = self.term_cids(query).await?;
		let sets: Vec<String> = cids.iter().map(|cid| keys::category_tids_created(*cid)).collect();
		let tids =
			self.store.range_by_score(&sets, Order::Desc, ScoreRange::at_least(since as f64)).await?;

		Ok(parse_ids(tids))
	}

	/// Ranks topics by how many of the window's recent replies landed in them.
	async fn most_posts_in_term(&self, query: &TopicQuery, since: i64) -> Result<Vec<Tid>> {
		let cids = self.term_cids(query).await?;
		let sets: Vec<String> = cids.iter().map(|cid| keys::category_pids(*cid)).collect();
		let range =
			ScoreRange::at_least(since as f64).limit(self.cfg.posts_in_term_limit as usize);
		let pids: Vec<Pid> =
			parse_ids(self.store.range_by_score(&sets, Order::Desc, range).await?);
		let posts = self.store.posts(&pids).await?;
		let mut counts: HashMap<Tid, usize> = HashMap::new();
		let mut tids = Vec::new();

		for post in posts.iter().flatten() {
			let count = counts.entry(post.tid).or_insert(0);

			if *count == 0 {
				tids.push(post.tid);
			}

			*count += 1;
		}

		tids.sort_by(|a, b| counts[b].cmp(&counts[a]));

		Ok(tids)
	}

	async fn watched_tids(&self, query: &TopicQuery) -> Result<Vec<Tid>> {
		let sets = vec![query.sort.global_set().to_string(), keys::followed_tids(query.uid)];
		let intersect =
			Intersect::scored_by_first(sets, 0, self.last_rank(), Order::for_sort(&query.sort));

		Ok(parse_ids(self.store.intersect(&intersect).await?))
	}

	async fn tagged_tids(&self, query: &TopicQuery) -> Result<Vec<Tid>> {
		let sets = std::iter::once(query.sort.global_set().to_string())
			.chain(query.tags.iter().map(|tag| keys::tag_topics(tag)))
			.collect();
		let intersect =
			Intersect::scored_by_first(sets, 0, self.last_rank(), Order::for_sort(&query.sort));

		Ok(parse_ids(self.store.intersect(&intersect).await?))
	}

	async fn category_tids(&self, query: &TopicQuery, cids: &[Cid]) -> Result<Vec<Tid>> {
		if !query.tags.is_empty() {
			return self.category_tagged_tids(&query.tags, cids).await;
		}

		let sets: Vec<String> = cids
			.iter()
			.map(|cid| match query.sort.category_set_suffix() {
				Some(suffix) => keys::category_tids_sorted(*cid, suffix),
				None => keys::category_tids(*cid),
			})
			.collect();
		let pinned_sets: Vec<String> = cids.iter().map(|cid| keys::category_pinned_tids(*cid)).collect();
		let pinned = parse_ids(self.store.range(&pinned_sets, 0, -1, Order::Desc).await?);
		let mut tids = self.collaborators.pins.filter_expired_pins(&pinned).await?;
		let main = self.store.range(&sets, 0, self.last_rank(), Order::for_sort(&query.sort)).await?;

		tids.extend(parse_ids(main));

		Ok(tids)
	}

	/// Topics carrying every tag within the categories, in the first tag's order.
	async fn category_tagged_tids(&self, tags: &[String], cids: &[Cid]) -> Result<Vec<Tid>> {
		let tag_sets: Vec<Vec<String>> = tags
			.iter()
			.map(|tag| cids.iter().map(|cid| keys::category_tag_topics(*cid, tag)).collect())
			.collect();
		let ranges = future::join_all(
			tag_sets.iter().map(|sets| self.store.range(sets, 0, -1, Order::Desc)),
		)
		.await;
		let mut lists = Vec::with_capacity(ranges.len());

		for range in ranges {
			lists.push(parse_ids(range?));
		}

		let Some((first, rest)) = lists.split_first() else {
			return Ok(Vec::new());
		};
		let rest: Vec<HashSet<Tid>> =
			rest.iter().map(|list| list.iter().copied().collect()).collect();
		let mut seen = HashSet::new();

		Ok(first
			.iter()
			.copied()
			.filter(|tid| rest.iter().all(|set| set.contains(tid)))
			.filter(|tid| seen.insert(*tid))
			.collect())
	}
}

