mod filter;
mod paginate;
mod ranking;
mod selector;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use forum_domain::{
	Tid,
	query::{SortedTopicsRequest, TopicQuery},
};
use forum_storage::models::TopicRecord;

use crate::{Result, TopicService};

/// A hydrated topic together with its absolute position in the filtered listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicListing {
	#[serde(flatten)]
	pub topic: TopicRecord,
	pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortedTopics {
	/// Every tid that survived filtering, in ranked order.
	pub tids: Vec<Tid>,
	/// The requested page; `None` where a topic could not be hydrated.
	pub topics: Vec<Option<TopicListing>>,
	#[serde(rename = "topicCount")]
	pub topic_count: usize,
	#[serde(rename = "nextStart")]
	pub next_start: i64,
}

impl TopicService {
	pub async fn get_sorted_topics(&self, req: SortedTopicsRequest) -> Result<SortedTopics> {
		let query = TopicQuery::try_from(req)?;
		let candidates = self.select_candidates(&query).await?;
		let candidate_count = candidates.len();
		let mut tids = dedupe(self.rank(&query, candidates).await?);

		tids.truncate(self.recent_max_topics());

		let tids = self.filter_tids(&query, tids).await?;
		let topics = self.paginate(&query, &tids).await?;

		tracing::debug!(
			uid = query.uid,
			sort = %query.sort,
			candidates = candidate_count,
			filtered = tids.len(),
			page = topics.len(),
			"Sorted topic listing built."
		);

		Ok(SortedTopics { topic_count: tids.len(), next_start: query.next_start(), tids, topics })
	}
}

/// Drops repeated tids, keeping the first occurrence.
fn dedupe(tids: Vec<Tid>) -> Vec<Tid> {
	let mut seen = HashSet::with_capacity(tids.len());

	tids.into_iter().filter(|tid| seen.insert(*tid)).collect()
}
