use forum_domain::{Tid, query::TopicQuery};
use forum_storage::ExtraFields;

use crate::{Result, TopicService, sorted::TopicListing};

impl TopicService {
	/// Hydrates the requested slice. Each listing's index is its absolute position.
	pub(super) async fn paginate(
		&self,
		query: &TopicQuery,
		tids: &[Tid],
	) -> Result<Vec<Option<TopicListing>>> {
		let page = &tids[query.page_bounds(tids.len())];

		if page.is_empty() {
			return Ok(Vec::new());
		}

		let topics = self.store.topics(page, ExtraFields::All).await?;

		Ok(topics
			.into_iter()
			.enumerate()
			.map(|(position, topic)| {
				topic.map(|topic| TopicListing { topic, index: query.start + position })
			})
			.collect())
	}
}
