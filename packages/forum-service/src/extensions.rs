//! Optional strategies that let an embedder replace or extend parts of the listing pipeline.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use forum_domain::{Tid, query::TopicQuery};
use forum_storage::{BoxFuture, models::TopicRecord};

use crate::Result;

pub type TopicComparator = Arc<dyn Fn(&TopicRecord, &TopicRecord) -> Ordering + Send + Sync>;

/// Replaces candidate selection. Returning `None` falls back to the built-in selector.
pub trait SelectorOverride
where
	Self: Send + Sync,
{
	fn select<'a>(&'a self, query: &'a TopicQuery) -> BoxFuture<'a, Result<Option<Vec<Tid>>>>;
}

pub trait SortOptionsHook
where
	Self: Send + Sync,
{
	fn extend(&self, query: &TopicQuery, options: &mut SortOptions);
}

/// Last word on the filtered id list before pagination.
pub trait FilteredTidsHook
where
	Self: Send + Sync,
{
	fn filter<'a>(
		&'a self,
		query: &'a TopicQuery,
		tids: Vec<Tid>,
	) -> BoxFuture<'a, Result<Vec<Tid>>>;
}

/// Comparators registered by sort keyword, plus extra topic fields they need hydrated.
#[derive(Clone, Default)]
pub struct SortOptions {
	pub comparators: HashMap<String, TopicComparator>,
	pub extra_fields: Vec<String>,
}
impl SortOptions {
	pub fn comparator<F>(&mut self, keyword: &str, compare: F) -> &mut Self
	where
		F: Fn(&TopicRecord, &TopicRecord) -> Ordering + Send + Sync + 'static,
	{
		self.comparators.insert(keyword.to_string(), Arc::new(compare));

		self
	}

	pub fn field(&mut self, field: &str) -> &mut Self {
		if !self.extra_fields.iter().any(|value| value == field) {
			self.extra_fields.push(field.to_string());
		}

		self
	}
}

#[derive(Clone, Default)]
pub struct Extensions {
	pub selector: Option<Arc<dyn SelectorOverride>>,
	pub sort_options: Option<Arc<dyn SortOptionsHook>>,
	pub filtered_tids: Option<Arc<dyn FilteredTidsHook>>,
}
impl Extensions {
	pub fn selector(mut self, selector: Arc<dyn SelectorOverride>) -> Self {
		self.selector = Some(selector);

		self
	}

	pub fn sort_options(mut self, hook: Arc<dyn SortOptionsHook>) -> Self {
		self.sort_options = Some(hook);

		self
	}

	pub fn filtered_tids(mut self, hook: Arc<dyn FilteredTidsHook>) -> Self {
		self.filtered_tids = Some(hook);

		self
	}
}
