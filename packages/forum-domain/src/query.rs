use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{
	Cid, Uid,
	sort::{SortKey, Term, TopicFilter},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
	#[error("Invalid uid {0}.")]
	InvalidUid(Uid),
	#[error("Invalid start {0}; expected zero or greater.")]
	InvalidStart(i64),
	#[error("Invalid stop {0}; expected -1 or greater.")]
	InvalidStop(i64),
}

/// Accepts either a scalar or a list so callers can pass `cids: 3` as well as `cids: [3]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
	One(T),
	Many(Vec<T>),
}
impl<T> OneOrMany<T> {
	pub fn into_vec(self) -> Vec<T> {
		match self {
			Self::One(value) => vec![value],
			Self::Many(values) => values,
		}
	}
}
impl<T> From<Vec<T>> for OneOrMany<T> {
	fn from(values: Vec<T>) -> Self {
		Self::Many(values)
	}
}

/// Listing parameters as received from a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortedTopicsRequest {
	pub uid: Uid,
	#[serde(default)]
	pub term: Option<String>,
	#[serde(default)]
	pub sort: Option<String>,
	#[serde(default)]
	pub cids: Option<OneOrMany<Cid>>,
	#[serde(default)]
	pub tags: Option<OneOrMany<String>>,
	#[serde(default)]
	pub filter: Option<String>,
	#[serde(default)]
	pub start: i64,
	#[serde(default = "default_stop")]
	pub stop: i64,
	#[serde(default, rename = "floatPinned", alias = "float_pinned")]
	pub float_pinned: bool,
}
impl SortedTopicsRequest {
	pub fn new(uid: Uid) -> Self {
		Self {
			uid,
			term: None,
			sort: None,
			cids: None,
			tags: None,
			filter: None,
			start: 0,
			stop: default_stop(),
			float_pinned: false,
		}
	}

	pub fn term(mut self, term: &str) -> Self {
		self.term = Some(term.to_string());

		self
	}

	pub fn sort(mut self, sort: &str) -> Self {
		self.sort = Some(sort.to_string());

		self
	}

	pub fn cids(mut self, cids: impl Into<OneOrMany<Cid>>) -> Self {
		self.cids = Some(cids.into());

		self
	}

	pub fn tags(mut self, tags: impl Into<OneOrMany<String>>) -> Self {
		self.tags = Some(tags.into());

		self
	}

	pub fn filter(mut self, filter: &str) -> Self {
		self.filter = Some(filter.to_string());

		self
	}

	pub fn range(mut self, start: i64, stop: i64) -> Self {
		self.start = start;
		self.stop = stop;

		self
	}

	pub fn float_pinned(mut self, float_pinned: bool) -> Self {
		self.float_pinned = float_pinned;

		self
	}
}

/// Normalized listing parameters every pipeline stage works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuery {
	pub uid: Uid,
	pub term: Term,
	pub sort: SortKey,
	pub cids: Option<Vec<Cid>>,
	pub tags: Vec<String>,
	pub filter: Option<TopicFilter>,
	pub start: usize,
	/// Inclusive; `-1` reads to the end.
	pub stop: i64,
	pub float_pinned: bool,
}
impl TopicQuery {
	pub fn is_watched(&self) -> bool {
		self.filter == Some(TopicFilter::Watched)
	}

	/// True when candidates come from the category sets with pinned topics prepended.
	pub fn selects_pinned(&self) -> bool {
		self.term.is_all_time() && !self.is_watched() && self.cids.is_some() && self.tags.is_empty()
	}

	pub fn page_bounds(&self, len: usize) -> Range<usize> {
		let start = self.start.min(len);
		let end = if self.stop < 0 { len } else { (self.stop as usize).saturating_add(1).min(len) };

		start..end.max(start)
	}

	pub fn next_start(&self) -> i64 {
		self.stop + 1
	}
}
impl TryFrom<SortedTopicsRequest> for TopicQuery {
	type Error = QueryError;

	fn try_from(req: SortedTopicsRequest) -> Result<Self, Self::Error> {
		if req.uid < 0 {
			return Err(QueryError::InvalidUid(req.uid));
		}
		if req.start < 0 {
			return Err(QueryError::InvalidStart(req.start));
		}
		if req.stop < -1 {
			return Err(QueryError::InvalidStop(req.stop));
		}

		Ok(Self {
			uid: req.uid,
			term: req.term.as_deref().map(Term::parse).unwrap_or_default(),
			sort: req.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
			cids: req.cids.map(OneOrMany::into_vec),
			tags: req.tags.map(OneOrMany::into_vec).unwrap_or_default(),
			filter: req.filter.as_deref().and_then(TopicFilter::parse),
			start: req.start as usize,
			stop: req.stop,
			float_pinned: req.float_pinned,
		})
	}
}

fn default_stop() -> i64 {
	-1
}
