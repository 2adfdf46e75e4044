use std::fmt::{Display, Formatter};

use crate::MS_PER_DAY;

/// Ordering requested for a topic listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
	#[default]
	Recent,
	Old,
	Create,
	Posts,
	Votes,
	Views,
	/// Accepts both `admin_replied` and `admin-replied`.
	AdminReplied,
	/// Keyword with no built-in ordering. Extensions may register a comparator for it, otherwise
	/// it ranks like [`SortKey::Recent`].
	Custom(String),
}
impl SortKey {
	pub fn parse(raw: &str) -> Self {
		match raw.trim() {
			"" | "recent" => Self::Recent,
			"old" => Self::Old,
			"create" => Self::Create,
			"posts" => Self::Posts,
			"votes" => Self::Votes,
			"views" => Self::Views,
			"admin_replied" | "admin-replied" => Self::AdminReplied,
			other => Self::Custom(other.to_string()),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Recent => "recent",
			Self::Old => "old",
			Self::Create => "create",
			Self::Posts => "posts",
			Self::Votes => "votes",
			Self::Views => "views",
			Self::AdminReplied => "admin_replied",
			Self::Custom(keyword) => keyword.as_str(),
		}
	}

	pub fn is_admin_replied(&self) -> bool {
		matches!(self, Self::AdminReplied)
	}

	pub fn is_ascending(&self) -> bool {
		matches!(self, Self::Old)
	}

	/// Global sorted set whose scores already encode this ordering.
	pub fn global_set(&self) -> &'static str {
		match self {
			Self::Create => "topics:tid",
			Self::Posts => "topics:posts",
			Self::Votes => "topics:votes",
			Self::Views => "topics:views",
			Self::Recent | Self::Old | Self::AdminReplied | Self::Custom(_) => "topics:recent",
		}
	}

	/// Suffix of the per-category set for this ordering; `None` selects the plain
	/// `cid:<cid>:tids` set scored by last post time.
	pub fn category_set_suffix(&self) -> Option<&str> {
		match self {
			Self::Recent | Self::Old | Self::AdminReplied => None,
			Self::Create => Some("create"),
			Self::Posts => Some("posts"),
			Self::Votes => Some("votes"),
			Self::Views => Some("views"),
			Self::Custom(keyword) => Some(keyword.as_str()),
		}
	}
}
impl Display for SortKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Creation time window a listing is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Term {
	#[default]
	AllTime,
	Day,
	Week,
	Month,
}
impl Term {
	/// Unknown keywords fall back to a one day window.
	pub fn parse(raw: &str) -> Self {
		match raw.trim() {
			"" | "alltime" => Self::AllTime,
			"week" => Self::Week,
			"month" => Self::Month,
			_ => Self::Day,
		}
	}

	pub fn is_all_time(&self) -> bool {
		matches!(self, Self::AllTime)
	}

	pub fn window_ms(&self) -> Option<i64> {
		match self {
			Self::AllTime => None,
			Self::Day => Some(MS_PER_DAY),
			Self::Week => Some(7 * MS_PER_DAY),
			Self::Month => Some(30 * MS_PER_DAY),
		}
	}
}

/// Read-state filter applied before privilege filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicFilter {
	Watched,
	New,
	Unreplied,
}
impl TopicFilter {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim() {
			"watched" => Some(Self::Watched),
			"new" => Some(Self::New),
			"unreplied" => Some(Self::Unreplied),
			_ => None,
		}
	}
}
