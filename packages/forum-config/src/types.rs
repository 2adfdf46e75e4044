use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub topics: Topics,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topics {
	/// Upper bound on candidate ranges and on the ranked list handed to filtering.
	pub recent_max_topics: u32,
	/// Number of most recent replies scanned per topic when ranking by admin replies.
	#[serde(default = "default_admin_reply_window")]
	pub admin_reply_window: u32,
	/// Maximum number of reply ids read when ranking by reply count inside a term window.
	#[serde(default = "default_posts_in_term_limit")]
	pub posts_in_term_limit: u32,
	/// Skips the per-actor ignored category check on unscoped listings.
	#[serde(default)]
	pub disable_recent_category_filter: bool,
}
impl Default for Topics {
	fn default() -> Self {
		Self {
			recent_max_topics: default_recent_max_topics(),
			admin_reply_window: default_admin_reply_window(),
			posts_in_term_limit: default_posts_in_term_limit(),
			disable_recent_category_filter: false,
		}
	}
}

fn default_recent_max_topics() -> u32 {
	200
}

fn default_admin_reply_window() -> u32 {
	50
}

fn default_posts_in_term_limit() -> u32 {
	1_000
}
