use std::{path::PathBuf, sync::Arc};

use clap::Parser;

use forum_domain::{Cid, Uid, query::SortedTopicsRequest};
use forum_service::TopicService;
use forum_storage::db::Db;

/// Prints one sorted topic listing as JSON.
#[derive(Debug, Parser)]
#[command(
	version = forum_cli::VERSION,
	rename_all = "kebab",
	styles = forum_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Acting user; 0 lists as a guest.
	#[arg(long, default_value_t = 0)]
	pub uid: Uid,
	#[arg(long, default_value = "recent")]
	pub sort: String,
	#[arg(long, default_value = "alltime")]
	pub term: String,
	#[arg(long = "cid", value_name = "CID")]
	pub cids: Vec<Cid>,
	#[arg(long = "tag", value_name = "TAG")]
	pub tags: Vec<String>,
	/// One of `watched`, `new` or `unreplied`.
	#[arg(long)]
	pub filter: Option<String>,
	#[arg(long, default_value_t = 0)]
	pub start: i64,
	#[arg(long, default_value_t = -1, allow_negative_numbers = true)]
	pub stop: i64,
	#[arg(long)]
	pub float_pinned: bool,
}
impl Args {
	pub fn request(&self) -> SortedTopicsRequest {
		let mut req = SortedTopicsRequest::new(self.uid)
			.sort(&self.sort)
			.term(&self.term)
			.range(self.start, self.stop)
			.float_pinned(self.float_pinned);

		if !self.cids.is_empty() {
			req = req.cids(self.cids.clone());
		}
		if !self.tags.is_empty() {
			req = req.tags(self.tags.clone());
		}
		if let Some(filter) = &self.filter {
			req = req.filter(filter);
		}

		req
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = forum_config::load(&args.config)?;

	forum_cli::init_tracing(&config.service.log_level);

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let service = TopicService::new(config.topics.clone(), Arc::new(db));
	let listing = service.get_sorted_topics(args.request()).await?;

	tracing::info!(
		uid = args.uid,
		topic_count = listing.topic_count,
		next_start = listing.next_start,
		"Listing ready."
	);

	println!("{}", serde_json::to_string_pretty(&listing)?);

	Ok(())
}
