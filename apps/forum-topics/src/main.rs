use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = forum_topics::Args::parse();

	forum_topics::run(args).await
}
