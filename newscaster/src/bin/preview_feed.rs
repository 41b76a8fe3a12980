use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use newscaster::ingestion::{self, FeedSettings};
use newscaster::scraping;

/// Shows which feed entries today's newscast would read, without calling any model.
#[derive(Parser, Debug)]
#[command(name = "preview-feed")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Interest keyword; repeat to list several
    #[arg(short, long = "interest", value_name = "KEYWORD")]
    interests: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let default_path = PathBuf::from("config.default.toml");
    let mut config = common::Config::load_with_defaults(
        Some(default_path.as_path()),
        Some(args.config.as_path()),
    )
    .await?;
    if !args.interests.is_empty() {
        config.newscast.interests = args.interests;
    }
    config.validate()?;

    let settings = FeedSettings::from_config(&config);
    let (query, feed) =
        ingestion::fetch_news_feed(&settings, &config.newscast.interests, common::local_today())
            .await?;

    println!("\n{}", "=".repeat(60));
    println!("Query: {}", query);
    println!("Entries: {}", feed.entries.len());
    println!("{}", "=".repeat(60));

    let links = scraping::feed_articles(&feed, config.article_count())?;
    for (i, link) in links.iter().enumerate() {
        println!("  {}. {}", i + 1, link.title);
        println!("     URL: {}", link.link);
    }
    if feed.entries.len() > links.len() {
        println!(
            "\n  ({} more entries beyond article_count = {})",
            feed.entries.len() - links.len(),
            config.article_count()
        );
    }

    Ok(())
}
