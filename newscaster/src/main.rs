/*
newscaster - main.rs
Fetches today's news on the configured interests, summarizes it, writes a script and records it.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use newscaster::llm::remote::RemoteLlmProvider;
use newscaster::speech::RemoteSpeechProvider;
use newscaster::Newscaster;

#[derive(Parser, Debug)]
#[command(name = "newscaster", about = "Record a personalized audio newscast for today")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Interest keyword; repeat to list several (replaces newscast.interests)
    #[arg(short, long = "interest", value_name = "KEYWORD")]
    interests: Vec<String>,

    /// Number of feed entries to read (replaces newscast.article_count)
    #[arg(short, long, value_name = "N")]
    articles: Option<usize>,

    /// Directory for the audio file (defaults to the executable's directory)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // API keys usually live in a .env next to the config
    if dotenv::dotenv().is_err() {
        info!("no .env file found, using the process environment");
    }

    let config = match load_config(&args).await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    let output_dir = resolve_output_dir(&args, &config)?;
    info!(
        interests = ?config.newscast.interests,
        articles = config.article_count(),
        output_dir = %output_dir.display(),
        "configuration loaded"
    );

    let llm = RemoteLlmProvider::from_config(&config).context("failed to set up the LLM provider")?;
    info!("LLM provider initialized: {}", llm.model());
    let speech =
        RemoteSpeechProvider::from_config(&config).context("failed to set up the speech provider")?;

    let newscaster = Newscaster::new(&config, output_dir, Arc::new(llm), Arc::new(speech))?;

    let today = common::local_today();
    match newscaster.report_the_news(today).await {
        Ok(report) => {
            if report.accepted.is_empty() {
                warn!("no article made it into today's newscast");
            }
            info!(
                feed_entries = report.feed_entries,
                read = report.articles_read,
                accepted = report.accepted.len(),
                skipped = report.skipped.len(),
                "newscast created"
            );
            println!("Saved to {}", report.audio_path.display());
            Ok(())
        }
        Err(e) => {
            error!("newscast failed: {:#}", e);
            Err(e)
        }
    }
}

/// Merges config.default.toml with config.toml (or --config), then applies CLI overrides.
async fn load_config(args: &Args) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = &args.config {
        if !p.exists() {
            anyhow::bail!("Config file not found: {}", p.display());
        }
        Some(p.clone())
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    let mut config = Config::load_with_defaults(
        if default_path.exists() { Some(default_path.as_path()) } else { None },
        override_path.as_deref(),
    )
    .await?;
    info!(default_file = ?default_path, override_file = ?override_path, "configuration files merged");

    if !args.interests.is_empty() {
        config.newscast.interests = args.interests.clone();
    }
    if let Some(n) = args.articles {
        config.newscast.article_count = Some(n);
    }

    config.validate()?;
    Ok(config)
}

fn resolve_output_dir(args: &Args, config: &Config) -> Result<PathBuf> {
    if let Some(dir) = args.output_dir.clone().or_else(|| config.newscast.output_dir.clone()) {
        return Ok(dir);
    }
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    exe.parent()
        .map(|p| p.to_path_buf())
        .context("executable has no parent directory")
}
