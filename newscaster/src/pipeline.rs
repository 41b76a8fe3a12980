use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::ingestion::{self, FeedSettings};
use crate::llm::{summarizer, LlmProvider};
use crate::models::NewscastReport;
use crate::script;
use crate::scraping;
use crate::speech::{self, SpeechProvider};

/// Runs Fetch -> Read -> Summarize -> Write -> Render for one day.
pub struct Newscaster {
    interests: Vec<String>,
    article_count: usize,
    feed: FeedSettings,
    output_dir: PathBuf,
    llm: Arc<dyn LlmProvider>,
    speech: Arc<dyn SpeechProvider>,
}

impl Newscaster {
    pub fn new(
        config: &common::Config,
        output_dir: PathBuf,
        llm: Arc<dyn LlmProvider>,
        speech: Arc<dyn SpeechProvider>,
    ) -> Result<Self> {
        config.validate().context("invalid newscast configuration")?;
        Ok(Self {
            interests: config.newscast.interests.clone(),
            article_count: config.article_count(),
            feed: FeedSettings::from_config(config),
            output_dir,
            llm,
            speech,
        })
    }

    /// Produces the newscast for `date`. Only the summarizer isolates per-article
    /// failures; an error in any other stage ends the run.
    pub async fn report_the_news(&self, date: NaiveDate) -> Result<NewscastReport> {
        let (query, feed) = ingestion::fetch_news_feed(&self.feed, &self.interests, date)
            .await
            .context("failed to fetch the news feed")?;
        let feed_entries = feed.entries.len();

        let articles = scraping::read_articles(&feed, self.article_count, self.feed.timeout)
            .await
            .context("failed to read the articles")?;
        let articles_read = articles.len();
        info!("read {} of {} feed entries", articles_read, feed_entries);

        let batch = summarizer::summarize_articles(self.llm.as_ref(), articles).await;

        let script = script::write_script(self.llm.as_ref(), &batch.accepted)
            .await
            .context("failed to write the newscast script")?;

        let (audio_path, audio_bytes) =
            speech::render_newscast(self.speech.as_ref(), &script, &self.output_dir, date)
                .await
                .context("failed to record the newscast")?;

        Ok(NewscastReport {
            query,
            feed_entries,
            articles_read,
            accepted: batch.accepted,
            skipped: batch.skipped,
            script,
            audio_path,
            audio_bytes,
        })
    }
}
