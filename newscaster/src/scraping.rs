use anyhow::{Context, Result};
use feed_rs::model::Feed;
use futures::stream::{self, StreamExt, TryStreamExt};
use html2text::render::TrivialDecorator;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

use crate::models::Article;

/// Pages fetched at once; results are still yielded in feed order.
const READ_CONCURRENCY: usize = 4;

const TEXT_WIDTH: usize = 100;

/// Title and link of a feed entry selected for reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLink {
    pub title: String,
    pub link: String,
}

/// Takes the first `limit` entries of the feed, in feed order.
pub fn feed_articles(feed: &Feed, limit: usize) -> Result<Vec<FeedLink>> {
    feed.entries
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, entry)| {
            let title = entry.title.as_ref().map(|t| t.content.clone()).unwrap_or_default();
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .with_context(|| format!("feed entry {} ({:?}) has no link", index, title))?;
            Ok(FeedLink { title, link })
        })
        .collect()
}

/// Extracts readable text from a page: the `<article>` element when the page
/// has one, the whole document otherwise. Plain text only, no markup or link
/// footnotes. Leading and trailing whitespace is trimmed.
pub fn extract_readable_text(html_content: &str) -> String {
    let document = Html::parse_document(html_content);

    let article_html = Selector::parse("article")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|el| el.html()));

    let (source, html) = match article_html {
        Some(html) => ("article", html),
        None => ("document", html_content.to_string()),
    };

    let decorator = TrivialDecorator::new();
    let text = match html2text::from_read_with_decorator(html.as_bytes(), TEXT_WIDTH, decorator) {
        Ok(text) => text,
        Err(e) => {
            debug!("scraping: html2text failed ({}), falling back to raw text nodes", e);
            document.root_element().text().collect::<Vec<_>>().join(" ")
        }
    };

    debug!("scraping: extracted {} chars from {}", text.len(), source);
    text.trim().to_string()
}

/// Scrapes the content of an article from the given URL.
/// Returns the extracted text content.
pub async fn scrape_article_content(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch article page {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("article fetch failed with status: {} ({})", status, url);
    }

    let html_content = response
        .text()
        .await
        .with_context(|| format!("failed to read response body of {}", url))?;

    Ok(extract_readable_text(&html_content))
}

/// Reads the first `limit` entries of the feed. Any failing page aborts the whole read.
pub async fn read_articles(feed: &Feed, limit: usize, timeout: Duration) -> Result<Vec<Article>> {
    info!("reading the articles");
    let links = feed_articles(feed, limit)?;

    let client = Client::builder()
        .timeout(timeout)
        .user_agent("Newscaster/0.1.0")
        .build()
        .context("failed to build reqwest client")?;

    let articles: Vec<Article> = stream::iter(links)
        .map(|FeedLink { title, link }| {
            let client = &client;
            async move {
                let raw_content = scrape_article_content(client, &link).await?;
                info!("read {:?}: {} chars", title, raw_content.len());
                Ok::<_, anyhow::Error>(Article {
                    title,
                    link,
                    raw_content,
                })
            }
        })
        .buffered(READ_CONCURRENCY)
        .try_collect()
        .await?;

    Ok(articles)
}
