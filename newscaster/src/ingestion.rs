use anyhow::{Context, Result};
use chrono::NaiveDate;
use feed_rs::model::Feed;
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Where and how to query the news search feed.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub search_url: String,
    pub language: String,
    pub region: String,
    pub timeout: Duration,
}

impl FeedSettings {
    pub fn from_config(config: &common::Config) -> Self {
        Self {
            search_url: config.search_url().to_string(),
            language: config.language().to_string(),
            region: config.region().to_string(),
            timeout: config.fetch_timeout(),
        }
    }
}

/// Builds the search query: keywords OR-joined, then a date filter.
/// Pure function of its inputs.
pub fn build_search_query(interests: &[String], date: NaiveDate) -> String {
    format!("{} after:{}", interests.join(" OR "), date.format("%Y-%m-%d"))
}

/// Fills the search feed URL template with the (form-encoded) query.
pub fn search_feed_url(settings: &FeedSettings, query: &str) -> Result<Url> {
    let lang = settings
        .language
        .split('-')
        .next()
        .unwrap_or(&settings.language);
    let ceid = format!("{}:{}", settings.region, lang);

    Url::parse_with_params(
        &settings.search_url,
        &[
            ("cf", "all"),
            ("q", query),
            ("hl", settings.language.as_str()),
            ("gl", settings.region.as_str()),
            ("ceid", ceid.as_str()),
        ],
    )
    .with_context(|| format!("invalid search feed URL: {}", settings.search_url))
}

/// Fetches a feed from the given URL and parses it.
/// Network errors, non-success statuses and malformed bodies are returned as errors.
pub async fn fetch_and_parse_feed(url: &str, timeout: Duration) -> Result<Feed> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent("Newscaster/0.1.0")
        .build()
        .context("failed to build reqwest client")?;

    debug!("fetching feed {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .context("network error during feed fetch")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("feed fetch failed with status: {}", status);
    }

    let bytes = response.bytes().await.context("failed to read response body")?;
    let feed = parser::parse(bytes.as_ref()).context("failed to parse feed")?;
    info!("fetched feed with {} entries", feed.entries.len());
    Ok(feed)
}

/// Fetches today's search feed for the given interests.
pub async fn fetch_news_feed(
    settings: &FeedSettings,
    interests: &[String],
    date: NaiveDate,
) -> Result<(String, Feed)> {
    let query = build_search_query(interests, date);
    let url = search_feed_url(settings, &query)?;
    info!(%query, "fetching news articles");
    let feed = fetch_and_parse_feed(url.as_str(), settings.timeout).await?;
    Ok((query, feed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn settings() -> FeedSettings {
        FeedSettings {
            search_url: "https://news.google.com/atom/search".to_string(),
            language: "en-US".to_string(),
            region: "US".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_query_joins_interests_with_or() {
        let interests = vec!["AI".to_string(), "Artificial Intelligence".to_string()];
        assert_eq!(
            build_search_query(&interests, date()),
            "AI OR Artificial Intelligence after:2024-03-09"
        );
    }

    #[test]
    fn test_query_is_deterministic() {
        let interests = vec!["Rust".to_string(), "WebAssembly".to_string()];
        let first = build_search_query(&interests, date());
        let second = build_search_query(&interests, date());
        assert_eq!(first, second);
    }

    #[test]
    fn test_query_single_interest() {
        assert_eq!(build_search_query(&["AI".to_string()], date()), "AI after:2024-03-09");
    }

    #[test]
    fn test_search_feed_url_encodes_query() {
        let url = search_feed_url(&settings(), "AI OR Robots after:2024-03-09").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.host_str(), Some("news.google.com"));
        assert_eq!(url.path(), "/atom/search");
        assert!(pairs.contains(&("cf".into(), "all".into())));
        assert!(pairs.contains(&("q".into(), "AI OR Robots after:2024-03-09".into())));
        assert!(pairs.contains(&("hl".into(), "en-US".into())));
        assert!(pairs.contains(&("gl".into(), "US".into())));
        assert!(pairs.contains(&("ceid".into(), "US:en".into())));
    }

    #[test]
    fn test_search_feed_url_rejects_bad_base() {
        let mut bad = settings();
        bad.search_url = "::nope".to_string();
        assert!(search_feed_url(&bad, "AI").is_err());
    }
}
