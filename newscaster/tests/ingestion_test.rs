use chrono::NaiveDate;
use mockito::Matcher;
use newscaster::ingestion::{self, FeedSettings};
use std::time::Duration;

const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>"AI" - Google News</title>
  <id>urn:search</id>
  <updated>2024-03-09T10:00:00Z</updated>
  <entry>
    <title>AI breakthrough</title>
    <id>urn:1</id>
    <updated>2024-03-09T09:00:00Z</updated>
    <link href="https://example.com/ai-breakthrough"/>
  </entry>
  <entry>
    <title>Chips are back</title>
    <id>urn:2</id>
    <updated>2024-03-09T08:00:00Z</updated>
    <link href="https://example.com/chips"/>
  </entry>
</feed>"#;

fn settings(base: &str) -> FeedSettings {
    FeedSettings {
        search_url: format!("{}/atom/search", base),
        language: "en-US".to_string(),
        region: "US".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

#[tokio::test]
async fn test_fetch_news_feed_sends_query_and_parses_entries() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/atom/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("cf".into(), "all".into()),
            Matcher::UrlEncoded("q".into(), "AI OR Artificial Intelligence after:2024-03-09".into()),
            Matcher::UrlEncoded("hl".into(), "en-US".into()),
            Matcher::UrlEncoded("gl".into(), "US".into()),
            Matcher::UrlEncoded("ceid".into(), "US:en".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(ATOM)
        .create_async()
        .await;

    let interests = vec!["AI".to_string(), "Artificial Intelligence".to_string()];
    let (query, feed) = ingestion::fetch_news_feed(&settings(&server.url()), &interests, date())
        .await
        .unwrap();

    assert_eq!(query, "AI OR Artificial Intelligence after:2024-03-09");
    assert_eq!(feed.entries.len(), 2);
    assert_eq!(
        feed.entries[0].title.as_ref().map(|t| t.content.as_str()),
        Some("AI breakthrough")
    );
    assert_eq!(feed.entries[1].links[0].href, "https://example.com/chips");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_feed_is_an_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/atom/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html><body>definitely not a feed</body></html>")
        .create_async()
        .await;

    let url = format!("{}/atom/search?q=x", server.url());
    let err = ingestion::fetch_and_parse_feed(&url, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("failed to parse feed"));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/atom/search")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/atom/search?q=x", server.url());
    let err = ingestion::fetch_and_parse_feed(&url, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("503"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_is_an_error() {
    // Nothing listens on port 9 of localhost
    let result =
        ingestion::fetch_and_parse_feed("http://127.0.0.1:9/atom/search", Duration::from_secs(2))
            .await;

    assert!(result.is_err());
}
