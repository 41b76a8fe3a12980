// Summarizer module
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use super::{parse_json_reply, LlmProvider, LlmRequest};
use crate::models::{Article, ArticleSummary, SummarizedArticle, SummaryBatch, SummaryOutcome};

/// Reply the model gives when it had nothing real to summarize
pub const ACCESS_SENTINEL: &str = "NOT ABLE TO ACCESS";

/// Articles evaluated at once; outcomes are still joined in input order.
const SUMMARY_CONCURRENCY: usize = 4;

const SUMMARY_SYSTEM_PROMPT: &str = "Read the entire article. \
Identify the key points and rephrase them in your own words. \
Maintain the author's intent. Avoid summarizing cues. Keep it concise. \
Check for completeness and accuracy, then revise for clarity and flow. \
If you do not have access to the content, reply 'NOT ABLE TO ACCESS'.";

const RELATED_SYSTEM_PROMPT: &str = "Read both titles carefully. \
Identify key themes and keywords, and analyze context and subject matter. \
Judge whether the titles are about the same subject or unrelated. \
Report your finding in JSON format: {\"related\": <\"true\" or \"false\">}";

/// What the summarization call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryReply {
    Summary(ArticleSummary),
    /// The model answered with the sentinel instead of JSON
    Inaccessible,
}

#[derive(Debug, Deserialize)]
struct RelatedJson {
    related: serde_json::Value,
}

/// Asks the model for a `{summary, title}` object for the given article text.
pub async fn summarize_content<P: LlmProvider + ?Sized>(
    provider: &P,
    content: &str,
) -> Result<SummaryReply> {
    let prompt = format!(
        "Summarize this news article for me. \
         Respond in JSON format {{\"summary\": <your_summary>, \"title\": <your_succinct_title>}} :{}",
        content
    );

    let response = provider
        .generate(LlmRequest::new(SUMMARY_SYSTEM_PROMPT, prompt).json())
        .await
        .context("summary request failed")?;

    match parse_json_reply::<ArticleSummary>(&response.content) {
        Ok(summary) => Ok(SummaryReply::Summary(summary)),
        // JSON mode often wraps the sentinel in some other object shape
        Err(_) if response.content.contains(ACCESS_SENTINEL) => Ok(SummaryReply::Inaccessible),
        Err(e) => Err(e.context("summary reply is not a {summary, title} object")),
    }
}

/// Asks the model whether two titles describe the same subject.
/// Returns the `related` value exactly as the model wrote it.
pub async fn compare_titles<P: LlmProvider + ?Sized>(
    provider: &P,
    original_title: &str,
    summary_title: &str,
) -> Result<String> {
    let prompt = format!(
        "Compare these two titles: 1. {} & 2. {}",
        original_title, summary_title
    );

    let response = provider
        .generate(LlmRequest::new(RELATED_SYSTEM_PROMPT, prompt).json())
        .await
        .context("title comparison request failed")?;

    let parsed: RelatedJson = parse_json_reply(&response.content)
        .context("relatedness reply has no 'related' field")?;

    match parsed.related {
        serde_json::Value::String(judgment) => Ok(judgment),
        other => anyhow::bail!("'related' must be a string, got {}", other),
    }
}

/// Summarizes one article and checks the summary still matches the original title.
pub async fn evaluate_article<P: LlmProvider + ?Sized>(
    provider: &P,
    article: &Article,
) -> SummaryOutcome {
    let summary = match summarize_content(provider, &article.raw_content).await {
        Ok(SummaryReply::Summary(summary)) => summary,
        Ok(SummaryReply::Inaccessible) => return SummaryOutcome::Inaccessible,
        Err(e) => return SummaryOutcome::Failed(format!("{:#}", e)),
    };

    if summary.summary.contains(ACCESS_SENTINEL) || summary.title.contains(ACCESS_SENTINEL) {
        return SummaryOutcome::Inaccessible;
    }

    match compare_titles(provider, &article.title, &summary.title).await {
        Ok(judgment) if judgment.to_lowercase() == "true" => SummaryOutcome::Accepted(summary),
        Ok(judgment) => SummaryOutcome::Unrelated { judgment },
        Err(e) => SummaryOutcome::Failed(format!("{:#}", e)),
    }
}

/// Evaluates every article and keeps the accepted ones in input order.
/// A failing article is logged and dropped; the batch itself never fails.
pub async fn summarize_articles<P: LlmProvider + ?Sized>(
    provider: &P,
    articles: Vec<Article>,
) -> SummaryBatch {
    info!("summarizing {} articles", articles.len());

    let outcomes: Vec<(Article, SummaryOutcome)> = stream::iter(articles)
        .map(|article| async move {
            let outcome = evaluate_article(provider, &article).await;
            (article, outcome)
        })
        .buffered(SUMMARY_CONCURRENCY)
        .collect()
        .await;

    let mut batch = SummaryBatch::default();
    for (article, outcome) in outcomes {
        match outcome {
            SummaryOutcome::Accepted(summary) => {
                info!("accepted {:?} as {:?}", article.title, summary.title);
                batch.accepted.push(SummarizedArticle { article, summary });
            }
            skipped => {
                warn!(link = %article.link, "skipping {:?}: {}", article.title, skipped);
                batch.skipped.push((article, skipped));
            }
        }
    }

    info!(
        "summarized {} articles, skipped {}",
        batch.accepted.len(),
        batch.skipped.len()
    );
    batch
}
