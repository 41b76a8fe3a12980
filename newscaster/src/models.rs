use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// An article read from a feed entry's page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Text extracted from the page, before any model sees it
    pub raw_content: String,
}

/// Summary returned by the language model for one article
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleSummary {
    pub summary: String,
    pub title: String,
}

/// An article the summarizer accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizedArticle {
    pub article: Article,
    pub summary: ArticleSummary,
}

/// Result of evaluating a single article
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Accepted(ArticleSummary),
    /// The model reported it had no real content to work from
    Inaccessible,
    /// The relatedness judgment was anything but "true"
    Unrelated { judgment: String },
    /// Transport error or a reply that did not have the requested shape
    Failed(String),
}

impl SummaryOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SummaryOutcome::Accepted(_))
    }
}

impl fmt::Display for SummaryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryOutcome::Accepted(summary) => write!(f, "accepted as \"{}\"", summary.title),
            SummaryOutcome::Inaccessible => write!(f, "model could not access the content"),
            SummaryOutcome::Unrelated { judgment } => {
                write!(f, "summary unrelated to original title (judgment: {:?})", judgment)
            }
            SummaryOutcome::Failed(reason) => write!(f, "summarization failed: {}", reason),
        }
    }
}

/// Articles the summarizer kept, in input order, and the ones it dropped
#[derive(Debug, Clone, Default)]
pub struct SummaryBatch {
    pub accepted: Vec<SummarizedArticle>,
    pub skipped: Vec<(Article, SummaryOutcome)>,
}

/// What one run of the pipeline produced
#[derive(Debug, Clone)]
pub struct NewscastReport {
    pub query: String,
    pub feed_entries: usize,
    pub articles_read: usize,
    pub accepted: Vec<SummarizedArticle>,
    pub skipped: Vec<(Article, SummaryOutcome)>,
    pub script: String,
    pub audio_path: PathBuf,
    pub audio_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display_names_the_reason() {
        let unrelated = SummaryOutcome::Unrelated {
            judgment: "false".to_string(),
        };
        assert!(unrelated.to_string().contains("\"false\""));
        assert!(!unrelated.is_accepted());

        let failed = SummaryOutcome::Failed("LLM API error 500".to_string());
        assert!(failed.to_string().contains("500"));

        let accepted = SummaryOutcome::Accepted(ArticleSummary {
            summary: "Robots learn.".to_string(),
            title: "Robots".to_string(),
        });
        assert!(accepted.is_accepted());
    }
}
