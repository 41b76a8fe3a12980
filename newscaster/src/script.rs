use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::llm::{LlmProvider, LlmRequest};
use crate::models::SummarizedArticle;

/// Script read when no article survived summarization. No model call is made for it.
pub const NO_NEWS_SCRIPT: &str = "Hello, and welcome to Your Personalized News Source. \
I looked through today's headlines on your interests, but I couldn't find any new stories \
worth reading to you. Check back again tomorrow. Until then, take care.";

const NEWSCAST_SYSTEM_PROMPT: &str = "Thoroughly read the news articles. \
Structure the news script with an introduction, a body of stories, and a conclusion. \
Write a compelling introduction. Develop the body of the script so that each story \
flows smoothly into the next. Use a conversational tone. Avoid adding extra information. \
Conclude each segment and the overall script. Ensure clarity and brevity. \
Do not include any cues or directives, just the words to be spoken. \
The newscaster has no name, but speaks on behalf of 'Your Personalized News Source'.";

/// Joins accepted articles as "{title}\n{summary}" blocks separated by a blank line.
pub fn compose_script_input(articles: &[SummarizedArticle]) -> String {
    articles
        .iter()
        .map(|a| format!("{}\n{}", a.article.title, a.summary.summary))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Asks the model for a single narrated script covering every accepted article.
/// The model's text is returned as-is.
pub async fn write_script(provider: &dyn LlmProvider, articles: &[SummarizedArticle]) -> Result<String> {
    if articles.is_empty() {
        warn!("no articles survived summarization, using the no-news script");
        return Ok(NO_NEWS_SCRIPT.to_string());
    }

    info!("writing the newscast script from {} articles", articles.len());
    let prompt = format!(
        "Read the following articles as a news anchor would:{}",
        compose_script_input(articles)
    );

    let response = provider
        .generate(LlmRequest::new(NEWSCAST_SYSTEM_PROMPT, prompt))
        .await
        .context("LLM script generation failed")?;

    info!(
        "script written: {} chars, {} tokens",
        response.content.len(),
        response.usage.total_tokens
    );
    Ok(response.content)
}
