use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

pub const DISCLAIMER: &str =
    "For your awareness, you're listening to an AI voice generated from a text-to-speech model.";

/// Core trait for speech-synthesis providers
#[async_trait::async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` and stream the audio into `destination`, replacing it.
    /// Returns the number of bytes written.
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<u64>;
}

/// Remote speech provider using the OpenAI-compatible `audio/speech` API
pub struct RemoteSpeechProvider {
    api_url: String,
    api_key: String,
    model: String,
    voice: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

impl RemoteSpeechProvider {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            voice: voice.into(),
            timeout: Duration::from_secs(300),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &common::Config) -> Result<Self> {
        let api_key = common::api_key_from_env(config.speech_api_key_env())?;
        Ok(Self::new(
            config.speech_url(),
            api_key,
            config.speech_model(),
            config.voice(),
        )
        .with_timeout(config.speech_timeout()))
    }

    async fn stream_to_file(&self, text: &str, part_path: &Path) -> Result<u64> {
        let body = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            response_format: "mp3",
        };

        let mut response = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("speech HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("speech API error {}: {}", status, body);
        }

        let mut file = tokio::fs::File::create(part_path)
            .await
            .with_context(|| format!("failed to create {}", part_path.display()))?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.context("speech stream interrupted")? {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("failed to write {}", part_path.display()))?;
            written += chunk.len() as u64;
        }
        file.flush().await.context("failed to flush audio file")?;

        Ok(written)
    }
}

#[async_trait::async_trait]
impl SpeechProvider for RemoteSpeechProvider {
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<u64> {
        let part_path = part_path(destination);

        match self.stream_to_file(text, &part_path).await {
            Ok(written) => {
                tokio::fs::rename(&part_path, destination)
                    .await
                    .with_context(|| format!("failed to move audio into {}", destination.display()))?;
                debug!("speech: wrote {} bytes to {}", written, destination.display());
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                Err(e)
            }
        }
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    destination.with_file_name(name)
}

/// File name of the newscast for a given day.
pub fn newscast_file_name(date: NaiveDate) -> String {
    format!("Newscast for {}.mp3", date.format("%Y-%m-%d"))
}

/// Appends the AI-voice disclaimer to the script.
pub fn with_disclaimer(script: &str) -> String {
    format!("{}\n{}", script.trim_end(), DISCLAIMER)
}

/// Records the newscast into `<output_dir>/Newscast for <date>.mp3`, replacing an earlier
/// recording of the same day.
pub async fn render_newscast(
    provider: &dyn SpeechProvider,
    script: &str,
    output_dir: &Path,
    date: NaiveDate,
) -> Result<(PathBuf, u64)> {
    info!("recording the newscast");
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    let path = output_dir.join(newscast_file_name(date));
    let written = provider
        .synthesize(&with_disclaimer(script), &path)
        .await
        .context("speech synthesis failed")?;

    info!(path = %path.display(), bytes = written, "newscast saved");
    Ok((path, written))
}
