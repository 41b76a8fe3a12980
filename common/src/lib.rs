/*!
common/src/lib.rs

Shared configuration types and helpers for Newscaster.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a default config file with an override file
- Defaults for every provider endpoint so a minimal config only lists interests
*/

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ARTICLE_COUNT: usize = 10;
pub const DEFAULT_SEARCH_URL: &str = "https://news.google.com/atom/search";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_REGION: &str = "US";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI";
pub const DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo-1106";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
pub const DEFAULT_SPEECH_MODEL: &str = "tts-1";
pub const DEFAULT_VOICE: &str = "alloy";
pub const DEFAULT_SPEECH_TIMEOUT_SECS: u64 = 300;

/// What the newscast is about and where it lands
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewscastConfig {
    /// Interest keywords, OR-joined into the search query in this order
    #[serde(default)]
    pub interests: Vec<String>,
    /// Maximum number of feed entries to read
    pub article_count: Option<usize>,
    /// Directory for the audio file. Defaults to the executable's directory.
    pub output_dir: Option<PathBuf>,
}

/// News search feed endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    pub search_url: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
    pub fetch_timeout_seconds: Option<u64>,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

/// OpenAI-compatible speech synthesis endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub api_url: Option<String>,
    /// Falls back to `llm.api_key_env` when unset
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub newscast: NewscastConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.newscast.interests.is_empty() {
            anyhow::bail!("newscast.interests is empty: list at least one keyword");
        }
        if let Some(blank) = self.newscast.interests.iter().position(|k| k.trim().is_empty()) {
            anyhow::bail!("newscast.interests[{}] is blank", blank);
        }
        if self.article_count() == 0 {
            anyhow::bail!("newscast.article_count must be at least 1");
        }
        for (key, value) in [
            ("feed.search_url", self.search_url()),
            ("llm.api_url", self.chat_url()),
            ("speech.api_url", self.speech_url()),
        ] {
            url::Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", key, value))?;
        }
        Ok(())
    }

    pub fn article_count(&self) -> usize {
        self.newscast.article_count.unwrap_or(DEFAULT_ARTICLE_COUNT)
    }

    pub fn search_url(&self) -> &str {
        self.feed.search_url.as_deref().unwrap_or(DEFAULT_SEARCH_URL)
    }

    pub fn language(&self) -> &str {
        self.feed.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn region(&self) -> &str {
        self.feed.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.feed.fetch_timeout_seconds.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS))
    }

    pub fn chat_url(&self) -> &str {
        self.llm.api_url.as_deref().unwrap_or(DEFAULT_CHAT_URL)
    }

    pub fn llm_api_key_env(&self) -> &str {
        self.llm.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    pub fn chat_model(&self) -> &str {
        self.llm.model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_seconds.unwrap_or(DEFAULT_LLM_TIMEOUT_SECS))
    }

    pub fn speech_url(&self) -> &str {
        self.speech.api_url.as_deref().unwrap_or(DEFAULT_SPEECH_URL)
    }

    pub fn speech_api_key_env(&self) -> &str {
        self.speech
            .api_key_env
            .as_deref()
            .unwrap_or_else(|| self.llm_api_key_env())
    }

    pub fn speech_model(&self) -> &str {
        self.speech.model.as_deref().unwrap_or(DEFAULT_SPEECH_MODEL)
    }

    pub fn voice(&self) -> &str {
        self.speech.voice.as_deref().unwrap_or(DEFAULT_VOICE)
    }

    pub fn speech_timeout(&self) -> Duration {
        Duration::from_secs(self.speech.timeout_seconds.unwrap_or(DEFAULT_SPEECH_TIMEOUT_SECS))
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Read an API key from the environment variable named in the config.
pub fn api_key_from_env(var: &str) -> Result<String> {
    std::env::var(var).with_context(|| format!("API key env var '{}' not set", var))
}

/// The calendar date a run is stamped with (query filter and file name).
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn config_from_string_with_defaults() {
        let toml = r#"
            [newscast]
            interests = ["AI", "Artificial Intelligence"]
            article_count = 5

            [llm]
            temperature = 0.2

            [speech]
            voice = "nova"
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.newscast.interests, vec!["AI", "Artificial Intelligence"]);
        assert_eq!(cfg.article_count(), 5);
        assert_eq!(cfg.voice(), "nova");
        assert_eq!(cfg.llm.temperature, Some(0.2));
        assert_eq!(cfg.llm.max_tokens, None);
        assert_eq!(cfg.speech_model(), DEFAULT_SPEECH_MODEL);
        assert_eq!(cfg.chat_model(), DEFAULT_CHAT_MODEL);
        assert_eq!(cfg.search_url(), DEFAULT_SEARCH_URL);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn speech_key_falls_back_to_llm_key() {
        let toml = r#"
            [llm]
            api_key_env = "MY_KEY"
        "#;
        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.speech_api_key_env(), "MY_KEY");
        assert_eq!(Config::default().speech_api_key_env(), DEFAULT_API_KEY_ENV);
    }

    #[test]
    fn validate_rejects_unusable_configs() {
        let empty = Config::default();
        assert!(empty.validate().unwrap_err().to_string().contains("interests"));

        let mut blank = Config::default();
        blank.newscast.interests = vec!["AI".into(), "  ".into()];
        assert!(blank.validate().unwrap_err().to_string().contains("interests[1]"));

        let mut zero = Config::default();
        zero.newscast.interests = vec!["AI".into()];
        zero.newscast.article_count = Some(0);
        assert!(zero.validate().unwrap_err().to_string().contains("article_count"));

        let mut bad_url = Config::default();
        bad_url.newscast.interests = vec!["AI".into()];
        bad_url.feed.search_url = Some("not a url".into());
        assert!(bad_url.validate().unwrap_err().to_string().contains("feed.search_url"));
    }

    #[tokio::test]
    async fn load_with_defaults_merges_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        let override_path = dir.path().join("config.toml");

        fs::write(
            &default_path,
            r#"
            [newscast]
            interests = ["AI"]
            article_count = 5

            [llm]
            model = "gpt-3.5-turbo-1106"
            "#,
        )
        .expect("write default");
        fs::write(
            &override_path,
            r#"
            [newscast]
            article_count = 2

            [llm]
            timeout_seconds = 5
            "#,
        )
        .expect("write override");

        let cfg = Config::load_with_defaults(Some(default_path.as_path()), Some(override_path.as_path()))
            .await
            .expect("load config");

        assert_eq!(cfg.newscast.interests, vec!["AI"]);
        assert_eq!(cfg.article_count(), 2);
        assert_eq!(cfg.chat_model(), "gpt-3.5-turbo-1106");
        assert_eq!(cfg.llm_timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn load_with_defaults_skips_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");

        let cfg = Config::load_with_defaults(Some(missing.as_path()), None)
            .await
            .expect("load config");
        assert!(cfg.newscast.interests.is_empty());
        assert_eq!(cfg.article_count(), DEFAULT_ARTICLE_COUNT);
    }

    #[tokio::test]
    async fn from_file_reports_path_on_error() {
        let err = Config::from_file("/definitely/not/here.toml").await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
