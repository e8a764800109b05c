//! Oracle connection settings.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_SCORING_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the OpenAI-compatible oracle.
#[derive(Clone)]
pub struct OracleConfig {
    pub api_key: String,
    /// Base URL without trailing slash
    pub base_url: String,
    pub transcription_model: String,
    pub scoring_model: String,
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("transcription_model", &self.transcription_model)
            .field("scoring_model", &self.scoring_model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OracleConfig {
    /// Config with default endpoints and models for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            scoring_model: DEFAULT_SCORING_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create config from environment variables.
    ///
    /// Returns `None` when `AI_API_KEY` is unset or empty, which selects the
    /// synthetic transcript and heuristic scorer.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("AI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("AI_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(model) = std::env::var("AI_TRANSCRIPTION_MODEL") {
            config.transcription_model = model;
        }
        if let Ok(model) = std::env::var("AI_SCORING_MODEL") {
            config.scoring_model = model;
        }
        config.temperature = std::env::var("AI_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);
        config.timeout = Duration::from_secs(
            std::env::var("AI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        Some(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OracleConfig::new("sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.scoring_model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = OracleConfig::new("k").with_base_url("http://localhost:9000/v1/");
        assert_eq!(config.base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", OracleConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
