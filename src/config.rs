use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    // Gemini
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_url: String,

    // Translation behaviour
    pub base_language: String,
    pub request_spacing_ms: u64,
    pub max_attempts: u32,
    pub attempt_timeout_secs: u64,
    pub cache_capacity: usize,

    // Language preference
    pub preference_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let max_attempts: u32 = parse_var("TRANSLATION_MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            anyhow::bail!("TRANSLATION_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            // Gemini - a missing key is not fatal, translation fails open
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            gemini_api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),

            // Translation behaviour
            base_language: std::env::var("TRANSLATION_BASE_LANGUAGE")
                .unwrap_or_else(|_| "english".to_string()),
            request_spacing_ms: parse_var("TRANSLATION_REQUEST_SPACING_MS", 200)?,
            max_attempts,
            attempt_timeout_secs: parse_var("TRANSLATION_ATTEMPT_TIMEOUT_SECS", 30)?,
            cache_capacity: parse_var("TRANSLATION_CACHE_CAPACITY", 10_000)?,

            // Language preference
            preference_file: std::env::var("LANGUAGE_PREFERENCE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".language-preference.json")),
        })
    }

    /// Delay between consecutive queued remote calls
    pub fn request_spacing(&self) -> Duration {
        Duration::from_millis(self.request_spacing_ms)
    }

    /// Retry policy derived from the configured attempt budget and timeout
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::standard()
            .with_max_attempts(self.max_attempts)
            .with_attempt_timeout(Duration::from_secs(self.attempt_timeout_secs))
    }
}

/// Parse an optional numeric variable, rejecting values that are set but malformed
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
