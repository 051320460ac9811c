use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-lite";
const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";
const EXPECTED_KEY_PREFIX: &str = "sk-or-v1-";

/// Application configuration loaded from environment variables.
/// Fails at startup if the API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub llm_max_retries: u32,
    pub llm_retry_base_delay_ms: u64,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_key = require_env("OPENROUTER_API_KEY")?;
        validate_api_key(&api_key)?;

        Ok(Config {
            api_key,
            llm_base_url: env_or("LLM_BASE_URL", DEFAULT_BASE_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.0)?,
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", 500)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 3)?,
            llm_retry_base_delay_ms: parse_env("LLM_RETRY_BASE_DELAY_MS", 1000)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl Config {
    /// Logs a warning for a key that does not look like an OpenRouter key.
    /// Must run after the tracing subscriber is installed.
    pub fn warn_on_unusual_key(&self) {
        if !has_expected_key_format(&self.api_key) {
            warn!(
                "API key format looks unusual; OpenRouter keys start with '{EXPECTED_KEY_PREFIX}'"
            );
        }
    }
}

/// Rejects an empty or placeholder key. Format is only checked by
/// `Config::warn_on_unusual_key`.
pub fn validate_api_key(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        bail!("OPENROUTER_API_KEY is not configured");
    }
    Ok(())
}

pub fn has_expected_key_format(key: &str) -> bool {
    key.trim().starts_with(EXPECTED_KEY_PREFIX)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
