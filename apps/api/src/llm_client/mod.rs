/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the upstream API directly.
/// Callers go through the `ChatTransport` trait so tests can script responses.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;
pub mod retry;

use retry::RetryPolicy;

const APP_TITLE: &str = "Smart Resume Form Filler";
const APP_REFERER: &str = "https://formfill.local";
const PING_MAX_TOKENS: u32 = 20;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call failed after {attempts} attempts ({category}): {last}")]
    Exhausted {
        attempts: u32,
        category: FailureCategory,
        last: Box<LlmError>,
    },
}

/// Coarse classification of an upstream failure, for user-facing guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Authentication,
    RateLimit,
    Network,
    Other,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureCategory::Authentication => "authentication",
            FailureCategory::RateLimit => "rate limit",
            FailureCategory::Network => "network",
            FailureCategory::Other => "other",
        };
        f.write_str(label)
    }
}

impl FailureCategory {
    pub fn guidance(self) -> &'static str {
        match self {
            FailureCategory::Authentication => {
                "This appears to be an authentication issue. Check that the API key is correct, \
                 has the right permissions, and the account has credits."
            }
            FailureCategory::RateLimit => {
                "Rate limit exceeded. Wait a moment and try again."
            }
            FailureCategory::Network => {
                "Network connection issue. Check connectivity to the model provider."
            }
            FailureCategory::Other => "Enable debug logging (RUST_LOG=debug) for more details.",
        }
    }
}

impl LlmError {
    pub(crate) fn exhausted(attempts: u32, last: LlmError) -> Self {
        LlmError::Exhausted {
            attempts,
            category: last.category(),
            last: Box::new(last),
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            LlmError::Api { status: 401 | 403, .. } => FailureCategory::Authentication,
            LlmError::Api { status: 429, .. } => FailureCategory::RateLimit,
            LlmError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                FailureCategory::Network
            }
            LlmError::Exhausted { category, .. } => *category,
            other => classify_message(&other.to_string()),
        }
    }
}

fn classify_message(message: &str) -> FailureCategory {
    let lower = message.to_lowercase();
    if lower.contains("auth") || lower.contains("credential") {
        FailureCategory::Authentication
    } else if lower.contains("429") || lower.contains("rate limit") {
        FailureCategory::RateLimit
    } else if lower.contains("network") || lower.contains("fetch") {
        FailureCategory::Network
    } else {
        FailureCategory::Other
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Model parameters shared by every request. Passed through opaquely.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub retry: RetryPolicy,
}

impl LlmSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            retry: RetryPolicy {
                max_retries: config.llm_max_retries,
                base_delay: Duration::from_millis(config.llm_retry_base_delay_ms),
            },
        }
    }

    pub fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// One request/response round trip. No retries at this level.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.llm_timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: config.api_key.clone(),
            base_url: config.llm_base_url.clone(),
            settings: LlmSettings::from_config(config),
        }
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }
}

/// Minimal single-attempt round trip used to verify the key and endpoint.
pub async fn ping(transport: &dyn ChatTransport, settings: &LlmSettings) -> Result<String, LlmError> {
    let request = ChatRequest {
        max_tokens: PING_MAX_TOKENS,
        ..settings.request(vec![
            ChatMessage::system("You are a helpful assistant."),
            ChatMessage::user("Say 'API test successful'"),
        ])
    };
    transport.complete(&request).await
}

#[async_trait]
impl ChatTransport for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
