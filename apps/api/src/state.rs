use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::{ChatTransport, LlmClient, LlmSettings};
use crate::matching::engine::Matcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Upstream used for answer generation. `LlmClient` in production.
    pub transport: Arc<dyn ChatTransport>,
    pub settings: LlmSettings,
    pub matcher: Arc<Matcher>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let llm = LlmClient::new(config);
        Self {
            settings: llm.settings().clone(),
            transport: Arc::new(llm),
            matcher: Arc::new(Matcher::default()),
        }
    }
}
