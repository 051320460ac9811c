use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::ping;
use crate::matching::defaults::resolve_default;
use crate::models::field::{FieldDescriptor, FieldKind, MatchDecision};
use crate::resolution::orchestrator::{decide, run_pass, ResolutionReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub resume_text: String,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub answer: String,
    pub field_kind: FieldKind,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub decision: MatchDecision,
}

#[derive(Debug, Deserialize)]
pub struct DefaultRequest {
    pub question: String,
    pub field_kind: FieldKind,
}

#[derive(Debug, Serialize)]
pub struct DefaultResponse {
    pub default: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/v1/fill/resolve
pub async fn handle_resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolutionReport>, AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text must not be empty".to_string()));
    }
    if req.fields.is_empty() {
        return Err(AppError::Validation("fields must not be empty".to_string()));
    }

    let fields: Vec<FieldDescriptor> = req
        .fields
        .into_iter()
        .map(FieldDescriptor::sanitized)
        .collect();
    let report = run_pass(
        state.transport.as_ref(),
        &state.settings,
        &state.matcher,
        &req.resume_text,
        fields,
    )
    .await?;
    Ok(Json(report))
}

/// POST /api/v1/fill/match
/// Matches a known answer against a field without calling the model.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Json<MatchResponse> {
    let field = FieldDescriptor::new("", req.field_kind, req.options);
    let (_, decision) = decide(&state.matcher, &field, req.answer.trim());
    Json(MatchResponse { decision })
}

/// POST /api/v1/fill/default
pub async fn handle_default(Json(req): Json<DefaultRequest>) -> Json<DefaultResponse> {
    Json(DefaultResponse {
        default: resolve_default(&req.question, req.field_kind),
    })
}

/// POST /api/v1/llm/test
/// Single attempt, no retries. Failures are reported in the body, not as an error status.
pub async fn handle_test_connection(State(state): State<AppState>) -> Json<ConnectionTestResponse> {
    match ping(state.transport.as_ref(), &state.settings).await {
        Ok(reply) => {
            info!("Connection test succeeded");
            Json(ConnectionTestResponse {
                success: true,
                message: reply,
            })
        }
        Err(e) => {
            let category = e.category();
            warn!("Connection test failed ({category}): {e}");
            Json(ConnectionTestResponse {
                success: false,
                message: format!("{e}. {}", category.guidance()),
            })
        }
    }
}
