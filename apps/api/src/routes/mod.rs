pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::resolution::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/fill/resolve", post(handlers::handle_resolve))
        .route("/api/v1/fill/match", post(handlers::handle_match))
        .route("/api/v1/fill/default", post(handlers::handle_default))
        .route("/api/v1/llm/test", post(handlers::handle_test_connection))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm_client::retry::RetryPolicy;
    use crate::llm_client::{ChatRequest, ChatTransport, LlmError, LlmSettings};
    use crate::matching::engine::Matcher;

    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }

    fn app(replies: Vec<Result<String, LlmError>>) -> Router {
        let state = AppState {
            transport: Arc::new(ScriptedTransport {
                replies: Mutex::new(replies.into()),
            }),
            settings: LlmSettings {
                model: "test-model".to_string(),
                temperature: 0.0,
                max_tokens: 500,
                retry: RetryPolicy {
                    max_retries: 0,
                    base_delay: std::time::Duration::from_millis(1),
                },
            },
            matcher: Arc::new(Matcher::default()),
        };
        build_router(state)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(vec![])
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_resolve_fills_and_matches() {
        let reply = json!({
            "Full Name": "Jane Doe",
            "Are you authorized to work?": "yes",
            "Start date": "03/15/2024"
        });
        let body = json!({
            "resume_text": "Jane Doe, Data Analyst",
            "fields": [
                {"question": "Full Name *", "field_kind": "text"},
                {"question": "Are you authorized to work?", "field_kind": "radio", "options": ["Yes", "No"]},
                {"question": "Start date", "field_kind": "date"}
            ]
        });
        let (status, report) =
            post_json(app(vec![Ok(reply.to_string())]), "/api/v1/fill/resolve", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["total"], 3);
        assert_eq!(report["filled"], 3);
        let resolutions = report["resolutions"].as_array().unwrap();
        assert_eq!(resolutions[0]["field"]["required"], true);
        assert_eq!(resolutions[0]["decision"]["value"], "Jane Doe");
        assert_eq!(resolutions[1]["decision"]["action"], "select");
        assert_eq!(resolutions[1]["decision"]["value"], 0);
        assert_eq!(resolutions[2]["decision"]["value"], "2024-03-15");
    }

    #[tokio::test]
    async fn test_resolve_rejects_empty_fields() {
        let body = json!({"resume_text": "Jane", "fields": []});
        let (status, err) = post_json(app(vec![]), "/api/v1/fill/resolve", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_resolve_upstream_failure_is_bad_gateway() {
        let body = json!({
            "resume_text": "Jane",
            "fields": [{"question": "Name", "field_kind": "text"}]
        });
        let failure = Err(LlmError::Api {
            status: 401,
            message: "User not found".to_string(),
        });
        let (status, err) = post_json(app(vec![failure]), "/api/v1/fill/resolve", body).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(err["error"]["code"], "UPSTREAM_ERROR");
        let message = err["error"]["message"].as_str().unwrap();
        assert!(message.contains("User not found"));
        assert!(message.contains("authentication"));
    }

    #[tokio::test]
    async fn test_match_checkbox_selects_many() {
        let body = json!({
            "answer": "Python, SQL",
            "field_kind": "checkbox",
            "options": ["Java", "Python", "SQL"]
        });
        let (status, resp) = post_json(app(vec![]), "/api/v1/fill/match", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["decision"]["action"], "select_many");
        assert_eq!(resp["decision"]["value"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_default_lookup() {
        let body = json!({"question": "Are you willing to relocate?", "field_kind": "radio"});
        let (_, resp) = post_json(app(vec![]), "/api/v1/fill/default", body).await;
        assert_eq!(resp["default"], "Yes");

        let body = json!({"question": "Are you willing to relocate?", "field_kind": "checkbox"});
        let (_, resp) = post_json(app(vec![]), "/api/v1/fill/default", body).await;
        assert_eq!(resp["default"], Value::Null);
    }

    #[tokio::test]
    async fn test_connection_reports_failure_in_body() {
        let (status, resp) = post_json(
            app(vec![Err(LlmError::EmptyContent)]),
            "/api/v1/llm/test",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["success"], false);

        let (_, resp) = post_json(
            app(vec![Ok("API test successful".to_string())]),
            "/api/v1/llm/test",
            json!({}),
        )
        .await;
        assert_eq!(resp["success"], true);
    }
}
