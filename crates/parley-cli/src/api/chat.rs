//! `POST /api/chat` — one completion through the gateway.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use parley_core::{ChatRequest, ChatResponse};

use super::{ApiError, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Body: `{messages, systemPrompt}`. Returns `{text}`.
///
/// Empty `messages` are seeded by the gateway.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state
        .gateway
        .send_default(&request)
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to call API"))?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, json_body, post_json, post_raw, send};
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_chat_returns_completion_text() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "You are L.E."},
                    {"role": "user", "content": "Begin the onboarding conversation."}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Hi! What should I call you?"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let app = app(&mock_server.uri(), None);
        let response = send(
            &app,
            post_json("/api/chat", json!({"messages": [], "systemPrompt": "You are L.E."})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"text": "Hi! What should I call you?"})
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic_500() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided: sk-test"}
            })))
            .mount(&mock_server)
            .await;

        let app = app(&mock_server.uri(), None);
        let response = send(
            &app,
            post_json(
                "/api/chat",
                json!({"messages": [{"role": "user", "content": "Hi"}], "systemPrompt": "s"}),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"error": "Failed to call API"}));
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let app = app("http://127.0.0.1:1", None);
        let response = send(&app, post_raw("/api/chat", "{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }
}
