//! `POST /api/admin/verify` — shared-secret check for the transcript viewer.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use parley_core::ConfigError;

use super::{ApiError, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/admin/verify", post(verify))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyRequest {
    pub password: Option<String>,
}

/// 200 `{authenticated: true}` on a match, 401 on a mismatch, 500 when no
/// secret is configured.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let secret = state.admin.secret().ok_or(ConfigError::MissingAdminSecret)?;

    if request.password.as_deref() == Some(secret) {
        debug!("admin password accepted");
        Ok(Json(json!({ "authenticated": true })))
    } else {
        debug!("admin password rejected");
        Err(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, json_body, post_json, send};
    use axum::http::StatusCode;
    use serde_json::json;

    const URI: &str = "/api/admin/verify";

    #[tokio::test]
    async fn test_correct_password() {
        let app = app("http://127.0.0.1:1", Some("hunter2"));
        let response = send(&app, post_json(URI, json!({"password": "hunter2"}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"authenticated": true}));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let app = app("http://127.0.0.1:1", Some("hunter2"));
        let response = send(&app, post_json(URI, json!({"password": "nope"}))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await,
            json!({"authenticated": false, "error": "Incorrect password"})
        );
    }

    #[tokio::test]
    async fn test_missing_password_field_is_rejected() {
        let app = app("http://127.0.0.1:1", Some("hunter2"));
        let response = send(&app, post_json(URI, json!({}))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unconfigured_secret_is_distinct_500() {
        for secret in [None, Some("")] {
            let app = app("http://127.0.0.1:1", secret);
            let response = send(&app, post_json(URI, json!({"password": ""}))).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                json_body(response).await,
                json!({"error": "Admin password not configured"})
            );
        }
    }
}
