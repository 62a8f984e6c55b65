//! HTTP error type.
//!
//! Every handler returns `Result<T, ApiError>`. Client-class failures echo
//! their message; upstream failures are logged in full and answered with a
//! fixed message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use parley_core::{ConfigError, Error, ValidationError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or query string.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A completion failed for any reason other than configuration.
    #[error("completion failed: {0}")]
    Upstream(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store failure. `context` is what the client sees, `details` is forwarded.
    #[error("{context}: {details}")]
    Storage {
        context: &'static str,
        details: String,
    },

    #[error("incorrect password")]
    Unauthorized,
}

impl ApiError {
    /// Classify a core error, labelling storage failures with `context`.
    pub fn from_core(e: Error, context: &'static str) -> Self {
        match e {
            Error::Validation(v) => ApiError::Validation(v),
            Error::Config(c) => ApiError::Config(c),
            Error::Upstream(u) => ApiError::Upstream(u.to_string()),
            Error::Storage(details) => ApiError::Storage { context, details },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
            ApiError::Upstream(detail) => {
                error!(error = %detail, "API Error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to call API" }),
                )
            }
            ApiError::Config(e) => {
                error!(error = %e, "configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": e.to_string() }),
                )
            }
            ApiError::Storage { context, details } => {
                error!(error = %details, "{context}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": context, "details": details }),
                )
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "authenticated": false, "error": "Incorrect password" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
