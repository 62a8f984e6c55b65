//! Axum router construction and shared handler state.
//!
//! [`build`] assembles:
//! - `GET /health`
//! - `POST /api/chat`
//! - `GET|POST /api/transcripts`
//! - `POST /api/admin/verify`

mod admin;
mod chat;
mod error;
mod health;
mod transcripts;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use parley_core::config::AdminConfig;
use parley_providers::CompletionGateway;
use parley_store::TranscriptStore;

pub use error::ApiError;

/// State shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub gateway: CompletionGateway,
    pub store: TranscriptStore,
    pub admin: AdminConfig,
}

impl AppState {
    pub fn new(gateway: CompletionGateway, store: TranscriptStore, admin: AdminConfig) -> Self {
        Self {
            gateway,
            store,
            admin,
        }
    }
}

/// Build the complete application router.
pub fn build(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(chat::router())
        .merge(transcripts::router())
        .merge(admin::router());

    Router::new()
        .merge(health::router())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers for driving the router in tests.

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Response};
    use parley_core::config::{Config, StoreConfig};
    use tower::ServiceExt;

    /// In-memory store, OpenAI pointed at `api_base`, optional admin secret.
    pub fn app(api_base: &str, admin_password: Option<&str>) -> Router {
        let mut config = Config::default();
        config.providers.openai.api_key = "sk-test".into();
        config.providers.openai.api_base = Some(api_base.to_string());
        config.admin.password = admin_password.map(String::from);

        let gateway = CompletionGateway::from_config(&config);
        let store = TranscriptStore::new(&StoreConfig::in_memory()).unwrap();
        build(Arc::new(AppState::new(gateway, store, config.admin)))
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn post_raw(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
