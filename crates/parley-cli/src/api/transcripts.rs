//! Transcript endpoints.
//!
//! - `GET /api/transcripts?prompt_version=&limit=&offset=` — newest first
//! - `POST /api/transcripts` — save one completed phase, 201 on success

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use parley_core::types::{NewTranscript, TranscriptFilter, TranscriptPage};

use super::{ApiError, AppState};

/// Page size when `limit` is omitted.
const DEFAULT_LIMIT: u32 = 50;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/transcripts", get(list_transcripts).post(create_transcript))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(alias = "promptVersion")]
    pub prompt_version: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

pub async fn list_transcripts(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<TranscriptPage>, ApiError> {
    let Query(params) = params?;
    let filter = TranscriptFilter {
        prompt_version: params.prompt_version.filter(|v| !v.is_empty()),
    };

    let page = state
        .store
        .query(
            &filter,
            params.limit.unwrap_or(DEFAULT_LIMIT),
            params.offset.unwrap_or(0),
        )
        .await
        .map_err(|e| ApiError::from_core(e.into(), "Failed to fetch transcripts"))?;
    Ok(Json(page))
}

pub async fn create_transcript(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTranscript>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(transcript) = payload?;
    let receipt = state
        .store
        .insert(transcript)
        .await
        .map_err(|e| ApiError::from_core(e.into(), "Failed to save transcript"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "transcript": receipt })),
    ))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, get, json_body, post_json, post_raw, send};
    use axum::http::StatusCode;
    use axum::Router;
    use serde_json::{json, Value};

    fn body(session_id: &str, prompt_version: &str) -> Value {
        json!({
            "sessionId": session_id,
            "promptVersion": prompt_version,
            "startTime": "2024-02-16T10:00:00.000Z",
            "endTime": "2024-02-16T10:12:30.000Z",
            "conversationHistory": [
                {"role": "user", "content": "Begin the onboarding conversation."},
                {"role": "assistant", "content": "Hi! What should I call you?"}
            ],
            "messages": [
                {"sender": "agent", "text": "Hi! What should I call you?", "timestamp": "2024-02-16T10:00:01.000Z"}
            ],
            "userMetadata": {"phase": 1, "phaseKey": "supportive"}
        })
    }

    async fn create(app: &Router, session_id: &str, prompt_version: &str) -> Value {
        let response = send(app, post_json("/api/transcripts", body(session_id, prompt_version))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_create_returns_receipt() {
        let app = app("http://127.0.0.1:1", None);
        let created = create(&app, "s-1", "v1").await;

        assert_eq!(created["success"], true);
        assert_eq!(created["transcript"]["sessionId"], "s-1");
        assert!(created["transcript"]["id"].is_string());
        assert!(created["transcript"]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_create_missing_fields_is_400() {
        let app = app("http://127.0.0.1:1", None);
        create(&app, "s-0", "v1").await;
        let mut incomplete = body("s-1", "v1");
        incomplete.as_object_mut().unwrap().remove("conversationHistory");

        let response = send(&app, post_json("/api/transcripts", incomplete)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = json_body(response).await;
        assert_eq!(error["error"], "Missing required fields: conversationHistory");

        let listed = json_body(send(&app, get("/api/transcripts")).await).await;
        assert_eq!(listed["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_create_malformed_json_is_400() {
        let app = app("http://127.0.0.1:1", None);
        let response = send(&app, post_raw("/api/transcripts", "{\"sessionId\": ")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_round_trip_and_pagination() {
        let app = app("http://127.0.0.1:1", None);
        for (session, version) in [("a", "v1"), ("b", "v2"), ("c", "v1")] {
            create(&app, session, version).await;
        }

        let page = json_body(send(&app, get("/api/transcripts?limit=2")).await).await;
        assert_eq!(
            page["pagination"],
            json!({"total": 3, "limit": 2, "offset": 0, "hasMore": true})
        );
        let transcripts = page["transcripts"].as_array().unwrap();
        assert_eq!(transcripts.len(), 2);
        assert_eq!(transcripts[0]["sessionId"], "c");
        assert_eq!(transcripts[0]["userMetadata"]["phaseKey"], "supportive");
        assert_eq!(
            transcripts[0]["conversationHistory"][1]["content"],
            "Hi! What should I call you?"
        );

        let rest = json_body(send(&app, get("/api/transcripts?limit=2&offset=2")).await).await;
        assert_eq!(rest["transcripts"].as_array().unwrap().len(), 1);
        assert_eq!(rest["pagination"]["hasMore"], false);
    }

    #[tokio::test]
    async fn test_list_filters_by_prompt_version() {
        let app = app("http://127.0.0.1:1", None);
        for (session, version) in [("a", "v1"), ("b", "v2"), ("c", "v1")] {
            create(&app, session, version).await;
        }

        for uri in [
            "/api/transcripts?prompt_version=v1",
            "/api/transcripts?promptVersion=v1",
        ] {
            let page = json_body(send(&app, get(uri)).await).await;
            assert_eq!(page["pagination"]["total"], 2);
            assert_eq!(page["pagination"]["limit"], 50);
            assert!(page["transcripts"]
                .as_array()
                .unwrap()
                .iter()
                .all(|t| t["promptVersion"] == "v1"));
        }
    }

    #[tokio::test]
    async fn test_list_bad_limit_is_400() {
        let app = app("http://127.0.0.1:1", None);
        let response = send(&app, get("/api/transcripts?limit=lots")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
