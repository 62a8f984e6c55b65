//! Core types for Parley — the canonical chat request/response and the
//! transcript records persisted at the end of each conversational phase.
//!
//! JSON on the wire uses **camelCase** keys; Rust uses snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::utils::parse_timestamp;

// ─────────────────────────────────────────────
// Chat messages (canonical, vendor-neutral)
// ─────────────────────────────────────────────

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One turn of a conversation, as exchanged with the completion gateway.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The canonical request every adapter translates from.
///
/// `messages` is ordered and only ever appended to by the caller.
/// `system_prompt` is expected to be non-empty.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub system_prompt: String,
}

impl ChatRequest {
    pub fn new(system_prompt: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            system_prompt: system_prompt.into(),
        }
    }
}

/// A single completion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub text: String,
}

// ─────────────────────────────────────────────
// Display messages
// ─────────────────────────────────────────────

/// Author of a display message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

/// A message as it was shown to the end user.
///
/// Independent of `conversation_history`: the seed turn never appears here,
/// and fallback texts shown on errors never reach the gateway.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl DisplayMessage {
    pub fn now(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

// ─────────────────────────────────────────────
// Transcripts
// ─────────────────────────────────────────────

/// An incoming transcript, exactly as a caller submitted it.
///
/// Required fields are optional here so that absence is reported as a
/// [`ValidationError`] instead of a deserialization failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTranscript {
    pub session_id: Option<String>,
    pub prompt_version: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub conversation_history: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub messages: Vec<DisplayMessage>,
    pub user_metadata: Option<serde_json::Value>,
}

/// A transcript that passed validation and is ready to be stored.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptDraft {
    pub session_id: String,
    pub prompt_version: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub conversation_history: Vec<ChatMessage>,
    pub messages: Vec<DisplayMessage>,
    pub user_metadata: Option<serde_json::Value>,
}

impl NewTranscript {
    /// Check required fields and parse timestamps.
    ///
    /// `sessionId`, `promptVersion`, `startTime` and `conversationHistory`
    /// must be present; empty strings count as absent. An empty
    /// `conversationHistory` array is accepted.
    pub fn validate(self) -> Result<TranscriptDraft, ValidationError> {
        let session_id = non_empty(self.session_id);
        let prompt_version = non_empty(self.prompt_version);
        let start_time = non_empty(self.start_time);

        let mut missing = Vec::new();
        if session_id.is_none() {
            missing.push("sessionId");
        }
        if prompt_version.is_none() {
            missing.push("promptVersion");
        }
        if start_time.is_none() {
            missing.push("startTime");
        }
        if self.conversation_history.is_none() {
            missing.push("conversationHistory");
        }

        let (Some(session_id), Some(prompt_version), Some(start_time), Some(history)) = (
            session_id,
            prompt_version,
            start_time,
            self.conversation_history,
        ) else {
            return Err(ValidationError::MissingFields(missing));
        };

        let start_time = parse_field("startTime", &start_time)?;
        let end_time = match non_empty(self.end_time) {
            Some(raw) => Some(parse_field("endTime", &raw)?),
            None => None,
        };

        Ok(TranscriptDraft {
            session_id,
            prompt_version,
            start_time,
            end_time,
            conversation_history: history,
            messages: self.messages,
            user_metadata: self.user_metadata.filter(|v| !v.is_null()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_field(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    parse_timestamp(raw).map_err(|e| ValidationError::InvalidField {
        field,
        reason: format!("expected an RFC 3339 timestamp ({e})"),
    })
}

/// A persisted transcript. Immutable once stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: String,
    pub session_id: String,
    pub prompt_version: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub conversation_history: Vec<ChatMessage>,
    pub messages: Vec<DisplayMessage>,
    pub user_metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// What the store hands back after a successful insert.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptReceipt {
    pub id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────
// Queries and pagination
// ─────────────────────────────────────────────

/// Restricts a transcript query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranscriptFilter {
    pub prompt_version: Option<String>,
}

impl TranscriptFilter {
    pub fn prompt_version(version: impl Into<String>) -> Self {
        Self {
            prompt_version: Some(version.into()),
        }
    }
}

/// Pagination state returned alongside every page.
///
/// Always built through [`Pagination::new`], so `has_more` can never
/// disagree with the other three fields.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: u64, limit: u32, offset: u64) -> Self {
        Self {
            total,
            limit,
            offset,
            has_more: offset.saturating_add(u64::from(limit)) < total,
        }
    }
}

/// One page of transcripts, newest first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TranscriptPage {
    pub transcripts: Vec<Transcript>,
    pub pagination: Pagination,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
