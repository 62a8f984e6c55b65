//! Transcript table DDL.
//!
//! Structured fields are JSON text. Timestamps are fixed-width RFC 3339
//! strings, so `ORDER BY created_at` is chronological.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreError;

pub const TABLE: &str = "conversation_transcripts";

const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS conversation_transcripts (
    id TEXT PRIMARY KEY NOT NULL,
    session_id TEXT NOT NULL,
    prompt_version TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    conversation_history TEXT NOT NULL,
    messages TEXT NOT NULL,
    user_metadata TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const CREATE_INDEXES: [&str; 4] = [
    "CREATE INDEX IF NOT EXISTS idx_prompt_version \
     ON conversation_transcripts(prompt_version)",
    "CREATE INDEX IF NOT EXISTS idx_session_id \
     ON conversation_transcripts(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_created_at \
     ON conversation_transcripts(created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_prompt_version_created_at \
     ON conversation_transcripts(prompt_version, created_at DESC)",
];

/// Create the transcript table and its four indexes if absent.
///
/// Safe to call any number of times.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(CREATE_TABLE).execute(pool).await?;
    for ddl in CREATE_INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    debug!(table = TABLE, "Schema ensured");
    Ok(())
}
