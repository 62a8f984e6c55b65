//! SQLite-backed transcript store.
//!
//! Uses the runtime-checked `sqlx::query` form, so no `DATABASE_URL` is
//! needed at compile time. The pool is lazy: nothing connects until the
//! first query.

use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use parley_core::config::StoreConfig;
use parley_core::types::{
    NewTranscript, Pagination, Transcript, TranscriptFilter, TranscriptPage, TranscriptReceipt,
};
use parley_core::utils::{format_timestamp, parse_timestamp};
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::schema::ensure_schema;

/// One row as stored, before JSON and timestamp decoding.
type TranscriptRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    String,
);

const SELECT_COLUMNS: &str = "SELECT id, session_id, prompt_version, start_time, end_time, \
     conversation_history, messages, user_metadata, created_at \
     FROM conversation_transcripts";

/// Append-only transcript storage. Cheap to clone; clones share the pool.
#[derive(Clone, Debug)]
pub struct TranscriptStore {
    pool: SqlitePool,
}

impl TranscriptStore {
    /// Build a store from configuration without connecting.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let options =
            SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

        let mut pool_options =
            SqlitePoolOptions::new().max_connections(config.max_connections.max(1));
        if config.database_url.contains(":memory:") {
            // Every connection to `:memory:` is a fresh database; keep the one we have.
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        info!(
            database_url = %config.database_url,
            max_connections = config.max_connections,
            "Transcript store configured"
        );
        Ok(Self {
            pool: pool_options.connect_lazy_with(options),
        })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Provision the table and indexes. See [`ensure_schema`].
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        ensure_schema(&self.pool).await
    }

    /// Validate and persist one transcript.
    ///
    /// Nothing is written when validation fails. A provisioning failure is
    /// logged and the insert is attempted anyway.
    pub async fn insert(&self, transcript: NewTranscript) -> Result<TranscriptReceipt, StoreError> {
        let draft = transcript.validate()?;

        if let Err(e) = self.ensure_schema().await {
            warn!(error = %e, "Schema provisioning failed; attempting insert anyway");
        }

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().trunc_subsecs(6);
        let created_at_str = format_timestamp(&created_at);

        let history = serde_json::to_string(&draft.conversation_history)?;
        let messages = serde_json::to_string(&draft.messages)?;
        let metadata = draft
            .user_metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            "INSERT INTO conversation_transcripts (id, session_id, prompt_version, start_time, end_time, \
             conversation_history, messages, user_metadata, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&id)
        .bind(&draft.session_id)
        .bind(&draft.prompt_version)
        .bind(format_timestamp(&draft.start_time))
        .bind(draft.end_time.as_ref().map(format_timestamp))
        .bind(&history)
        .bind(&messages)
        .bind(&metadata)
        .bind(&created_at_str)
        .bind(&created_at_str)
        .execute(&self.pool)
        .await?;

        debug!(
            id = %id,
            session_id = %draft.session_id,
            prompt_version = %draft.prompt_version,
            "Transcript saved"
        );

        Ok(TranscriptReceipt {
            id,
            session_id: draft.session_id,
            created_at,
        })
    }

    /// One page of transcripts, newest first, plus the total matching `filter`.
    pub async fn query(
        &self,
        filter: &TranscriptFilter,
        limit: u32,
        offset: u64,
    ) -> Result<TranscriptPage, StoreError> {
        let sql_limit = i64::from(limit);
        let sql_offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let (rows, total) = if let Some(version) = &filter.prompt_version {
            let sql = format!(
                "{SELECT_COLUMNS} WHERE prompt_version = ?1 \
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3"
            );
            let rows: Vec<TranscriptRow> = sqlx::query_as(&sql)
                .bind(version)
                .bind(sql_limit)
                .bind(sql_offset)
                .fetch_all(&self.pool)
                .await?;
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM conversation_transcripts WHERE prompt_version = ?1",
            )
            .bind(version)
            .fetch_one(&self.pool)
            .await?;
            (rows, total)
        } else {
            let sql = format!(
                "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
            );
            let rows: Vec<TranscriptRow> = sqlx::query_as(&sql)
                .bind(sql_limit)
                .bind(sql_offset)
                .fetch_all(&self.pool)
                .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversation_transcripts")
                .fetch_one(&self.pool)
                .await?;
            (rows, total)
        };

        let transcripts = rows
            .into_iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;
        let total = u64::try_from(total).unwrap_or_default();

        debug!(
            prompt_version = ?filter.prompt_version,
            returned = transcripts.len(),
            total,
            "Transcripts queried"
        );

        Ok(TranscriptPage {
            transcripts,
            pagination: Pagination::new(total, limit, offset),
        })
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn decode_row(row: TranscriptRow) -> Result<Transcript, StoreError> {
    let (
        id,
        session_id,
        prompt_version,
        start_time,
        end_time,
        conversation_history,
        messages,
        user_metadata,
        created_at,
    ) = row;

    Ok(Transcript {
        id,
        session_id,
        prompt_version,
        start_time: decode_time("start_time", &start_time)?,
        end_time: end_time
            .as_deref()
            .map(|raw| decode_time("end_time", raw))
            .transpose()?,
        conversation_history: decode_json("conversation_history", &conversation_history)?,
        messages: decode_json("messages", &messages)?,
        user_metadata: user_metadata
            .as_deref()
            .map(|raw| decode_json("user_metadata", raw))
            .transpose()?,
        created_at: decode_time("created_at", &created_at)?,
    })
}

fn decode_time(column: &'static str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    parse_timestamp(raw).map_err(|e| StoreError::decode(column, e))
}

fn decode_json<T: DeserializeOwned>(column: &'static str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::decode(column, e))
}
