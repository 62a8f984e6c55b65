//! Store error type.

use parley_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The transcript was rejected before touching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A structured field could not be serialized to JSON.
    #[error("failed to encode transcript: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored column could not be read back.
    #[error("failed to decode column {column}: {source}")]
    Decode {
        column: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    pub(crate) fn decode(
        column: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Decode {
            column,
            source: Box::new(source),
        }
    }
}

impl From<StoreError> for parley_core::Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(v) => parley_core::Error::Validation(v),
            other => parley_core::Error::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_stays_client_class() {
        let err: parley_core::Error =
            StoreError::from(ValidationError::MissingFields(vec!["sessionId"])).into();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_database_error_becomes_storage() {
        let err: parley_core::Error = StoreError::Database(sqlx::Error::PoolClosed).into();
        assert!(!err.is_client_error());
        assert!(matches!(err, parley_core::Error::Storage(ref m) if m.contains("database error")));
    }
}
