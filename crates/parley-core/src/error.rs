//! Error taxonomy shared by the gateway, the store, and the HTTP layer.
//!
//! Every failure is classified once: client-class (`Validation`) or
//! server-class (everything else). Callers at the edge decide how to render it.

use thiserror::Error;

/// A transcript failed validation before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are absent or empty.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A field is present but cannot be interpreted.
    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// A vendor call failed, or returned a payload without the expected shape.
///
/// `status` is `None` when the request never produced an HTTP response
/// (connection refused, TLS failure, ...) or when a 2xx body was unusable.
#[derive(Debug, Clone, Error)]
pub struct UpstreamError {
    /// Display name of the provider that failed.
    pub provider: &'static str,
    /// HTTP status from the vendor, if one was received.
    pub status: Option<u16>,
    /// Raw vendor payload or transport error text. Logged, never surfaced.
    pub payload: String,
}

impl UpstreamError {
    pub fn new(provider: &'static str, status: Option<u16>, payload: impl Into<String>) -> Self {
        Self {
            provider,
            status,
            payload: payload.into(),
        }
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "{} upstream error (status: {}): {}",
                self.provider, status, self.payload
            ),
            None => write!(
                f,
                "{} upstream error (status: none): {}",
                self.provider, self.payload
            ),
        }
    }
}

/// A required secret or credential is not configured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{provider} is not configured: set {env_key}")]
    MissingCredential {
        provider: &'static str,
        env_key: &'static str,
    },

    #[error("{provider} endpoint {endpoint:?} is not a valid base URL")]
    InvalidEndpoint {
        provider: &'static str,
        endpoint: String,
    },

    #[error("Admin password not configured")]
    MissingAdminSecret,
}

/// Umbrella error for everything the core can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Backing-store failure; the message is forwarded for diagnostics.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Whether the caller is at fault (400-class) rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = ValidationError::MissingFields(vec!["sessionId", "conversationHistory"]);
        assert_eq!(
            err.to_string(),
            "Missing required fields: sessionId, conversationHistory"
        );
    }

    #[test]
    fn test_upstream_display_with_and_without_status() {
        let with = UpstreamError::new("OpenAI", Some(429), "rate limited");
        assert!(with.to_string().contains("429"));
        let without = UpstreamError::new("Anthropic", None, "connection refused");
        assert!(without.to_string().contains("none"));
        assert!(without.to_string().contains("Anthropic"));
    }

    #[test]
    fn test_error_classes() {
        let v: Error = ValidationError::MissingFields(vec!["startTime"]).into();
        assert!(v.is_client_error());

        let u: Error = UpstreamError::new("OpenAI", Some(500), "boom").into();
        assert!(!u.is_client_error());

        let c: Error = ConfigError::MissingAdminSecret.into();
        assert!(!c.is_client_error());
        assert!(!Error::Storage("disk full".into()).is_client_error());
    }
}
