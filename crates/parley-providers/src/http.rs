//! Shared request/response handling for the HTTP adapters.

use parley_core::UpstreamError;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Send a prepared request and decode a 2xx body into `R`.
///
/// Transport failures, non-2xx statuses and undecodable bodies all become
/// [`UpstreamError`]; the vendor body is logged, not interpreted.
pub(crate) async fn send_json<R: DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<R, UpstreamError> {
    let response = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!(provider, error = %e, "HTTP request failed");
            return Err(UpstreamError::new(provider, None, e.to_string()));
        }
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            error!(provider, status = %status, error = %e, "Failed to read response body");
            return Err(UpstreamError::new(provider, Some(status.as_u16()), e.to_string()));
        }
    };

    if !status.is_success() {
        error!(provider, status = %status, body = %body, "API error");
        return Err(UpstreamError::new(provider, Some(status.as_u16()), body));
    }

    match serde_json::from_str::<R>(&body) {
        Ok(parsed) => {
            debug!(provider, status = %status, "Response received");
            Ok(parsed)
        }
        Err(e) => {
            error!(provider, error = %e, body = %body, "Failed to parse response");
            Err(UpstreamError::new(
                provider,
                None,
                format!("unexpected response shape: {e}"),
            ))
        }
    }
}

/// Reject a missing or blank completion.
pub(crate) fn non_empty_text(
    provider: &'static str,
    text: Option<String>,
) -> Result<String, UpstreamError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => {
            error!(provider, "Response contained no completion text");
            Err(UpstreamError::new(
                provider,
                None,
                "response contained no completion text",
            ))
        }
    }
}
