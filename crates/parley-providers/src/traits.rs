//! Completion adapter trait — the seam between the gateway and each vendor.

use async_trait::async_trait;
use parley_core::{ChatRequest, Error};

use crate::registry::{ProviderConfig, ProviderKind};

/// Translates one canonical [`ChatRequest`] into one vendor call and back.
///
/// Implementations never retry and never interpret an error body beyond
/// logging it. They receive requests that the gateway has already seeded.
#[async_trait]
pub trait CompletionAdapter: Send + Sync {
    /// Which provider this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Run one completion.
    ///
    /// # Returns
    /// The non-empty completion text, or:
    /// - `Error::Upstream` for a non-2xx response, a transport failure, or a
    ///   payload without the expected shape
    /// - `Error::Config` if this adapter's credentials are missing
    async fn complete(&self, request: &ChatRequest, target: &ProviderConfig)
        -> Result<String, Error>;
}
