//! Azure-hosted OpenAI adapter.
//!
//! Same chat-completions envelope as OpenAI, but the deployment lives in the
//! URL, the API version is a query parameter, and auth uses an `api-key` header.

use async_trait::async_trait;
use parley_core::config::AzureOpenAiConfig;
use parley_core::{ChatRequest, ConfigError, Error};
use tracing::debug;

use crate::http::{non_empty_text, send_json};
use crate::openai::{with_system_prompt, ChatCompletionRequest, ChatCompletionResponse};
use crate::registry::{ProviderConfig, ProviderKind};
use crate::traits::CompletionAdapter;

/// Talks to `POST {endpoint}/openai/deployments/{deployment}/chat/completions`.
pub struct AzureOpenAiAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    max_tokens: u32,
}

impl std::fmt::Debug for AzureOpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiAdapter")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AzureOpenAiAdapter {
    pub fn new(config: &AzureOpenAiConfig, client: reqwest::Client, max_tokens: u32) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            max_tokens,
        }
    }

    /// The deployment name is one escaped path segment.
    fn deployment_url(&self, deployment: &str) -> Result<reqwest::Url, ConfigError> {
        let invalid = || ConfigError::InvalidEndpoint {
            provider: ProviderKind::AzureOpenAi.spec().display_name,
            endpoint: self.endpoint.clone(),
        };

        let mut url = reqwest::Url::parse(&self.endpoint).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["openai", "deployments", deployment, "chat", "completions"]);
        Ok(url)
    }
}

#[async_trait]
impl CompletionAdapter for AzureOpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AzureOpenAi
    }

    async fn complete(
        &self,
        request: &ChatRequest,
        target: &ProviderConfig,
    ) -> Result<String, Error> {
        let spec = ProviderKind::AzureOpenAi.spec();
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingCredential {
                provider: spec.display_name,
                env_key: spec.env_key,
            }
            .into());
        }
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingCredential {
                provider: spec.display_name,
                env_key: "AZURE_OPENAI_ENDPOINT",
            }
            .into());
        }

        let deployment = target.target_name();
        let url = self.deployment_url(deployment)?;
        debug!(
            provider = spec.display_name,
            deployment,
            api_version = %self.api_version,
            messages = request.messages.len(),
            "Calling LLM"
        );

        let body = ChatCompletionRequest {
            model: None,
            max_tokens: self.max_tokens,
            messages: with_system_prompt(request),
        };

        let http = self
            .client
            .post(url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body);

        let response: ChatCompletionResponse = send_json(spec.display_name, http).await?;
        Ok(non_empty_text(spec.display_name, response.into_text())?)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
