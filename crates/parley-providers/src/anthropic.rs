//! Anthropic Messages API adapter.
//!
//! The system prompt travels in its own top-level field; `messages` is sent
//! exactly as the caller built it.

use async_trait::async_trait;
use parley_core::config::AnthropicConfig;
use parley_core::{ChatMessage, ChatRequest, ConfigError, Error};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{non_empty_text, send_json};
use crate::registry::{ProviderConfig, ProviderKind};
use crate::traits::CompletionAdapter;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first `text` block.
    fn into_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
    }
}

/// Talks to `POST {api_base}/messages` with `x-api-key` authentication.
pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    api_version: String,
    max_tokens: u32,
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnthropicAdapter {
    pub fn new(config: &AnthropicConfig, client: reqwest::Client, max_tokens: u32) -> Self {
        let api_base = config
            .api_base
            .clone()
            .or_else(|| ProviderKind::Anthropic.spec().default_api_base.map(String::from))
            .unwrap_or_default();

        Self {
            client,
            api_base,
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            max_tokens,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn complete(
        &self,
        request: &ChatRequest,
        target: &ProviderConfig,
    ) -> Result<String, Error> {
        let spec = ProviderKind::Anthropic.spec();
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingCredential {
                provider: spec.display_name,
                env_key: spec.env_key,
            }
            .into());
        }

        let model = target.target_name();
        debug!(
            provider = spec.display_name,
            model,
            messages = request.messages.len(),
            "Calling LLM"
        );

        let body = MessagesRequest {
            model,
            max_tokens: self.max_tokens,
            system: &request.system_prompt,
            messages: &request.messages,
        };

        let http = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body);

        let response: MessagesResponse = send_json(spec.display_name, http).await?;
        Ok(non_empty_text(spec.display_name, response.into_text())?)
    }
}
