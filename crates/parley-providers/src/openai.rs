//! OpenAI chat completions adapter.
//!
//! Also owns the chat-completions wire types, which the Azure adapter reuses:
//! both vendors take the system prompt as a leading `system` message.

use async_trait::async_trait;
use parley_core::config::OpenAiConfig;
use parley_core::{ChatMessage, ChatRequest, ConfigError, Error};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{non_empty_text, send_json};
use crate::registry::{ProviderConfig, ProviderKind};
use crate::traits::CompletionAdapter;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

/// Request body for a chat-completions call.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    /// Omitted for Azure, where the deployment picks the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

/// Raw chat-completions response. Only the fields we read.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistantMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if any.
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

/// The system prompt as a leading `system` message, followed by the
/// conversation in order.
pub(crate) fn with_system_prompt(request: &ChatRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(ChatMessage::system(request.system_prompt.clone()));
    messages.extend(request.messages.iter().cloned());
    messages
}

// ─────────────────────────────────────────────
// OpenAiAdapter
// ─────────────────────────────────────────────

/// Talks to `POST {api_base}/chat/completions` with bearer authentication.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiAdapter {
    pub fn new(config: &OpenAiConfig, client: reqwest::Client, max_tokens: u32) -> Self {
        // config > provider default
        let api_base = config
            .api_base
            .clone()
            .or_else(|| ProviderKind::OpenAi.spec().default_api_base.map(String::from))
            .unwrap_or_default();

        Self {
            client,
            api_base,
            api_key: config.api_key.clone(),
            max_tokens,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn complete(
        &self,
        request: &ChatRequest,
        target: &ProviderConfig,
    ) -> Result<String, Error> {
        let spec = ProviderKind::OpenAi.spec();
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

        let body = ChatCompletionRequest {
            model: Some(model),
            max_tokens: self.max_tokens,
            messages: with_system_prompt(request),
        };

        let http = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: ChatCompletionResponse = send_json(spec.display_name, http).await?;
        Ok(non_empty_text(spec.display_name, response.into_text())?)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
