//! Completion gateway — the single entry point for callers.
//!
//! One `send` resolves the model identifier, seeds an empty conversation,
//! makes exactly one adapter call and hands back the result unchanged.

use std::sync::Arc;

use parley_core::config::Config;
use parley_core::{ChatMessage, ChatRequest, ChatResponse, Error};
use tracing::debug;

use crate::registry::{AdapterRegistry, ModelRouter};

/// First turn sent when a conversation has no messages yet.
pub const SEED_MESSAGE: &str = "Begin the onboarding conversation.";

/// Messages to send downstream: the caller's, or the lone seed turn.
pub fn seed_messages(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    if messages.is_empty() {
        vec![ChatMessage::user(SEED_MESSAGE)]
    } else {
        messages.to_vec()
    }
}

/// Stateless between calls; cheap to clone and share across tasks.
#[derive(Clone, Debug)]
pub struct CompletionGateway {
    router: ModelRouter,
    adapters: Arc<AdapterRegistry>,
    default_model: String,
}

impl CompletionGateway {
    pub fn new(
        router: ModelRouter,
        adapters: AdapterRegistry,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            router,
            adapters: Arc::new(adapters),
            default_model: default_model.into(),
        }
    }

    /// Prefix-routed gateway over the HTTP adapters.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ModelRouter::ByPrefix,
            AdapterRegistry::from_config(&config.providers, config.max_tokens),
            config.model.clone(),
        )
    }

    /// The model identifier used by [`send_default`](Self::send_default).
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Run one completion against `model_identifier`.
    pub async fn send(
        &self,
        request: &ChatRequest,
        model_identifier: &str,
    ) -> Result<ChatResponse, Error> {
        let target = self.router.resolve(model_identifier);
        let adapter = self.adapters.adapter(target.kind());

        let seeded = ChatRequest {
            messages: seed_messages(&request.messages),
            system_prompt: request.system_prompt.clone(),
        };

        debug!(
            provider = %target,
            messages = seeded.messages.len(),
            seeded = request.messages.is_empty(),
            "Dispatching completion"
        );

        match adapter.complete(&seeded, &target).await {
            Ok(text) => Ok(ChatResponse { text }),
            Err(e) => {
                debug!(provider = %target, error = %e, "Completion failed");
                Err(e)
            }
        }
    }

    /// Run one completion against the configured model.
    pub async fn send_default(&self, request: &ChatRequest) -> Result<ChatResponse, Error> {
        self.send(request, &self.default_model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use parley_core::{ConfigError, UpstreamError};
    use tracing_test::traced_test;

    use crate::registry::{ProviderConfig, ProviderKind};
    use crate::traits::CompletionAdapter;

    /// Records every call and answers with a fixed reply.
    struct RecordingAdapter {
        kind: ProviderKind,
        reply: Result<String, &'static str>,
        calls: Mutex<Vec<(ChatRequest, ProviderConfig)>>,
    }

    impl RecordingAdapter {
        fn ok(kind: ProviderKind, reply: &str) -> Arc<Self> {
            Arc::new(Self {
                kind,
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                reply: Err("boom"),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(ChatRequest, ProviderConfig)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionAdapter for RecordingAdapter {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn complete(
            &self,
            request: &ChatRequest,
            target: &ProviderConfig,
        ) -> Result<String, Error> {
            self.calls
                .lock()
                .unwrap()
                .push((request.clone(), target.clone()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(payload) => Err(UpstreamError::new("fake", Some(503), *payload).into()),
            }
        }
    }

    struct Fakes {
        openai: Arc<RecordingAdapter>,
        azure: Arc<RecordingAdapter>,
        anthropic: Arc<RecordingAdapter>,
    }

    fn gateway_with(router: ModelRouter) -> (CompletionGateway, Fakes) {
        let fakes = Fakes {
            openai: RecordingAdapter::ok(ProviderKind::OpenAi, "from openai"),
            azure: RecordingAdapter::ok(ProviderKind::AzureOpenAi, "from azure"),
            anthropic: RecordingAdapter::ok(ProviderKind::Anthropic, "from anthropic"),
        };
        let registry = AdapterRegistry::new(
            fakes.openai.clone(),
            fakes.azure.clone(),
            fakes.anthropic.clone(),
        );
        (CompletionGateway::new(router, registry, "gpt-4o"), fakes)
    }

    #[test]
    fn test_seed_messages() {
        assert_eq!(seed_messages(&[]), vec![ChatMessage::user(SEED_MESSAGE)]);
        let existing = vec![ChatMessage::user("Hi")];
        assert_eq!(seed_messages(&existing), existing);
    }

    #[tokio::test]
    async fn test_empty_conversation_sends_exactly_one_seed() {
        let (gateway, fakes) = gateway_with(ModelRouter::ByPrefix);
        let request = ChatRequest::new("You are L.E.", vec![]);

        let response = gateway.send(&request, "gpt-4o").await.unwrap();
        assert_eq!(response.text, "from openai");

        let calls = fakes.openai.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0.messages,
            vec![ChatMessage::user("Begin the onboarding conversation.")]
        );
        assert_eq!(calls[0].0.system_prompt, "You are L.E.");
    }

    #[tokio::test]
    async fn test_non_empty_conversation_passes_through() {
        let (gateway, fakes) = gateway_with(ModelRouter::ByPrefix);
        let messages = vec![
            ChatMessage::user("Begin the onboarding conversation."),
            ChatMessage::assistant("Hello!"),
            ChatMessage::user("Hi, I'm Sam"),
        ];
        let request = ChatRequest::new("prompt", messages.clone());

        gateway.send(&request, "gpt-4o").await.unwrap();
        assert_eq!(fakes.openai.calls()[0].0.messages, messages);
    }

    #[tokio::test]
    async fn test_routes_by_prefix() {
        let (gateway, fakes) = gateway_with(ModelRouter::ByPrefix);
        let request = ChatRequest::new("prompt", vec![ChatMessage::user("Hi")]);

        let azure = gateway.send(&request, "azure_openai:gpt4").await.unwrap();
        let anthropic = gateway.send(&request, "anthropic:claude-3").await.unwrap();

        assert_eq!(azure.text, "from azure");
        assert_eq!(anthropic.text, "from anthropic");
        assert!(fakes.openai.calls().is_empty());
        assert_eq!(
            fakes.azure.calls()[0].1,
            ProviderConfig::AzureOpenAi {
                deployment: "gpt4".into()
            }
        );
        assert_eq!(
            fakes.anthropic.calls()[0].1,
            ProviderConfig::Anthropic {
                model: "claude-3".into()
            }
        );
    }

    #[tokio::test]
    async fn test_fixed_router_ignores_identifier() {
        let (gateway, fakes) = gateway_with(ModelRouter::Fixed(ProviderConfig::Anthropic {
            model: "claude-3-haiku".into(),
        }));
        let request = ChatRequest::new("prompt", vec![ChatMessage::user("Hi")]);

        let response = gateway.send(&request, "azure_openai:gpt4").await.unwrap();
        assert_eq!(response.text, "from anthropic");
        assert!(fakes.azure.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_default_uses_configured_model() {
        let (gateway, fakes) = gateway_with(ModelRouter::ByPrefix);
        assert_eq!(gateway.default_model(), "gpt-4o");

        let request = ChatRequest::new("prompt", vec![]);
        gateway.send_default(&request).await.unwrap();
        assert_eq!(
            fakes.openai.calls()[0].1,
            ProviderConfig::OpenAi {
                model: "gpt-4o".into()
            }
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_upstream_error_is_returned_unchanged() {
        let failing = RecordingAdapter::failing(ProviderKind::OpenAi);
        let registry = AdapterRegistry::new(
            failing.clone(),
            RecordingAdapter::ok(ProviderKind::AzureOpenAi, "x"),
            RecordingAdapter::ok(ProviderKind::Anthropic, "x"),
        );
        let gateway = CompletionGateway::new(ModelRouter::ByPrefix, registry, "gpt-4o");

        let err = gateway
            .send(&ChatRequest::new("p", vec![]), "gpt-4o")
            .await
            .unwrap_err();
        match err {
            Error::Upstream(e) => {
                assert_eq!(e.status, Some(503));
                assert_eq!(e.payload, "boom");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
        // No retry
        assert_eq!(failing.calls().len(), 1);

        // Logged once, by whoever handles the error
        assert!(logs_contain("Completion failed"));
        assert!(!logs_contain("WARN"));
        assert!(!logs_contain("ERROR"));
    }

    #[tokio::test]
    async fn test_from_config_without_credentials_is_config_error() {
        let gateway = CompletionGateway::from_config(&Config::default());
        let err = gateway
            .send_default(&ChatRequest::new("p", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingCredential { .. })));
    }
}
