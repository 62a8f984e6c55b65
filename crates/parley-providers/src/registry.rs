//! Provider registry — the closed set of supported vendors.
//!
//! Each `ProviderSpec` describes how to reach one vendor: display name, the
//! model-identifier prefix that routes to it, the credential it needs, and
//! its default API base. [`resolve`] maps a model identifier onto a
//! [`ProviderConfig`]; [`AdapterRegistry`] binds every [`ProviderKind`] to
//! exactly one adapter.

use std::fmt;
use std::sync::Arc;

use parley_core::config::ProvidersConfig;
use tracing::debug;

use crate::anthropic::AnthropicAdapter;
use crate::azure::AzureOpenAiAdapter;
use crate::openai::OpenAiAdapter;
use crate::traits::CompletionAdapter;

// ─────────────────────────────────────────────
// ProviderKind / ProviderSpec
// ─────────────────────────────────────────────

/// The supported vendor APIs.
///
/// Adding a variant forces every exhaustive `match` below (spec lookup,
/// config construction, adapter binding) to be extended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    AzureOpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Every provider, in routing priority order.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::AzureOpenAi,
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
    ];

    /// The static spec for this provider.
    pub fn spec(self) -> &'static ProviderSpec {
        match self {
            ProviderKind::AzureOpenAi => &PROVIDERS[0],
            ProviderKind::Anthropic => &PROVIDERS[1],
            ProviderKind::OpenAi => &PROVIDERS[2],
        }
    }

    /// Internal name (e.g. `"azure_openai"`).
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Human-readable name for logs.
    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    /// Whether the credentials this provider needs are present.
    pub fn is_configured(self, providers: &ProvidersConfig) -> bool {
        match self {
            ProviderKind::OpenAi => !providers.openai.api_key.is_empty(),
            ProviderKind::AzureOpenAi => {
                !providers.azure_openai.api_key.is_empty()
                    && !providers.azure_openai.endpoint.is_empty()
            }
            ProviderKind::Anthropic => !providers.anthropic.api_key.is_empty(),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static specification describing one provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Internal name (e.g. `"anthropic"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"Azure OpenAI"`.
    pub display_name: &'static str,
    /// Model-identifier prefix that routes here, e.g. `"anthropic:"`.
    /// `None` marks the fallback provider.
    pub route_prefix: Option<&'static str>,
    /// Environment variable carrying the credential.
    pub env_key: &'static str,
    /// Default API base URL. Azure has none: its endpoint is per-resource.
    pub default_api_base: Option<&'static str>,
}

/// Complete list of supported providers, in routing priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::AzureOpenAi,
        name: "azure_openai",
        display_name: "Azure OpenAI",
        route_prefix: Some("azure_openai:"),
        env_key: "AZURE_OPENAI_API_KEY",
        default_api_base: None,
    },
    ProviderSpec {
        kind: ProviderKind::Anthropic,
        name: "anthropic",
        display_name: "Anthropic",
        route_prefix: Some("anthropic:"),
        env_key: "ANTHROPIC_API_KEY",
        default_api_base: Some("https://api.anthropic.com/v1"),
    },
    // Fallback: anything without a recognised prefix.
    ProviderSpec {
        kind: ProviderKind::OpenAi,
        name: "openai",
        display_name: "OpenAI",
        route_prefix: None,
        env_key: "OPENAI_API_KEY",
        default_api_base: Some("https://api.openai.com/v1"),
    },
];

// ─────────────────────────────────────────────
// ProviderConfig + routing
// ─────────────────────────────────────────────

/// Where one completion should go. Derived from a model identifier, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderConfig {
    OpenAi { model: String },
    AzureOpenAi { deployment: String },
    Anthropic { model: String },
}

impl ProviderConfig {
    fn for_kind(kind: ProviderKind, target: &str) -> Self {
        let target = target.to_string();
        match kind {
            ProviderKind::OpenAi => ProviderConfig::OpenAi { model: target },
            ProviderKind::AzureOpenAi => ProviderConfig::AzureOpenAi { deployment: target },
            ProviderKind::Anthropic => ProviderConfig::Anthropic { model: target },
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::OpenAi { .. } => ProviderKind::OpenAi,
            ProviderConfig::AzureOpenAi { .. } => ProviderKind::AzureOpenAi,
            ProviderConfig::Anthropic { .. } => ProviderKind::Anthropic,
        }
    }

    /// The model name, or the deployment name for Azure.
    pub fn target_name(&self) -> &str {
        match self {
            ProviderConfig::OpenAi { model } | ProviderConfig::Anthropic { model } => model,
            ProviderConfig::AzureOpenAi { deployment } => deployment,
        }
    }
}

impl fmt::Display for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::AzureOpenAi { deployment } => {
                write!(f, "{} (deployment {})", self.kind().display_name(), deployment)
            }
            other => write!(f, "{} (model {})", other.kind().display_name(), other.target_name()),
        }
    }
}

/// Map a model identifier to a provider. Pure and total.
///
/// - `"azure_openai:<deployment>"` → Azure OpenAI
/// - `"anthropic:<model>"` → Anthropic
/// - anything else → OpenAI, with the whole identifier as the model name
pub fn resolve(model_identifier: &str) -> ProviderConfig {
    for spec in PROVIDERS {
        if let Some(rest) = spec
            .route_prefix
            .and_then(|prefix| model_identifier.strip_prefix(prefix))
        {
            return ProviderConfig::for_kind(spec.kind, rest);
        }
    }
    ProviderConfig::OpenAi {
        model: model_identifier.to_string(),
    }
}

/// Chooses the provider for each gateway call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ModelRouter {
    /// Route by identifier prefix (see [`resolve`]).
    #[default]
    ByPrefix,
    /// Always send to one provider, ignoring the identifier.
    Fixed(ProviderConfig),
}

impl ModelRouter {
    pub fn resolve(&self, model_identifier: &str) -> ProviderConfig {
        match self {
            ModelRouter::ByPrefix => resolve(model_identifier),
            ModelRouter::Fixed(config) => config.clone(),
        }
    }
}

// ─────────────────────────────────────────────
// AdapterRegistry
// ─────────────────────────────────────────────

/// Binds each [`ProviderKind`] to one adapter.
///
/// One field per provider, so a registry can't be built with a provider
/// missing and lookups can't fail.
#[derive(Clone)]
pub struct AdapterRegistry {
    openai: Arc<dyn CompletionAdapter>,
    azure_openai: Arc<dyn CompletionAdapter>,
    anthropic: Arc<dyn CompletionAdapter>,
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("openai", &self.openai.kind())
            .field("azure_openai", &self.azure_openai.kind())
            .field("anthropic", &self.anthropic.kind())
            .finish()
    }
}

impl AdapterRegistry {
    pub fn new(
        openai: Arc<dyn CompletionAdapter>,
        azure_openai: Arc<dyn CompletionAdapter>,
        anthropic: Arc<dyn CompletionAdapter>,
    ) -> Self {
        Self {
            openai,
            azure_openai,
            anthropic,
        }
    }

    /// Build the HTTP adapters from provider credentials.
    ///
    /// All adapters share one connection-pooled client.
    pub fn from_config(providers: &ProvidersConfig, max_tokens: u32) -> Self {
        let client = reqwest::Client::new();

        debug!(
            openai = ProviderKind::OpenAi.is_configured(providers),
            azure_openai = ProviderKind::AzureOpenAi.is_configured(providers),
            anthropic = ProviderKind::Anthropic.is_configured(providers),
            max_tokens,
            "Building adapter registry"
        );

        Self::new(
            Arc::new(OpenAiAdapter::new(&providers.openai, client.clone(), max_tokens)),
            Arc::new(AzureOpenAiAdapter::new(
                &providers.azure_openai,
                client.clone(),
                max_tokens,
            )),
            Arc::new(AnthropicAdapter::new(&providers.anthropic, client, max_tokens)),
        )
    }

    /// The adapter bound to `kind`.
    pub fn adapter(&self, kind: ProviderKind) -> &Arc<dyn CompletionAdapter> {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::AzureOpenAi => &self.azure_openai,
            ProviderKind::Anthropic => &self.anthropic,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
