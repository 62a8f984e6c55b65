//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `StoreConfig`, `ServerConfig`,
//! `AdminConfig`, `Vec<PhaseConfig>`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.parley/config.json` + env vars.
///
/// Built once at process start and passed by reference to the gateway and
/// the store. Neither of them reads the environment on its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Model identifier, e.g. `"gpt-4o"`, `"azure_openai:gpt4"`, `"anthropic:claude-3"`.
    pub model: String,
    /// Maximum tokens to generate per completion.
    pub max_tokens: u32,
    pub providers: ProvidersConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub admin: AdminConfig,
    /// Scripted phases, run in order by `parley chat`.
    pub phases: Vec<PhaseConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 1000,
            providers: ProvidersConfig::default(),
            store: StoreConfig::default(),
            server: ServerConfig::default(),
            admin: AdminConfig::default(),
            phases: default_phases(),
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Credentials for the standard OpenAI API.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Custom API base URL (defaults to `https://api.openai.com/v1`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// Credentials and endpoint for Azure-hosted OpenAI deployments.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureOpenAiConfig {
    pub api_key: String,
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    pub api_version: String,
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: String::new(),
            api_version: "2024-12-01-preview".to_string(),
        }
    }
}

/// Credentials for the Anthropic Messages API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnthropicConfig {
    pub api_key: String,
    /// Custom API base URL (defaults to `https://api.anthropic.com/v1`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Value of the `anthropic-version` header.
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// All provider configurations, one per supported vendor.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: OpenAiConfig,
    pub azure_openai: AzureOpenAiConfig,
    pub anthropic: AnthropicConfig,
}

// ─────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────

/// Transcript store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// sqlx connection URL, e.g. `sqlite://parley.db` or `sqlite::memory:`.
    pub database_url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://parley.db".to_string(),
            max_connections: 5,
        }
    }
}

impl StoreConfig {
    /// A private in-memory database. Used by tests.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

// ─────────────────────────────────────────────
// Server / admin
// ─────────────────────────────────────────────

/// HTTP server bind settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Shared secret guarding the admin transcript viewer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AdminConfig {
    /// The configured secret, treating an empty string as unset.
    pub fn secret(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

// ─────────────────────────────────────────────
// Phases
// ─────────────────────────────────────────────

/// One scripted conversational phase.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PhaseConfig {
    /// Short stable key, recorded in transcript metadata.
    pub key: String,
    /// Tag stored on every transcript this phase produces.
    pub prompt_version: String,
    /// Human-readable label for terminal output.
    pub label: String,
    pub system_prompt: String,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            key: "default".to_string(),
            prompt_version: "v1".to_string(),
            label: "Onboarding".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are an onboarding companion. \
Ask the learner a few short, friendly questions, one at a time, to learn \
their name, their goals, and how they prefer to learn. Keep every reply \
under three sentences and end the conversation warmly once you have enough.";

/// The two A/B onboarding variants, run back to back in one session.
pub fn default_phases() -> Vec<PhaseConfig> {
    vec![
        PhaseConfig {
            key: "supportive".to_string(),
            prompt_version: "02-16-com-supp".to_string(),
            label: "Var. A Supp. 02-16-01".to_string(),
            system_prompt: SUPPORTIVE_PROMPT.to_string(),
        },
        PhaseConfig {
            key: "exploratory".to_string(),
            prompt_version: "02-16-com-expl".to_string(),
            label: "Var. B Expl. 02-16-01".to_string(),
            system_prompt: EXPLORATORY_PROMPT.to_string(),
        },
    ]
}

const SUPPORTIVE_PROMPT: &str = "You are L.E., an AI learning companion \
onboarding a learner into AI Fundamentals. Act as a warm, steady coach. \
Ask one question at a time and keep replies under about 75 words. \
Move in order: welcome them and explain that their answers shape pacing and \
examples, ask for consent, then the name they'd like you to use; ask what \
brought them here and which career direction feels closest (advancing, \
transitioning, re-entering, or deepening); ask what skills and experience \
they already have and how comfortable they feel in courses; ask how they \
like to learn; then summarize what you will tailor and what happens next. \
Validate effort and uncertainty, never test or label them, and remind them \
that nothing is locked in. Do not teach AI yet.";

const EXPLORATORY_PROMPT: &str = "You are L.E., an AI learning companion \
onboarding a learner into AI Fundamentals. Act as a curious, precise guide \
who explores the learner's goals, context and patterns in some depth. \
Never put more than one question in a message and keep replies under about \
75 words. Move in order: explain why you are asking and get consent, then \
their preferred name; explore what brought them here and their near-term \
career direction; map their skills, domains of experience and prior \
learning; ask how they learn best and what gets in the way; then reflect \
back a concrete, editable plan. You may ask one brief follow-up per step \
when it sharpens personalization. Do not evaluate them or teach AI yet.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.max_tokens, 1000);
        assert_eq!(cfg.providers.azure_openai.api_version, "2024-12-01-preview");
        assert_eq!(cfg.providers.anthropic.api_version, "2023-06-01");
        assert_eq!(cfg.phases.len(), 2);
        assert!(cfg.admin.secret().is_none());
    }

    #[test]
    fn test_default_phases_are_distinct_variants() {
        let phases = default_phases();
        assert_eq!(phases[0].prompt_version, "02-16-com-supp");
        assert_eq!(phases[1].prompt_version, "02-16-com-expl");
        assert_ne!(phases[0].key, phases[1].key);
        assert_ne!(phases[0].label, phases[1].label);
        assert_ne!(phases[0].system_prompt, phases[1].system_prompt);
        assert!(phases.iter().all(|p| !p.system_prompt.is_empty()));
    }

    #[test]
    fn test_camel_case_round_trip() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json.get("maxTokens").is_some());
        assert!(json["providers"].get("azureOpenai").is_some());
        assert!(json["store"].get("databaseUrl").is_some());
        assert!(json["phases"][0].get("systemPrompt").is_some());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"model": "anthropic:claude-3"}"#).unwrap();
        assert_eq!(cfg.model, "anthropic:claude-3");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.store.database_url, "sqlite://parley.db");
    }

    #[test]
    fn test_empty_admin_password_is_unset() {
        let admin = AdminConfig {
            password: Some(String::new()),
        };
        assert!(admin.secret().is_none());
    }
}
