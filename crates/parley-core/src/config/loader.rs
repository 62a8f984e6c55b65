//! Config loader — reads `~/.parley/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.parley/config.json`
//! 3. Conventional vendor variables (`OPENAI_API_KEY`, `LLM_MODEL`, ...)
//! 4. Environment variables `PARLEY_<SECTION>__<FIELD>` (override everything)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Conventional variables:
/// - `LLM_MODEL` → `model`
/// - `OPENAI_API_KEY` → `providers.openai.api_key`
/// - `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_ENDPOINT`, `OPENAI_API_VERSION` → `providers.azure_openai.*`
/// - `ANTHROPIC_API_KEY` → `providers.anthropic.api_key`
/// - `ADMIN_PASSWORD` → `admin.password`
/// - `DATABASE_URL` → `store.database_url`
///
/// Namespaced variables (`PARLEY_<SECTION>__<FIELD>`, double underscore as
/// delimiter) are applied afterwards and win:
/// - `PARLEY_MODEL`, `PARLEY_MAX_TOKENS`
/// - `PARLEY_PROVIDERS__<OPENAI|AZURE_OPENAI|ANTHROPIC>__API_KEY`
/// - `PARLEY_PROVIDERS__<OPENAI|ANTHROPIC>__API_BASE`
/// - `PARLEY_PROVIDERS__AZURE_OPENAI__ENDPOINT`, `PARLEY_PROVIDERS__AZURE_OPENAI__API_VERSION`
/// - `PARLEY_STORE__DATABASE_URL`, `PARLEY_STORE__MAX_CONNECTIONS`
/// - `PARLEY_SERVER__HOST`, `PARLEY_SERVER__PORT`
/// - `PARLEY_ADMIN__PASSWORD`
fn apply_env_overrides(mut config: Config) -> Config {
    // Conventional names
    set_string("LLM_MODEL", &mut config.model);
    set_string("OPENAI_API_KEY", &mut config.providers.openai.api_key);
    set_string("AZURE_OPENAI_API_KEY", &mut config.providers.azure_openai.api_key);
    set_string("AZURE_OPENAI_ENDPOINT", &mut config.providers.azure_openai.endpoint);
    set_string("OPENAI_API_VERSION", &mut config.providers.azure_openai.api_version);
    set_string("ANTHROPIC_API_KEY", &mut config.providers.anthropic.api_key);
    set_string("DATABASE_URL", &mut config.store.database_url);
    if let Ok(val) = std::env::var("ADMIN_PASSWORD") {
        config.admin.password = Some(val);
    }

    // Namespaced
    set_string("PARLEY_MODEL", &mut config.model);
    set_parsed("PARLEY_MAX_TOKENS", &mut config.max_tokens);

    let providers = &mut config.providers;
    set_string("PARLEY_PROVIDERS__OPENAI__API_KEY", &mut providers.openai.api_key);
    if let Ok(val) = std::env::var("PARLEY_PROVIDERS__OPENAI__API_BASE") {
        providers.openai.api_base = Some(val);
    }
    set_string(
        "PARLEY_PROVIDERS__AZURE_OPENAI__API_KEY",
        &mut providers.azure_openai.api_key,
    );
    set_string(
        "PARLEY_PROVIDERS__AZURE_OPENAI__ENDPOINT",
        &mut providers.azure_openai.endpoint,
    );
    set_string(
        "PARLEY_PROVIDERS__AZURE_OPENAI__API_VERSION",
        &mut providers.azure_openai.api_version,
    );
    set_string("PARLEY_PROVIDERS__ANTHROPIC__API_KEY", &mut providers.anthropic.api_key);
    if let Ok(val) = std::env::var("PARLEY_PROVIDERS__ANTHROPIC__API_BASE") {
        providers.anthropic.api_base = Some(val);
    }

    set_string("PARLEY_STORE__DATABASE_URL", &mut config.store.database_url);
    set_parsed("PARLEY_STORE__MAX_CONNECTIONS", &mut config.store.max_connections);

    set_string("PARLEY_SERVER__HOST", &mut config.server.host);
    set_parsed("PARLEY_SERVER__PORT", &mut config.server.port);

    if let Ok(val) = std::env::var("PARLEY_ADMIN__PASSWORD") {
        config.admin.password = Some(val);
    }

    config
}

fn set_string(key: &str, target: &mut String) {
    if let Ok(val) = std::env::var(key) {
        *target = val;
    }
}

fn set_parsed<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(val) = std::env::var(key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(key, value = %val, "ignoring unparsable env override"),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
