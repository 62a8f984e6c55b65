//! Parley CLI — entry point.
//!
//! # Commands
//!
//! - `parley serve` — HTTP API (chat, transcripts, admin check, health)
//! - `parley chat` — run the scripted onboarding phases in the terminal
//! - `parley init` — write the default config
//! - `parley status` — show configuration and provider status
//! - `parley transcripts` — list saved transcripts

mod api;
mod helpers;
mod init;
mod repl;
mod serve;
mod status;
mod transcripts_cmd;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use parley_core::config::{load_config, Config};
use parley_providers::CompletionGateway;
use parley_store::TranscriptStore;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Parley — scripted onboarding conversations over any LLM backend
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Override the bind port from config
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run the onboarding phases interactively
    Chat {
        /// Model identifier, e.g. "gpt-4o" or "anthropic:claude-3-5-sonnet"
        #[arg(short, long)]
        model: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write the default configuration
    Init,

    /// Show configuration and provider status
    Status,

    /// List saved transcripts, newest first
    Transcripts {
        /// Only show transcripts for this prompt version
        #[arg(short = 'p', long)]
        prompt_version: Option<String>,

        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        #[arg(short, long, default_value_t = 0)]
        offset: u64,

        /// Print the raw JSON page instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, logs } => {
            init_logging(logs, "info");
            let mut config = load_config(None);
            if let Some(port) = port {
                config.server.port = port;
            }
            serve::run(config).await
        }
        Commands::Chat { model, logs } => {
            init_logging(logs, "warn");
            let mut config = load_config(None);
            if let Some(model) = model {
                config.model = model;
            }
            let (gateway, store) = build_services(&config)?;
            repl::run(&config, gateway, store).await
        }
        Commands::Init => init::run(),
        Commands::Status => status::run(),
        Commands::Transcripts {
            prompt_version,
            limit,
            offset,
            json,
        } => {
            init_logging(false, "warn");
            transcripts_cmd::run(prompt_version, limit, offset, json).await
        }
    }
}

/// Build the gateway and the store from the loaded configuration.
pub fn build_services(config: &Config) -> Result<(CompletionGateway, TranscriptStore)> {
    let gateway = CompletionGateway::from_config(config);
    let store = TranscriptStore::new(&config.store)
        .with_context(|| format!("invalid database URL: {}", config.store.database_url))?;
    Ok((gateway, store))
}

/// Initialize tracing/logging.
///
/// `RUST_LOG` wins when set. `PARLEY_LOG_JSON=1` switches to JSON lines.
fn init_logging(verbose: bool, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("parley=debug,tower_http=debug,info")
        } else {
            EnvFilter::new(default_level)
        }
    });

    let json = std::env::var("PARLEY_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }
}
