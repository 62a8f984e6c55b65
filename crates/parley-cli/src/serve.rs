//! `parley serve` — run the HTTP API until Ctrl-C or SIGTERM.
//!
//! Startup sequence:
//! 1. Build the completion gateway and the transcript store from config
//! 2. Provision the transcript schema (non-fatal)
//! 3. Bind and serve the axum router with graceful shutdown
//! 4. Close the store's pool

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use parley_core::config::Config;
use parley_providers::resolve;

use crate::api::{self, AppState};

/// Run the HTTP server.
pub async fn run(config: Config) -> Result<()> {
    let (gateway, store) = crate::build_services(&config)?;

    if let Err(e) = store.ensure_schema().await {
        warn!(error = %e, "Schema provisioning failed; inserts will retry it");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.model,
        provider = %resolve(&config.model),
        admin = config.admin.secret().is_some(),
        "parley starting"
    );

    let state = Arc::new(AppState::new(gateway, store.clone(), config.admin.clone()));
    let app = api::build(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    store.close().await;
    info!("parley stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
