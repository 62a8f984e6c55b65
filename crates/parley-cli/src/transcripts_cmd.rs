//! `parley transcripts` — list saved transcripts from the terminal.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::warn;

use parley_core::config::load_config;
use parley_core::types::{TranscriptFilter, TranscriptPage};
use parley_core::utils::format_timestamp;
use parley_store::TranscriptStore;

use crate::helpers::cell;

/// Run the transcripts command.
pub async fn run(
    prompt_version: Option<String>,
    limit: u32,
    offset: u64,
    json: bool,
) -> Result<()> {
    let config = load_config(None);
    let store = TranscriptStore::new(&config.store)
        .with_context(|| format!("invalid database URL: {}", config.store.database_url))?;

    // A fresh database has no table yet; listing it should show zero rows.
    if let Err(e) = store.ensure_schema().await {
        warn!(error = %e, "Schema provisioning failed");
    }

    let filter = TranscriptFilter {
        prompt_version: prompt_version.filter(|v| !v.is_empty()),
    };
    let page = store
        .query(&filter, limit, offset)
        .await
        .context("failed to fetch transcripts")?;
    store.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_page(&page, filter.prompt_version.as_deref());
    }
    Ok(())
}

fn print_page(page: &TranscriptPage, prompt_version: Option<&str>) {
    println!();
    let scope = prompt_version.map_or_else(|| "all versions".to_string(), |v| v.to_string());
    println!("{} {}", "💬 Transcripts".cyan().bold(), format!("({scope})").dimmed());
    println!();

    if page.transcripts.is_empty() {
        println!("  {}", "No transcripts found.".dimmed());
        println!();
        return;
    }

    println!(
        "  {:<28} {:<14} {:<20} {:>5} {:>5}",
        "Created".bold(),
        "Session".bold(),
        "Prompt version".bold(),
        "Turns".bold(),
        "Msgs".bold()
    );
    for t in &page.transcripts {
        println!(
            "  {:<28} {:<14} {:<20} {:>5} {:>5}",
            format_timestamp(&t.created_at),
            cell(&t.session_id, 14),
            cell(&t.prompt_version, 20),
            t.conversation_history.len(),
            t.messages.len()
        );
    }

    let p = &page.pagination;
    let first = if page.transcripts.is_empty() { 0 } else { p.offset + 1 };
    let last = p.offset + page.transcripts.len() as u64;
    println!();
    println!(
        "  {}",
        format!("Showing {first}-{last} of {}", p.total).dimmed()
    );
    if p.has_more {
        println!(
            "  {}",
            format!("More available: --offset {}", p.offset + u64::from(p.limit)).dimmed()
        );
    }
    println!();
}
