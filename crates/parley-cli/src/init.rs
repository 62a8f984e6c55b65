//! `parley init` — write the default configuration.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use parley_core::config::{get_config_path, save_config, Config};
use parley_core::utils::get_data_path;

/// Run the init command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "💬 Parley — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = get_data_path().join("history");
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;

    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Set a provider credential, e.g. {}", "export OPENAI_API_KEY=...".cyan());
    println!(
        "     or pick another backend with {}",
        "LLM_MODEL=anthropic:claude-3-5-sonnet-latest".cyan()
    );
    println!("  2. Edit the phases in {}", config_path.display());
    println!("  3. Run {} or {}", "parley chat".cyan(), "parley serve".cyan());
    println!();

    Ok(())
}

/// Write a default config to `path` unless one exists. Returns whether it wrote.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
