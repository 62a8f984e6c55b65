//! `parley status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use parley_core::config::{get_config_path, load_config};
use parley_providers::{resolve, ProviderKind, PROVIDERS};

use crate::helpers::mark;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "💬 Parley Status".cyan().bold());
    println!();

    let config_exists = config_path.exists();
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    let target = resolve(&config.model);
    println!("  {:<18} {}", "Model:".bold(), config.model);
    println!("  {:<18} {}", "Routes to:".bold(), target);
    println!(
        "  {:<18} {}",
        "Parameters:".bold(),
        format!("max_tokens: {}", config.max_tokens).dimmed()
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let configured = spec.kind.is_configured(&config.providers);
        let active = spec.kind == target.kind();
        println!(
            "    {:<20} {}{}",
            spec.display_name,
            mark(configured, "key set", "not configured"),
            if active { " ← active".cyan().to_string() } else { String::new() }
        );
    }
    if target.kind() == ProviderKind::AzureOpenAi {
        println!(
            "    {:<20} {}",
            "",
            format!("api-version {}", config.providers.azure_openai.api_version).dimmed()
        );
    }

    println!();
    println!("  {:<18} {}", "Database:".bold(), config.store.database_url);
    println!(
        "  {:<18} {}",
        "Admin password:".bold(),
        mark(config.admin.secret().is_some(), "set", "not configured")
    );
    println!(
        "  {:<18} {}:{}",
        "Server:".bold(),
        config.server.host,
        config.server.port
    );

    println!();
    println!("  {}", "Phases:".bold());
    for (i, phase) in config.phases.iter().enumerate() {
        println!(
            "    {}. {:<24} {}",
            i + 1,
            phase.label,
            format!("{} [{}]", phase.prompt_version, phase.key).dimmed()
        );
    }
    println!();

    Ok(())
}
