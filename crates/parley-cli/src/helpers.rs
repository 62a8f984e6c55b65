//! Shared CLI helpers — banners, message printing, status marks.

use colored::Colorize;

use parley_core::utils::truncate_string;

/// Print the banner shown at the start of `parley chat`.
pub fn print_banner(model: &str, provider: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "💬 Parley".cyan().bold(), version.dimmed());
    println!("{}", format!("Model: {model} via {provider}").dimmed());
    println!(
        "{}",
        "Type a reply. \"/next\" finishes the current phase, \"exit\" quits.".dimmed()
    );
    println!();
}

/// Print the header for one onboarding phase.
pub fn print_phase_header(number: usize, total: usize, label: &str, prompt_version: &str) {
    println!(
        "{} {}",
        format!("── Phase {number}/{total}: {label}").bold(),
        format!("({prompt_version})").dimmed()
    );
    println!();
}

/// Print an agent reply.
pub fn print_agent(text: &str) {
    println!();
    println!("{}", "Agent".cyan().bold());
    if text.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{text}");
    }
    println!();
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Green check or dimmed dot.
pub fn mark(ok: bool, yes: &str, no: &str) -> String {
    if ok {
        format!("{} {}", "✓".green(), yes)
    } else {
        format!("{}", format!("· {no}").dimmed())
    }
}

/// Shorten a value for table output.
pub fn cell(value: &str, width: usize) -> String {
    truncate_string(value, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_contains_label() {
        assert!(mark(true, "key set", "not configured").contains("key set"));
        assert!(mark(false, "key set", "not configured").contains("not configured"));
    }

    #[test]
    fn test_cell_truncates_long_values() {
        assert_eq!(cell("02-16-com-supp", 20), "02-16-com-supp");
        assert_eq!(cell("6f1c2a9e-1b7d-4c1e-9a55-0d3f6f1a2b3c", 11), "6f1c2a9e...");
    }
}
