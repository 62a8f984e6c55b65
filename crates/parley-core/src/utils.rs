//! Utility helpers — path resolution, timestamp formatting, string manipulation.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};

/// Get the Parley data directory (e.g. `~/.parley/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".parley")
}

/// Get the REPL history file (e.g. `~/.parley/history/chat_history`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history").join("chat_history")
}

/// Format a timestamp as fixed-width RFC 3339 (microseconds, `Z` suffix).
///
/// Fixed width keeps lexical order equal to chronological order, which the
/// transcript store relies on for `ORDER BY created_at`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 timestamp (any offset) into UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_string("こんにちは世界です", 5), "こん...");
    }

    #[test]
    fn test_format_timestamp_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 2, 16, 9, 5, 0).unwrap();
        let b = a + chrono::Duration::microseconds(1_500);
        assert_eq!(format_timestamp(&a), "2024-02-16T09:05:00.000000Z");
        assert_eq!(format_timestamp(&b), "2024-02-16T09:05:00.001500Z");
        assert!(format_timestamp(&a) < format_timestamp(&b));
    }

    #[test]
    fn test_parse_timestamp_offsets() {
        let utc = parse_timestamp("2024-02-16T10:00:00.000Z").unwrap();
        let shifted = parse_timestamp("2024-02-16T12:00:00+02:00").unwrap();
        assert_eq!(utc, shifted);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_expand_home_absolute() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_history_path_under_data_dir() {
        let path = get_history_path();
        assert!(path.to_string_lossy().contains(".parley"));
        assert!(path.ends_with("chat_history"));
    }
}
