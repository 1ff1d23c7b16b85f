//! Common helper functions for output formatting.

use changespec_query::RecordSignals;
use owo_colors::OwoColorize;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a record status for display, colored by its base status.
///
/// The label is padded to `width` before coloring so escape codes do not
/// count towards the column width.
pub fn format_status(status: &str, base_status: &str, width: usize, use_colors: bool) -> String {
    let label = format!("{:<width$}", truncate_str(status, width));
    if !use_colors {
        return label;
    }

    match base_status.to_ascii_uppercase().as_str() {
        "DRAFTED" => label.yellow().to_string(),
        "MAILED" => label.blue().to_string(),
        "SUBMITTED" => label.green().to_string(),
        "REVERTED" => label.dimmed().to_string(),
        "WIP" => label.cyan().to_string(),
        _ => label,
    }
}

/// Formats the derived signals as the markers used in queries (`!`, `@`, `$`).
pub fn format_signals(signals: &RecordSignals) -> String {
    let mut markers = String::new();
    if signals.error_suffix {
        markers.push('!');
    }
    if signals.running_agent {
        markers.push('@');
    }
    if signals.running_process {
        markers.push('$');
    }
    markers
}
