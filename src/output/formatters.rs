//! Reusable formatting for nutrition values, times and sizes

use chrono::{DateTime, Local, Utc};
use colored::Colorize;

/// `1234.4` -> `1234 kcal`
pub fn format_kcal(calories: f64) -> String {
    format!("{:.0} kcal", calories)
}

/// `12.34` -> `12.3 g`
pub fn format_grams(grams: f64) -> String {
    format!("{:.1} g", grams)
}

/// Whole-number percentage
pub fn format_percent(percent: f64) -> String {
    format!("{:.0}%", percent)
}

/// Local wall-clock time of a UTC timestamp, e.g. `08:15`
pub fn format_local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

/// Format bytes as a human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Text bar for a percentage of goal: `[#######-------]`.
/// Values beyond 100% fill the bar.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// [`progress_bar`] colored by how close the value is to its goal
pub fn colored_progress_bar(percent: f64, width: usize) -> String {
    let bar = progress_bar(percent, width);
    if percent > 110.0 {
        bar.red().to_string()
    } else if percent >= 90.0 {
        bar.green().to_string()
    } else {
        bar.cyan().to_string()
    }
}

/// Truncate a string to `max_chars` characters with an ellipsis
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
