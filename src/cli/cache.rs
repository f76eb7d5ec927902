//! Cache management commands

use chrono::{DateTime, Local, Utc};
use colored::Colorize;

use crate::cache::{CacheStats, CacheStorage};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::formatters::format_size;
use crate::output::json::format_json;

fn cache_location() -> String {
    CacheStorage::cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn format_entry_time(ms: Option<i64>) -> Option<String> {
    let ms = ms?;
    Some(
        DateTime::from_timestamp_millis(ms)
            .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    )
}

/// Show cache status/statistics
pub fn status(format: OutputFormat) -> Result<()> {
    let cache = CacheStorage::open()?;
    let stats = cache.stats(Utc::now().timestamp_millis())?;
    println!("{}", render_status(&stats, &cache_location(), format)?);
    Ok(())
}

fn render_status(stats: &CacheStats, location: &str, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let json = serde_json::json!({
            "path": location,
            "total_entries": stats.total_entries,
            "valid_entries": stats.valid_entries,
            "expired_entries": stats.expired_entries,
            "total_size_bytes": stats.total_size_bytes,
            "total_size_human": format_size(stats.total_size_bytes),
            "oldest_entry_ms": stats.oldest_entry_ms,
            "newest_entry_ms": stats.newest_entry_ms,
        });
        return Ok(format_json(&json)?);
    }

    let mut lines = vec![
        "Cache Status".bold().to_string(),
        "────────────────────────────────────────".to_string(),
        format!("Location:       {}", location),
        format!("Valid entries:  {}", stats.valid_entries),
        format!("Expired:        {}", stats.expired_entries),
        format!("Total size:     {}", format_size(stats.total_size_bytes)),
    ];
    if let Some(oldest) = format_entry_time(stats.oldest_entry_ms) {
        lines.push(format!("Oldest entry:   {}", oldest));
    }
    if let Some(newest) = format_entry_time(stats.newest_entry_ms) {
        lines.push(format!("Newest entry:   {}", newest));
    }
    Ok(lines.join("\n"))
}

/// Clear all cache entries
pub fn clear(format: OutputFormat) -> Result<()> {
    let cache = CacheStorage::open()?;
    let stats = cache.clear_all()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "entries_removed": stats.entries_removed,
                "success": true,
            });
            println!("{}", format_json(&json)?);
        }
        _ => {
            if stats.entries_removed > 0 {
                println!("{} Cleared {} cache entries", "✓".green(), stats.entries_removed);
            } else {
                println!("Cache was already empty");
            }
        }
    }

    Ok(())
}

/// Remove only expired entries
pub fn purge(format: OutputFormat) -> Result<()> {
    let cache = CacheStorage::open()?;
    let removed = cache.purge_expired(Utc::now().timestamp_millis())?;

    match format {
        OutputFormat::Json => {
            println!("{}", format_json(&serde_json::json!({ "entries_removed": removed }))?);
        }
        _ => println!("Removed {} expired cache entries", removed),
    }
    Ok(())
}

/// Show cache path
pub fn path() -> Result<()> {
    let path = CacheStorage::cache_dir()?;
    println!("{}", path.display());
    Ok(())
}
