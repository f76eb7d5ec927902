//! Status command implementation

use chrono::Utc;
use colored::Colorize;

use crate::cache::CacheStorage;
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "NutriLog Configuration Status".bold());

    match Config::load_at(opts.config_ref()) {
        Ok(config) => {
            let config_path = Config::resolve_path(opts.config_ref())?;
            println!("Config file: {}", config_path.display().to_string().cyan());
            println!();

            for line in report(&config) {
                println!("{}", line);
            }

            println!();
            match CacheStorage::open().and_then(|c| c.stats(Utc::now().timestamp_millis())) {
                Ok(stats) => println!(
                    "{} Cache: {} valid, {} expired",
                    "○".dimmed(),
                    stats.valid_entries,
                    stats.expired_entries
                ),
                Err(e) => println!("{} Cache unavailable: {}", "⚠".yellow(), e),
            }
            println!();
        }
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "nutrilog init".cyan()
            );
            println!();
        }
    }

    Ok(())
}

/// One line per configuration check
fn report(config: &Config) -> Vec<String> {
    let mut lines = Vec::new();

    match (&config.supabase_url, &config.supabase_key) {
        (Some(url), Some(_)) => {
            lines.push(format!("{} Supabase project: {}", "✓".green(), url.cyan()))
        }
        _ => {
            lines.push(format!("{} Supabase not configured", "✗".red()));
            lines.push("  → Run 'nutrilog init' to configure".to_string());
        }
    }

    match &config.user_id {
        Some(id) => lines.push(format!("{} User: {}", "✓".green(), id)),
        None => lines.push(format!("{} User ID not set", "✗".red())),
    }

    if config.access_token.is_none() {
        lines.push(format!(
            "{} No session token (requests use the anon key)",
            "○".dimmed()
        ));
    } else if config.is_token_expired() {
        lines.push(format!(
            "{} Session token expired (run 'nutrilog init' to refresh)",
            "⚠".yellow()
        ));
    } else if let Some(expires) = config.token_expires_at() {
        let remaining = expires.signed_duration_since(Utc::now());
        lines.push(format!(
            "{} Session token valid (expires in {}h {}m)",
            "✓".green(),
            remaining.num_hours(),
            remaining.num_minutes() % 60
        ));
    }

    if config.ai.api_key.is_some() {
        lines.push(format!(
            "{} Food analysis: {} via {}",
            "✓".green(),
            config.ai.model,
            config.ai.base_url
        ));
    } else {
        lines.push(format!(
            "{} Food analysis not configured (photo and text logging disabled)",
            "○".dimmed()
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_unconfigured() {
        colored::control::set_override(false);
        let lines = report(&Config::default()).join("\n");
        assert!(lines.contains("✗ Supabase not configured"));
        assert!(lines.contains("✗ User ID not set"));
        assert!(lines.contains("No session token"));
        assert!(lines.contains("Food analysis not configured"));
    }

    #[test]
    fn test_report_configured() {
        colored::control::set_override(false);
        let mut config = Config {
            supabase_url: Some("https://abc.supabase.co".to_string()),
            supabase_key: Some("anon".to_string()),
            user_id: Some("u1".to_string()),
            access_token: Some("not-a-jwt".to_string()),
            ..Default::default()
        };
        config.ai.api_key = Some("sk-test".to_string());

        let lines = report(&config).join("\n");
        assert!(lines.contains("✓ Supabase project: https://abc.supabase.co"));
        assert!(lines.contains("✓ User: u1"));
        assert!(lines.contains("Session token expired"));
        assert!(lines.contains("✓ Food analysis: gpt-4o-mini"));
    }
}
