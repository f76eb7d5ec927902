//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Run the init command.
///
/// Existing values are offered as defaults, so re-running init only changes
/// what the user edits.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();

    println!("{}", "Welcome to NutriLog!".bold().green());
    println!("Let's connect to your Supabase project.\n");

    let mut url_prompt = Input::<String>::with_theme(&theme).with_prompt("Supabase project URL");
    if let Some(url) = &config.supabase_url {
        url_prompt = url_prompt.default(url.clone());
    }
    let url = normalize_url(&url_prompt.interact_text()?)?;

    let key_prompt = if config.supabase_key.is_some() {
        "Supabase anon key (leave empty to keep current)"
    } else {
        "Supabase anon key"
    };
    let key: String = Password::with_theme(&theme)
        .with_prompt(key_prompt)
        .allow_empty_password(config.supabase_key.is_some())
        .interact()?;
    if !key.is_empty() {
        config.supabase_key = Some(key);
    }

    let mut user_prompt = Input::<String>::with_theme(&theme).with_prompt("Your user ID");
    if let Some(id) = &config.user_id {
        user_prompt = user_prompt.default(id.clone());
    }
    let user_id = user_prompt.interact_text()?;

    let token: String = Password::with_theme(&theme)
        .with_prompt("Session access token (optional)")
        .allow_empty_password(true)
        .interact()?;
    if !token.is_empty() {
        config.access_token = Some(token);
    }

    let configure_ai = Confirm::with_theme(&theme)
        .with_prompt("Configure food analysis (photo and text logging)?")
        .default(config.ai.api_key.is_none())
        .interact()?;
    if configure_ai {
        let ai_key: String = Password::with_theme(&theme)
            .with_prompt("AI API key")
            .interact()?;
        config.ai.api_key = Some(ai_key);
    }

    config.supabase_url = Some(url);
    config.user_id = Some(user_id.trim().to_string());
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "nutrilog status".cyan());
    println!("  {} - See today's progress", "nutrilog progress".cyan());

    Ok(())
}

/// Trim a project URL and require an http(s) scheme
fn normalize_url(input: &str) -> Result<String> {
    let url = input.trim().trim_end_matches('/');
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ConfigError::Invalid(format!(
            "Supabase URL must start with https:// (got '{}')",
            url
        ))
        .into());
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url(" https://abc.supabase.co/ ").unwrap(),
            "https://abc.supabase.co"
        );
        assert!(normalize_url("abc.supabase.co").is_err());
    }
}
