//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;

/// Global CLI options passed to command handlers.
///
/// Precedence: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; [`GlobalOptions::resolve_format`]
/// folds in the config file.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format from `--format` / `NUTRILOG_FORMAT`
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.nutrilog/config.yaml)
    pub config: Option<String>,

    /// Bypass the local cache and fetch fresh data
    pub no_cache: bool,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            no_cache: cli.no_cache,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// The effective output format given the loaded config.
    pub fn resolve_format(&self, config: &Config) -> OutputFormat {
        self.format
            .or_else(|| {
                config
                    .preferences
                    .format
                    .as_deref()
                    .and_then(OutputFormat::from_name)
            })
            .unwrap_or_default()
    }
}
