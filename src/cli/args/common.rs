//! Common CLI types shared across commands

use chrono::{Local, NaiveDate};
use clap::Args;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting (default)
    #[default]
    Pretty,
    /// Table format - one row per entry
    Table,
    /// JSON format - structured for scripts
    Json,
}

impl OutputFormat {
    /// Parse a format name as written in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Macro values for `add` and `set` commands, in grams
#[derive(Debug, Clone, Default, Args)]
pub struct MacroArgs {
    /// Protein in grams
    #[arg(long)]
    pub proteins: Option<f64>,

    /// Carbohydrates in grams
    #[arg(long)]
    pub carbs: Option<f64>,

    /// Fat in grams
    #[arg(long)]
    pub fats: Option<f64>,
}

/// Today's local date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s))
}
