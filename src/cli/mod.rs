//! CLI command definitions and handlers

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod cache;
pub mod completions;
pub mod context;
pub mod goals;
pub mod init;
pub mod meal;
pub mod profile;
pub mod progress;
pub mod quick;
pub mod status;

pub use args::{GlobalOptions, MacroArgs, OutputFormat, parse_date};
pub use context::CommandContext;

use crate::client::MealType;

/// NutriLog - log meals from photos, text or saved foods and track daily macros
#[derive(Parser, Debug)]
#[command(name = "nutrilog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "NUTRILOG_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "NUTRILOG_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "NUTRILOG_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the local cache, fetch fresh data
    #[arg(long, global = true, env = "NUTRILOG_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize NutriLog configuration
    Init,

    /// Show configuration status
    Status,

    /// Display version information
    Version,

    /// Log, list and delete meals
    #[command(subcommand)]
    Meal(MealCommands),

    /// Saved foods for one-step logging
    #[command(subcommand)]
    Quick(QuickCommands),

    /// Daily calorie and macro goals
    #[command(subcommand)]
    Goals(GoalsCommands),

    /// Show a day's intake against your goals
    Progress {
        /// Day to show (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// View and edit your profile
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Manage the local cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Meal subcommands
#[derive(Subcommand, Debug)]
pub enum MealCommands {
    /// List meals logged on a day
    #[command(visible_alias = "ls")]
    List {
        /// Day to list (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Log a meal with known values
    Add {
        /// Meal name
        #[arg(long)]
        name: String,

        /// Energy in kcal
        #[arg(long)]
        calories: f64,

        #[command(flatten)]
        macros: MacroArgs,

        /// Meal type (default from the time of day)
        #[arg(long = "type", value_enum)]
        meal_type: Option<MealType>,
    },

    /// Describe a meal in words and log the estimate
    Text {
        /// What you ate, e.g. "two eggs and a slice of toast"
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,

        /// Meal type (default from the time of day)
        #[arg(long = "type", value_enum)]
        meal_type: Option<MealType>,

        /// Show the estimate without logging it
        #[arg(long)]
        dry_run: bool,

        /// The description is a transcribed voice note
        #[arg(long)]
        voice: bool,
    },

    /// Analyze a food photo and log the estimate
    Photo {
        /// Image file (jpg, png, webp, gif, heic)
        path: PathBuf,

        /// Meal type (default from the time of day)
        #[arg(long = "type", value_enum)]
        meal_type: Option<MealType>,

        /// Show the estimate without logging it
        #[arg(long)]
        dry_run: bool,
    },

    /// Live estimate while typing a meal on stdin, one item per line
    Estimate {
        /// Quiet period before re-estimating, in milliseconds
        #[arg(long, default_value_t = 800)]
        wait_ms: u64,
    },

    /// Delete a logged meal
    #[command(visible_alias = "rm")]
    Delete {
        /// Meal ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Quick food subcommands
#[derive(Subcommand, Debug)]
pub enum QuickCommands {
    /// List saved quick foods
    #[command(visible_alias = "ls")]
    List,

    /// Save a food for one-step logging
    Add {
        /// Food name
        #[arg(long)]
        name: String,

        /// Energy in kcal
        #[arg(long)]
        calories: f64,

        #[command(flatten)]
        macros: MacroArgs,
    },

    /// Log a saved food as a meal now
    Log {
        /// Quick food ID or name
        food: String,

        /// Meal type (default from the time of day)
        #[arg(long = "type", value_enum)]
        meal_type: Option<MealType>,
    },

    /// Delete a saved food
    #[command(visible_alias = "rm")]
    Delete {
        /// Quick food ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Goals subcommands
#[derive(Subcommand, Debug)]
pub enum GoalsCommands {
    /// Show your daily goals
    Get,

    /// Change one or more daily goals
    Set {
        /// Daily energy goal in kcal
        #[arg(long)]
        calories: Option<f64>,

        #[command(flatten)]
        macros: MacroArgs,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show your profile
    Show,

    /// Update profile fields
    Set {
        /// Full name
        #[arg(long)]
        name: Option<String>,

        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        gender: Option<String>,

        /// Activity level, e.g. sedentary, light, moderate, active
        #[arg(long)]
        activity: Option<String>,
    },
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Clear all cached data
    Clear,

    /// Remove expired entries only
    Purge,

    /// Show cache directory path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_meal_add() {
        let cli = Cli::try_parse_from([
            "nutrilog", "meal", "add", "--name", "Toast", "--calories", "80", "--carbs", "15",
            "--type", "breakfast",
        ])
        .unwrap();

        match cli.command {
            Commands::Meal(MealCommands::Add {
                name,
                calories,
                macros,
                meal_type,
            }) => {
                assert_eq!(name, "Toast");
                assert_eq!(calories, 80.0);
                assert_eq!(macros.carbs, Some(15.0));
                assert_eq!(macros.proteins, None);
                assert_eq!(meal_type, Some(MealType::Breakfast));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nutrilog", "progress", "--date", "2024-05-01", "--format", "json", "--no-cache",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.no_cache);
        match cli.command {
            Commands::Progress { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["nutrilog", "meal", "list", "--date", "yesterday"]).is_err());
    }

    #[test]
    fn test_meal_text_joins_words() {
        let cli = Cli::try_parse_from(["nutrilog", "meal", "text", "two", "eggs", "--dry-run"])
            .unwrap();
        match cli.command {
            Commands::Meal(MealCommands::Text {
                description,
                dry_run,
                ..
            }) => {
                assert_eq!(description, vec!["two", "eggs"]);
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
