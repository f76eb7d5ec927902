//! NutriLog CLI - log meals and track daily nutrition goals

use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

mod analysis;
mod cache;
mod cli;
mod client;
mod config;
mod device;
mod error;
mod models;
mod output;
mod progress;
mod query;

use cli::{
    CacheCommands, Cli, CommandContext, Commands, GlobalOptions, GoalsCommands, MealCommands,
    ProfileCommands, QuickCommands,
};
use device::DeviceProfile;
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `--debug` forces debug level for this crate; otherwise `RUST_LOG`
/// applies, defaulting to warnings only.
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_module("nutrilog", LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);
    let device = DeviceProfile::detect();
    if !device.color {
        colored::control::set_override(false);
    }
    log::debug!("Device profile: {:?}", device);

    // Commands that don't need the store
    match &cli.command {
        Commands::Init => return cli::init::run(&opts),
        Commands::Status => return cli::status::run(&opts),
        Commands::Version => {
            println!("nutrilog version {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Completion { shell } => {
            cli::completions::run(*shell);
            return Ok(());
        }
        Commands::Cache(cmd) => {
            let format = opts.format.unwrap_or_default();
            return match cmd {
                CacheCommands::Status => cli::cache::status(format),
                CacheCommands::Clear => cli::cache::clear(format),
                CacheCommands::Purge => cli::cache::purge(format),
                CacheCommands::Path => cli::cache::path(),
            };
        }
        _ => {}
    }

    let ctx = CommandContext::new(&opts, &device)?;

    match cli.command {
        Commands::Meal(cmd) => match cmd {
            MealCommands::List { date } => cli::meal::list(&ctx, date).await,
            MealCommands::Add {
                name,
                calories,
                macros,
                meal_type,
            } => cli::meal::add(&ctx, &name, calories, &macros, meal_type).await,
            MealCommands::Text {
                description,
                meal_type,
                dry_run,
                voice,
            } => cli::meal::text(&ctx, &description, meal_type, dry_run, voice).await,
            MealCommands::Photo {
                path,
                meal_type,
                dry_run,
            } => cli::meal::photo(&ctx, &path, meal_type, dry_run).await,
            MealCommands::Estimate { wait_ms } => {
                cli::meal::estimate(&ctx, Duration::from_millis(wait_ms)).await
            }
            MealCommands::Delete { id, yes } => cli::meal::delete(&ctx, &id, yes).await,
        },
        Commands::Quick(cmd) => match cmd {
            QuickCommands::List => cli::quick::list(&ctx).await,
            QuickCommands::Add {
                name,
                calories,
                macros,
            } => cli::quick::add(&ctx, &name, calories, &macros).await,
            QuickCommands::Log { food, meal_type } => {
                cli::quick::log(&ctx, &food, meal_type).await
            }
            QuickCommands::Delete { id, yes } => cli::quick::delete(&ctx, &id, yes).await,
        },
        Commands::Goals(cmd) => match cmd {
            GoalsCommands::Get => cli::goals::get(&ctx).await,
            GoalsCommands::Set { calories, macros } => {
                let update = cli::goals::GoalUpdate {
                    calories,
                    proteins: macros.proteins,
                    carbs: macros.carbs,
                    fats: macros.fats,
                };
                cli::goals::set(&ctx, &update).await
            }
        },
        Commands::Progress { date } => cli::progress::show(&ctx, date).await,
        Commands::Profile(cmd) => match cmd {
            ProfileCommands::Show => cli::profile::show(&ctx).await,
            ProfileCommands::Set {
                name,
                weight,
                height,
                age,
                gender,
                activity,
            } => {
                let update = cli::profile::ProfileUpdate {
                    full_name: name,
                    weight_kg: weight,
                    height_cm: height,
                    age,
                    gender,
                    activity_level: activity,
                };
                cli::profile::set(&ctx, &update).await
            }
        },
        Commands::Init
        | Commands::Status
        | Commands::Version
        | Commands::Completion { .. }
        | Commands::Cache(_) => Ok(()),
    }
}
