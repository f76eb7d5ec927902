//! Meal command implementations

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;

use crate::analysis::{FoodAnalysis, FoodAnalyzer, image_mime_type};
use crate::cache::Endpoint;
use crate::cli::args::{MacroArgs, today};
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{Meal, MealSource, MealType, NewMeal};
use crate::error::{Error, Result};
use crate::models::{AnalysisDisplay, MealDisplay};
use crate::output::Formattable;
use crate::output::formatters::format_kcal;
use crate::output::json::format_json;
use crate::query::Debouncer;

/// List the meals logged on a day (today by default)
pub async fn list(ctx: &CommandContext, date: Option<NaiveDate>) -> Result<()> {
    let meals = load_meals(ctx, date.unwrap_or_else(today)).await?;
    let rows: Vec<MealDisplay> = meals.iter().map(MealDisplay::from).collect();
    rows.print(ctx.format)
}

/// Cached read of one day's meals
pub(crate) async fn load_meals(ctx: &CommandContext, date: NaiveDate) -> Result<Vec<Meal>> {
    let store = ctx.store.clone();
    let user = ctx.user_id().to_string();
    let day = date.to_string();

    let query = ctx.query(Endpoint::LIST_MEALS, &[("date", day.as_str())], move |_| {
        let store = store.clone();
        let user = user.clone();
        async move { store.list_meals(&user, date).await }
    });
    ctx.read(&query, "Loading meals...").await
}

/// Log a meal with known values
pub async fn add(
    ctx: &CommandContext,
    name: &str,
    calories: f64,
    macros: &MacroArgs,
    meal_type: Option<MealType>,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Other("Meal name cannot be empty".to_string()));
    }
    check_amounts(calories, macros)?;

    let meal = NewMeal {
        user_id: ctx.user_id().to_string(),
        name: name.to_string(),
        calories,
        proteins: macros.proteins.unwrap_or(0.0),
        carbs: macros.carbs.unwrap_or(0.0),
        fats: macros.fats.unwrap_or(0.0),
        meal_type: meal_type.unwrap_or_else(MealType::now),
        source: MealSource::Manual,
        image_url: None,
    };

    let created = log_meal(ctx, meal).await?;
    print_logged(ctx.format, &created)
}

pub(crate) fn check_amounts(calories: f64, macros: &MacroArgs) -> Result<()> {
    let values = [Some(calories), macros.proteins, macros.carbs, macros.fats];
    if values.iter().flatten().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(Error::Other(
            "Calories and macros must be zero or positive numbers".to_string(),
        ));
    }
    Ok(())
}

/// Analyze a description (typed or transcribed) and log the result
pub async fn text(
    ctx: &CommandContext,
    description: &[String],
    meal_type: Option<MealType>,
    dry_run: bool,
    voice: bool,
) -> Result<()> {
    let description = description.join(" ");
    let description = description.trim();
    if description.is_empty() {
        return Err(Error::Other("Describe what you ate".to_string()));
    }

    let analyzer = ctx.analyzer()?;
    let spinner = ctx.animation.spinner("Analyzing description...");
    let analysis = analyzer.analyze_text_or_fallback(description).await;
    spinner.finish_and_clear();

    let source = if voice { MealSource::Voice } else { MealSource::Text };
    record_analysis(ctx, analysis, meal_type, source, dry_run).await
}

/// Analyze a food photo and log the result
pub async fn photo(
    ctx: &CommandContext,
    path: &Path,
    meal_type: Option<MealType>,
    dry_run: bool,
) -> Result<()> {
    let mime_type = image_mime_type(path).ok_or_else(|| {
        Error::Other(format!(
            "Unsupported image type: {} (use jpg, png, webp, gif or heic)",
            path.display()
        ))
    })?;
    let image = tokio::fs::read(path).await?;
    debug!("Read {} bytes of {} from {}", image.len(), mime_type, path.display());

    let analyzer = ctx.analyzer()?;
    let spinner = ctx.animation.spinner("Analyzing photo...");
    let analysis = analyzer.analyze_image_or_fallback(&image, mime_type).await;
    spinner.finish_and_clear();

    record_analysis(ctx, analysis, meal_type, MealSource::Photo, dry_run).await
}

async fn record_analysis(
    ctx: &CommandContext,
    analysis: FoodAnalysis,
    meal_type: Option<MealType>,
    source: MealSource,
    dry_run: bool,
) -> Result<()> {
    if analysis.is_placeholder() {
        return Err(Error::Other(
            "Could not recognize any food, nothing was logged. Use `nutrilog meal add` to enter it manually."
                .to_string(),
        ));
    }

    let meal = analysis.to_new_meal(
        ctx.user_id(),
        meal_type.unwrap_or_else(MealType::now),
        source,
        None,
    );

    if dry_run {
        return AnalysisDisplay(analysis).print(ctx.format);
    }

    if ctx.format != OutputFormat::Json {
        AnalysisDisplay(analysis).print(ctx.format)?;
        println!();
    }

    let created = log_meal(ctx, meal).await?;
    print_logged(ctx.format, &created)
}

/// Insert a meal and drop cached meal lists.
pub(crate) async fn log_meal(ctx: &CommandContext, meal: NewMeal) -> Result<Meal> {
    let store = ctx.store.clone();
    let mutation = ctx.mutation(&[Endpoint::LIST_MEALS], move |meal: NewMeal| {
        let store = store.clone();
        async move { store.create_meal(&meal).await }
    });

    let spinner = ctx.animation.spinner("Saving meal...");
    let result = mutation.run(meal).await;
    spinner.finish_and_clear();
    result
}

pub(crate) fn print_logged(format: OutputFormat, meal: &Meal) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", format_json(&MealDisplay::from(meal))?);
        }
        _ => {
            println!(
                "{} Logged {} ({}) as {}",
                "✓".green(),
                meal.name.bold(),
                format_kcal(meal.calories),
                meal.meal_type
            );
        }
    }
    Ok(())
}

/// Running estimate while a meal is described line by line on stdin
pub async fn estimate(ctx: &CommandContext, wait: Duration) -> Result<()> {
    let analyzer: Arc<dyn FoodAnalyzer> = Arc::new(ctx.analyzer()?);

    if ctx.format != OutputFormat::Json {
        eprintln!(
            "{}",
            "Describe your meal, one item per line. Press Ctrl-D when done.".dimmed()
        );
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    match estimate_lines(analyzer, stdin, wait).await? {
        Some(analysis) => AnalysisDisplay(analysis).print(ctx.format),
        None => {
            println!("Nothing to estimate.");
            Ok(())
        }
    }
}

/// Feed each input line into a debounced analysis of everything typed so
/// far. Intermediate estimates go to stderr; the final one is returned.
pub(crate) async fn estimate_lines<R>(
    analyzer: Arc<dyn FoodAnalyzer>,
    input: R,
    wait: Duration,
) -> Result<Option<FoodAnalysis>>
where
    R: AsyncBufRead + Unpin,
{
    let latest: Arc<Mutex<Option<(String, FoodAnalysis)>>> = Arc::new(Mutex::new(None));

    let debouncer = {
        let analyzer = analyzer.clone();
        let latest = latest.clone();
        Debouncer::new(wait, move |description: String| {
            let analyzer = analyzer.clone();
            let latest = latest.clone();
            async move {
                let analysis = analyzer.analyze_text_or_fallback(&description).await;
                eprintln!(
                    "  ≈ {} so far ({})",
                    format_kcal(analysis.total_calories),
                    analysis.meal_name()
                );
                *latest.lock().await = Some((description, analysis));
            }
        })
    };

    let mut description = String::new();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !description.is_empty() {
            description.push_str(", ");
        }
        description.push_str(line);
        debouncer.call(description.clone());
    }
    if debouncer.is_pending() {
        debug!("Input closed, running final estimate now");
    }
    debouncer.cancel();

    if description.is_empty() {
        return Ok(None);
    }

    let previous = latest.lock().await.take();
    match previous {
        Some((analyzed, analysis)) if analyzed == description => Ok(Some(analysis)),
        _ => Ok(Some(analyzer.analyze_text_or_fallback(&description).await)),
    }
}

/// Delete a logged meal
pub async fn delete(ctx: &CommandContext, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete meal '{}'?", id))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let store = ctx.store.clone();
    let mutation = ctx.mutation(&[Endpoint::LIST_MEALS], move |id: String| {
        let store = store.clone();
        async move { store.delete_meal(&id).await }
    });
    mutation.run(id.to_string()).await?;

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", format_json(&serde_json::json!({ "id": id, "deleted": true }))?);
        }
        _ => println!("{} Deleted meal: {}", "✓".green(), id),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FoodItem;
    use crate::cli::context::test_support::context;
    use crate::client::{MockStore, NutritionStore};
    use async_trait::async_trait;

    /// Analyzer that counts calls and echoes the description as the food name
    #[derive(Default)]
    struct EchoAnalyzer {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FoodAnalyzer for EchoAnalyzer {
        async fn analyze_text(&self, description: &str) -> Result<FoodAnalysis> {
            self.seen.lock().await.push(description.to_string());
            Ok(FoodAnalysis {
                foods: vec![FoodItem {
                    name: description.to_string(),
                    calories: 100.0,
                    proteins: 1.0,
                    carbs: 2.0,
                    fats: 3.0,
                }],
                total_calories: 100.0,
                total_proteins: 1.0,
                total_carbs: 2.0,
                total_fats: 3.0,
                confidence: 80,
            })
        }

        async fn analyze_image(&self, _image: &[u8], _mime_type: &str) -> Result<FoodAnalysis> {
            Err(Error::Other("not used".to_string()))
        }
    }

    #[tokio::test]
    async fn test_add_logs_manual_meal_and_invalidates_list() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);
        let date = today();

        assert!(load_meals(&ctx, date).await.unwrap().is_empty());

        let macros = MacroArgs {
            proteins: Some(20.0),
            ..Default::default()
        };
        add(&ctx, "Omelette", 320.0, &macros, Some(MealType::Breakfast))
            .await
            .unwrap();

        let meals = load_meals(&ctx, date).await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "Omelette");
        assert_eq!(meals[0].source, MealSource::Manual);
        assert_eq!(meals[0].proteins, 20.0);
        assert_eq!(store.calls().await.list_meals, 2);
    }

    #[tokio::test]
    async fn test_add_rejects_negative_values() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);

        let err = add(&ctx, "Toast", -5.0, &MacroArgs::default(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("zero or positive"));
        assert_eq!(store.calls().await.create_meal, 0);
    }

    #[tokio::test]
    async fn test_placeholder_analysis_is_not_logged() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);

        let result = record_analysis(
            &ctx,
            FoodAnalysis::placeholder(),
            None,
            MealSource::Text,
            false,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(store.calls().await.create_meal, 0);
    }

    #[tokio::test]
    async fn test_recognized_analysis_is_logged_with_source() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);

        let analysis = EchoAnalyzer::default().analyze_text("2 eggs").await.unwrap();
        record_analysis(&ctx, analysis, Some(MealType::Lunch), MealSource::Voice, false)
            .await
            .unwrap();

        let meals = store.meals().await;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "2 eggs");
        assert_eq!(meals[0].source, MealSource::Voice);
        assert_eq!(meals[0].meal_type, MealType::Lunch);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_write() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);

        let analysis = EchoAnalyzer::default().analyze_text("apple").await.unwrap();
        record_analysis(&ctx, analysis, None, MealSource::Text, true)
            .await
            .unwrap();
        assert_eq!(store.calls().await.create_meal, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_meal_fails() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);

        let err = delete(&ctx, "nope", true).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_estimate_burst_analyzes_full_description_once() {
        let analyzer = Arc::new(EchoAnalyzer::default());
        let input: &[u8] = b"2 eggs\n\ntoast with butter\ncoffee\n";

        let analysis = estimate_lines(analyzer.clone(), input, Duration::from_secs(10))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(analysis.meal_name(), "2 eggs, toast with butter, coffee");
        assert_eq!(
            *analyzer.seen.lock().await,
            vec!["2 eggs, toast with butter, coffee".to_string()]
        );
    }

    #[tokio::test]
    async fn test_estimate_empty_input() {
        let analyzer = Arc::new(EchoAnalyzer::default());
        let input: &[u8] = b"\n  \n";
        let result = estimate_lines(analyzer.clone(), input, Duration::from_millis(10))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(analyzer.seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_filters_by_day() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);
        add(&ctx, "Soup", 150.0, &MacroArgs::default(), None)
            .await
            .unwrap();

        let yesterday = today().pred_opt().unwrap();
        assert!(store.list_meals("u1", yesterday).await.unwrap().is_empty());
    }
}
