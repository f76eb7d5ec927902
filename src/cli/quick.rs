//! Quick food command implementations

use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use log::debug;

use crate::cache::Endpoint;
use crate::cli::args::MacroArgs;
use crate::cli::meal::{check_amounts, log_meal, print_logged};
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{MealType, NewQuickFood, QuickFood};
use crate::error::{ApiError, Error, Result};
use crate::models::QuickFoodDisplay;
use crate::output::Formattable;
use crate::output::formatters::format_kcal;
use crate::output::json::format_json;
use crate::query::Query;

/// List saved quick foods
pub async fn list(ctx: &CommandContext) -> Result<()> {
    let foods = load_quick_foods(ctx).await?;
    let rows: Vec<QuickFoodDisplay> = foods.iter().map(QuickFoodDisplay::from).collect();
    rows.print(ctx.format)
}

async fn load_quick_foods(ctx: &CommandContext) -> Result<Vec<QuickFood>> {
    ctx.read(&quick_foods_query(ctx), "Loading quick foods...").await
}

fn quick_foods_query(ctx: &CommandContext) -> Query<Vec<QuickFood>> {
    let store = ctx.store.clone();
    let user = ctx.user_id().to_string();

    ctx.query(Endpoint::QUICK_FOODS, &[], move |_| {
        let store = store.clone();
        let user = user.clone();
        async move { store.list_quick_foods(&user).await }
    })
}

/// Save a food for one-step logging
pub async fn add(ctx: &CommandContext, name: &str, calories: f64, macros: &MacroArgs) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Other("Quick food name cannot be empty".to_string()));
    }
    check_amounts(calories, macros)?;

    let food = NewQuickFood {
        user_id: ctx.user_id().to_string(),
        name: name.to_string(),
        calories,
        proteins: macros.proteins.unwrap_or(0.0),
        carbs: macros.carbs.unwrap_or(0.0),
        fats: macros.fats.unwrap_or(0.0),
    };

    let store = ctx.store.clone();
    let mutation = ctx.mutation(&[Endpoint::QUICK_FOODS], move |food: NewQuickFood| {
        let store = store.clone();
        async move { store.create_quick_food(&food).await }
    });
    let created = mutation.run(food).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&QuickFoodDisplay::from(&created))?),
        _ => println!(
            "{} Saved quick food {} ({}), id {}",
            "✓".green(),
            created.name.bold(),
            format_kcal(created.calories),
            created.id
        ),
    }
    Ok(())
}

/// Find a quick food by id, or by name ignoring case
fn find<'a>(foods: &'a [QuickFood], id_or_name: &str) -> Option<&'a QuickFood> {
    foods.iter().find(|f| f.id == id_or_name).or_else(|| {
        foods
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(id_or_name.trim()))
    })
}

/// Log a saved quick food as a meal now
///
/// A miss in the cached list is retried once against the server, since the
/// food may have been saved from another device.
pub async fn log(ctx: &CommandContext, id_or_name: &str, meal_type: Option<MealType>) -> Result<()> {
    let query = quick_foods_query(ctx);
    let mut foods = ctx.read(&query, "Loading quick foods...").await?;

    if find(&foods, id_or_name).is_none() {
        debug!("Quick food '{}' not in cached list, reloading", id_or_name);
        query.invalidate();
        foods = ctx.read(&query, "Loading quick foods...").await?;
    }

    let food = find(&foods, id_or_name)
        .ok_or_else(|| ApiError::NotFound(format!("quick food '{}'", id_or_name)))?;

    let created = log_meal(ctx, food.to_new_meal(meal_type.unwrap_or_else(MealType::now))).await?;
    print_logged(ctx.format, &created)
}

/// Delete a saved quick food
pub async fn delete(ctx: &CommandContext, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete quick food '{}'?", id))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let store = ctx.store.clone();
    let mutation = ctx.mutation(&[Endpoint::QUICK_FOODS], move |id: String| {
        let store = store.clone();
        async move { store.delete_quick_food(&id).await }
    });
    mutation.run(id.to_string()).await?;

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", format_json(&serde_json::json!({ "id": id, "deleted": true }))?);
        }
        _ => println!("{} Deleted quick food: {}", "✓".green(), id),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cli::context::test_support::context;
    use crate::client::{MealSource, MockStore, NutritionStore};

    fn yogurt() -> QuickFood {
        QuickFood {
            id: "q-1".to_string(),
            user_id: "u1".to_string(),
            name: "Greek Yogurt".to_string(),
            calories: 130.0,
            proteins: 12.0,
            carbs: 9.0,
            fats: 4.0,
        }
    }

    #[test]
    fn test_find_by_id_or_name() {
        let foods = vec![yogurt()];
        assert!(find(&foods, "q-1").is_some());
        assert!(find(&foods, "greek yogurt").is_some());
        assert!(find(&foods, "granola").is_none());
    }

    #[tokio::test]
    async fn test_log_creates_quick_meal() {
        let store = Arc::new(MockStore::new().with_quick_foods(vec![yogurt()]));
        let (ctx, _dir) = context(store.clone(), false);

        log(&ctx, "Greek yogurt", Some(MealType::Snack)).await.unwrap();

        let meals = store.meals().await;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "Greek Yogurt");
        assert_eq!(meals[0].source, MealSource::Quick);
        assert_eq!(meals[0].calories, 130.0);
    }

    #[tokio::test]
    async fn test_log_unknown_food_fails() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);

        let err = log(&ctx, "granola", None).await.unwrap_err();
        assert!(err.to_string().contains("quick food 'granola'"));
        assert_eq!(store.calls().await.create_meal, 0);
    }

    #[tokio::test]
    async fn test_log_reloads_stale_list_on_miss() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);

        // Cache the empty list, then save a food behind the cache's back
        assert!(load_quick_foods(&ctx).await.unwrap().is_empty());
        store
            .create_quick_food(&NewQuickFood {
                user_id: "u1".to_string(),
                name: "Granola".to_string(),
                calories: 200.0,
                proteins: 5.0,
                carbs: 30.0,
                fats: 7.0,
            })
            .await
            .unwrap();

        log(&ctx, "granola", None).await.unwrap();

        assert_eq!(store.calls().await.list_quick_foods, 2);
        assert_eq!(store.meals().await[0].name, "Granola");
    }

    #[tokio::test]
    async fn test_log_hit_uses_cached_list() {
        let store = Arc::new(MockStore::new().with_quick_foods(vec![yogurt()]));
        let (ctx, _dir) = context(store.clone(), false);

        load_quick_foods(&ctx).await.unwrap();
        log(&ctx, "q-1", None).await.unwrap();

        assert_eq!(store.calls().await.list_quick_foods, 1);
    }

    #[tokio::test]
    async fn test_add_invalidates_cached_list() {
        let store = Arc::new(MockStore::new());
        let (ctx, _dir) = context(store.clone(), false);

        assert!(load_quick_foods(&ctx).await.unwrap().is_empty());
        add(&ctx, "Banana", 105.0, &MacroArgs::default()).await.unwrap();

        let foods = load_quick_foods(&ctx).await.unwrap();
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].name, "Banana");
    }
}
