//! Daily progress command

use chrono::NaiveDate;

use crate::cli::CommandContext;
use crate::cli::args::today;
use crate::cli::goals::load_goals;
use crate::cli::meal::load_meals;
use crate::error::Result;
use crate::models::ProgressDisplay;
use crate::output::Formattable;
use crate::progress::{DailySummary, summarize};

/// Show a day's intake against the goals
pub async fn show(ctx: &CommandContext, date: Option<NaiveDate>) -> Result<()> {
    let summary = load_summary(ctx, date.unwrap_or_else(today)).await?;
    ProgressDisplay::from(&summary).print(ctx.format)
}

async fn load_summary(ctx: &CommandContext, date: NaiveDate) -> Result<DailySummary> {
    let (meals, goals) = tokio::join!(load_meals(ctx, date), load_goals(ctx));
    Ok(summarize(date, &meals?, goals?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::cli::context::test_support::context;
    use crate::client::{DailyGoals, Meal, MealSource, MealType, MockStore};

    fn meal(id: &str, calories: f64) -> Meal {
        Meal {
            id: id.to_string(),
            user_id: "u1".to_string(),
            name: "Pasta".to_string(),
            calories,
            proteins: 20.0,
            carbs: 80.0,
            fats: 10.0,
            meal_type: MealType::Dinner,
            source: MealSource::Manual,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_summary_combines_meals_and_goals() {
        let mut goals = DailyGoals::defaults_for("u1");
        goals.calories = 1600.0;
        let store = Arc::new(
            MockStore::new()
                .with_meals(vec![meal("m1", 600.0), meal("m2", 200.0)])
                .with_goals(goals),
        );
        let (ctx, _dir) = context(store, false);

        let summary = load_summary(&ctx, today()).await.unwrap();
        assert_eq!(summary.meal_count, 2);
        assert_eq!(summary.totals.calories, 800.0);
        assert_eq!(summary.calories_percent(), 50.0);
        assert_eq!(summary.calories_remaining(), 800.0);
    }
}
