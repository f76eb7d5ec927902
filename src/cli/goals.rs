//! Daily goals command implementations

use colored::Colorize;

use crate::cache::Endpoint;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::DailyGoals;
use crate::error::{Error, Result};
use crate::models::GoalsDisplay;
use crate::output::Formattable;

/// New goal values; unset fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

impl GoalUpdate {
    fn is_empty(&self) -> bool {
        self.calories.is_none() && self.proteins.is_none() && self.carbs.is_none() && self.fats.is_none()
    }

    fn apply(&self, mut goals: DailyGoals) -> Result<DailyGoals> {
        let values = [self.calories, self.proteins, self.carbs, self.fats];
        if values.iter().flatten().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(Error::Other("Goals must be positive numbers".to_string()));
        }

        if let Some(v) = self.calories {
            goals.calories = v;
        }
        if let Some(v) = self.proteins {
            goals.proteins = v;
        }
        if let Some(v) = self.carbs {
            goals.carbs = v;
        }
        if let Some(v) = self.fats {
            goals.fats = v;
        }
        Ok(goals)
    }
}

/// Show the current daily goals
pub async fn get(ctx: &CommandContext) -> Result<()> {
    let goals = load_goals(ctx).await?;
    GoalsDisplay::from(&goals).print(ctx.format)
}

/// Cached read of the user's goals (defaults when none are saved)
pub(crate) async fn load_goals(ctx: &CommandContext) -> Result<DailyGoals> {
    let store = ctx.store.clone();
    let user = ctx.user_id().to_string();

    let query = ctx.query(Endpoint::DAILY_GOALS, &[], move |_| {
        let store = store.clone();
        let user = user.clone();
        async move { store.get_daily_goals(&user).await }
    });
    ctx.read(&query, "Loading goals...").await
}

/// Change one or more daily goals
pub async fn set(ctx: &CommandContext, update: &GoalUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(Error::Other(
            "Nothing to change. Pass at least one of --calories, --proteins, --carbs, --fats"
                .to_string(),
        ));
    }

    let goals = update.apply(load_goals(ctx).await?)?;

    let store = ctx.store.clone();
    let mutation = ctx.mutation(&[Endpoint::DAILY_GOALS], move |goals: DailyGoals| {
        let store = store.clone();
        async move { store.upsert_daily_goals(&goals).await }
    });
    let saved = mutation.run(goals).await?;

    if ctx.format != OutputFormat::Json {
        println!("{} Goals updated", "✓".green());
    }
    GoalsDisplay::from(&saved).print(ctx.format)
}
