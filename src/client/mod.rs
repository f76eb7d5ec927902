//! Remote collaborators: the Supabase store and the nutrition data it holds

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod rate_limit;
pub mod response;
pub mod supabase;

#[cfg(test)]
pub use mock::MockStore;
pub use models::{
    DailyGoals, Meal, MealSource, MealType, NewMeal, NewQuickFood, Profile, QuickFood,
};
pub use supabase::SupabaseClient;

/// Persistence for meals, goals, quick foods and profiles
#[async_trait]
pub trait NutritionStore: Send + Sync {
    /// Meals logged by `user_id` on the local calendar day `date`, newest first
    async fn list_meals(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Meal>>;

    async fn create_meal(&self, meal: &NewMeal) -> Result<Meal>;

    async fn delete_meal(&self, id: &str) -> Result<()>;

    /// The user's goals, or the defaults when none were saved
    async fn get_daily_goals(&self, user_id: &str) -> Result<DailyGoals>;

    /// Insert or replace the user's goals
    async fn upsert_daily_goals(&self, goals: &DailyGoals) -> Result<DailyGoals>;

    async fn list_quick_foods(&self, user_id: &str) -> Result<Vec<QuickFood>>;

    async fn create_quick_food(&self, food: &NewQuickFood) -> Result<QuickFood>;

    async fn delete_quick_food(&self, id: &str) -> Result<()>;

    async fn get_profile(&self, user_id: &str) -> Result<Profile>;

    async fn update_profile(&self, profile: &Profile) -> Result<Profile>;
}
