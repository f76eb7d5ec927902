//! In-memory nutrition store for testing
//!
//! Provides a mock implementation of [`NutritionStore`] so command and
//! query-layer tests run without a Supabase project.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use tokio::sync::Mutex;

use super::{
    DailyGoals, Meal, NewMeal, NewQuickFood, NutritionStore, Profile, QuickFood,
};
use crate::error::{ApiError, Result};

/// Per-method call counters
#[derive(Debug, Clone, Default)]
pub struct CallCounts {
    pub list_meals: usize,
    pub create_meal: usize,
    pub delete_meal: usize,
    pub get_daily_goals: usize,
    pub upsert_daily_goals: usize,
    pub list_quick_foods: usize,
    pub create_quick_food: usize,
    pub delete_quick_food: usize,
    pub get_profile: usize,
    pub update_profile: usize,
}

/// Mock store.
///
/// # Example
/// ```ignore
/// let store = MockStore::new().with_meals(vec![meal("m1", 300.0)]);
/// let meals = store.list_meals("u1", today).await?;
/// ```
#[derive(Default)]
pub struct MockStore {
    meals: Arc<Mutex<Vec<Meal>>>,
    goals: Arc<Mutex<Option<DailyGoals>>>,
    quick_foods: Arc<Mutex<Vec<QuickFood>>>,
    profile: Arc<Mutex<Option<Profile>>>,
    /// Returned by the next call, then cleared
    error: Arc<Mutex<Option<ApiError>>>,
    calls: Arc<Mutex<CallCounts>>,
    next_id: Arc<Mutex<u32>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meals(self, meals: Vec<Meal>) -> Self {
        *self.meals.try_lock().expect("fresh mock") = meals;
        self
    }

    pub fn with_goals(self, goals: DailyGoals) -> Self {
        *self.goals.try_lock().expect("fresh mock") = Some(goals);
        self
    }

    pub fn with_quick_foods(self, foods: Vec<QuickFood>) -> Self {
        *self.quick_foods.try_lock().expect("fresh mock") = foods;
        self
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        *self.profile.try_lock().expect("fresh mock") = Some(profile);
        self
    }

    /// Fail the next call with `error`
    pub async fn fail_next(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    pub async fn calls(&self) -> CallCounts {
        self.calls.lock().await.clone()
    }

    pub async fn meals(&self) -> Vec<Meal> {
        self.meals.lock().await.clone()
    }

    async fn take_error(&self) -> Result<()> {
        match self.error.lock().await.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    async fn next_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().await;
        *next += 1;
        format!("{}-{}", prefix, *next)
    }
}

#[async_trait]
impl NutritionStore for MockStore {
    async fn list_meals(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Meal>> {
        self.calls.lock().await.list_meals += 1;
        self.take_error().await?;

        let mut meals: Vec<Meal> = self
            .meals
            .lock()
            .await
            .iter()
            .filter(|m| {
                m.user_id == user_id && m.created_at.with_timezone(&Local).date_naive() == date
            })
            .cloned()
            .collect();
        meals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(meals)
    }

    async fn create_meal(&self, meal: &NewMeal) -> Result<Meal> {
        self.calls.lock().await.create_meal += 1;
        self.take_error().await?;

        let created = Meal {
            id: self.next_id("meal").await,
            user_id: meal.user_id.clone(),
            name: meal.name.clone(),
            calories: meal.calories,
            proteins: meal.proteins,
            carbs: meal.carbs,
            fats: meal.fats,
            meal_type: meal.meal_type,
            source: meal.source,
            image_url: meal.image_url.clone(),
            created_at: Utc::now(),
        };
        self.meals.lock().await.push(created.clone());
        Ok(created)
    }

    async fn delete_meal(&self, id: &str) -> Result<()> {
        self.calls.lock().await.delete_meal += 1;
        self.take_error().await?;

        let mut meals = self.meals.lock().await;
        let before = meals.len();
        meals.retain(|m| m.id != id);
        if meals.len() == before {
            return Err(ApiError::NotFound(format!("meals {}", id)).into());
        }
        Ok(())
    }

    async fn get_daily_goals(&self, user_id: &str) -> Result<DailyGoals> {
        self.calls.lock().await.get_daily_goals += 1;
        self.take_error().await?;

        Ok(self
            .goals
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| DailyGoals::defaults_for(user_id)))
    }

    async fn upsert_daily_goals(&self, goals: &DailyGoals) -> Result<DailyGoals> {
        self.calls.lock().await.upsert_daily_goals += 1;
        self.take_error().await?;

        *self.goals.lock().await = Some(goals.clone());
        Ok(goals.clone())
    }

    async fn list_quick_foods(&self, user_id: &str) -> Result<Vec<QuickFood>> {
        self.calls.lock().await.list_quick_foods += 1;
        self.take_error().await?;

        Ok(self
            .quick_foods
            .lock()
            .await
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_quick_food(&self, food: &NewQuickFood) -> Result<QuickFood> {
        self.calls.lock().await.create_quick_food += 1;
        self.take_error().await?;

        let created = QuickFood {
            id: self.next_id("quick").await,
            user_id: food.user_id.clone(),
            name: food.name.clone(),
            calories: food.calories,
            proteins: food.proteins,
            carbs: food.carbs,
            fats: food.fats,
        };
        self.quick_foods.lock().await.push(created.clone());
        Ok(created)
    }

    async fn delete_quick_food(&self, id: &str) -> Result<()> {
        self.calls.lock().await.delete_quick_food += 1;
        self.take_error().await?;

        let mut foods = self.quick_foods.lock().await;
        let before = foods.len();
        foods.retain(|f| f.id != id);
        if foods.len() == before {
            return Err(ApiError::NotFound(format!("quick_foods {}", id)).into());
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.calls.lock().await.get_profile += 1;
        self.take_error().await?;

        self.profile
            .lock()
            .await
            .clone()
            .filter(|p| p.id == user_id)
            .ok_or_else(|| ApiError::NotFound(format!("profile {}", user_id)).into())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        self.calls.lock().await.update_profile += 1;
        self.take_error().await?;

        *self.profile.lock().await = Some(profile.clone());
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MealSource, MealType};

    fn new_meal(name: &str) -> NewMeal {
        NewMeal {
            user_id: "u1".to_string(),
            name: name.to_string(),
            calories: 100.0,
            proteins: 1.0,
            carbs: 2.0,
            fats: 3.0,
            meal_type: MealType::Snack,
            source: MealSource::Manual,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_list_today() {
        let store = MockStore::new();
        store.create_meal(&new_meal("Apple")).await.unwrap();

        let today = Local::now().date_naive();
        let meals = store.list_meals("u1", today).await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "Apple");
        assert!(store.list_meals("other", today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed() {
        let store = MockStore::new();
        store.fail_next(ApiError::ServerError("boom".into())).await;

        assert!(store.get_daily_goals("u1").await.is_err());
        assert!(store.get_daily_goals("u1").await.is_ok());
        assert_eq!(store.calls().await.get_daily_goals, 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let store = MockStore::new();
        assert!(store.delete_meal("missing").await.is_err());
    }
}
