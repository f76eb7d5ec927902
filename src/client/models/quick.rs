//! Quick food models

use serde::{Deserialize, Serialize};

use super::{MealSource, MealType, NewMeal};

/// A saved food that can be logged in one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickFood {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub calories: f64,
    #[serde(default)]
    pub proteins: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
}

impl QuickFood {
    /// Meal insert payload for logging this food now
    pub fn to_new_meal(&self, meal_type: MealType) -> NewMeal {
        NewMeal {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            calories: self.calories,
            proteins: self.proteins,
            carbs: self.carbs,
            fats: self.fats,
            meal_type,
            source: MealSource::Quick,
            image_url: None,
        }
    }
}

/// Insert payload for the `quick_foods` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuickFood {
    pub user_id: String,
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
}
