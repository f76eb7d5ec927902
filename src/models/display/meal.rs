//! Meal display model

use serde::Serialize;
use tabled::Tabled;

use super::round1;
use crate::client::Meal;
use crate::output::formatters::{format_local_time, truncate};

/// Meal display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MealDisplay {
    /// Local time the meal was logged
    #[tabled(rename = "TIME")]
    pub time: String,

    #[tabled(rename = "TYPE")]
    pub meal_type: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "KCAL")]
    pub calories: f64,

    #[tabled(rename = "PROTEIN")]
    pub proteins: f64,

    #[tabled(rename = "CARBS")]
    pub carbs: f64,

    #[tabled(rename = "FAT")]
    pub fats: f64,

    #[tabled(rename = "SOURCE")]
    pub source: String,

    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&Meal> for MealDisplay {
    fn from(meal: &Meal) -> Self {
        Self {
            time: format_local_time(&meal.created_at),
            meal_type: meal.meal_type.to_string(),
            name: truncate(&meal.name, 40),
            calories: meal.calories.round(),
            proteins: round1(meal.proteins),
            carbs: round1(meal.carbs),
            fats: round1(meal.fats),
            source: meal.source.to_string(),
            id: meal.id.clone(),
        }
    }
}

impl From<Meal> for MealDisplay {
    fn from(meal: Meal) -> Self {
        Self::from(&meal)
    }
}
