//! Quick food display model

use serde::Serialize;
use tabled::Tabled;

use super::round1;
use crate::client::QuickFood;

/// Quick food display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct QuickFoodDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

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
}

impl From<&QuickFood> for QuickFoodDisplay {
    fn from(food: &QuickFood) -> Self {
        Self {
            id: food.id.clone(),
            name: food.name.clone(),
            calories: food.calories.round(),
            proteins: round1(food.proteins),
            carbs: round1(food.carbs),
            fats: round1(food.fats),
        }
    }
}
