//! Meal models

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which meal of the day an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Guess the meal from the local hour of day
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            5..=10 => MealType::Breakfast,
            11..=15 => MealType::Lunch,
            16..=21 => MealType::Dinner,
            _ => MealType::Snack,
        }
    }

    /// Meal type for the current local time
    pub fn now() -> Self {
        Self::for_hour(chrono::Local::now().hour())
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        };
        write!(f, "{}", s)
    }
}

/// How a meal was logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSource {
    Photo,
    Voice,
    Text,
    Quick,
    Manual,
}

impl fmt::Display for MealSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MealSource::Photo => "photo",
            MealSource::Voice => "voice",
            MealSource::Text => "text",
            MealSource::Quick => "quick",
            MealSource::Manual => "manual",
        };
        write!(f, "{}", s)
    }
}

/// A logged meal (row of the `meals` table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,

    pub user_id: String,

    pub name: String,

    /// Energy in kcal
    pub calories: f64,

    /// Protein in grams
    #[serde(default)]
    pub proteins: f64,

    /// Carbohydrates in grams
    #[serde(default)]
    pub carbs: f64,

    /// Fat in grams
    #[serde(default)]
    pub fats: f64,

    pub meal_type: MealType,

    pub source: MealSource,

    /// Storage URL of the analyzed photo, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Insert payload for the `meals` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeal {
    pub user_id: String,
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
    pub meal_type: MealType,
    pub source: MealSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
