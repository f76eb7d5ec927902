//! Daily goal models

use serde::{Deserialize, Serialize};

pub const DEFAULT_CALORIES: f64 = 2000.0;
pub const DEFAULT_PROTEINS: f64 = 150.0;
pub const DEFAULT_CARBS: f64 = 250.0;
pub const DEFAULT_FATS: f64 = 65.0;

/// Daily calorie and macro targets (one row per user in `daily_goals`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    pub user_id: String,

    #[serde(default = "default_calories")]
    pub calories: f64,

    #[serde(default = "default_proteins")]
    pub proteins: f64,

    #[serde(default = "default_carbs")]
    pub carbs: f64,

    #[serde(default = "default_fats")]
    pub fats: f64,
}

fn default_calories() -> f64 {
    DEFAULT_CALORIES
}

fn default_proteins() -> f64 {
    DEFAULT_PROTEINS
}

fn default_carbs() -> f64 {
    DEFAULT_CARBS
}

fn default_fats() -> f64 {
    DEFAULT_FATS
}

impl DailyGoals {
    /// Goals used when the user has never saved any
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            calories: DEFAULT_CALORIES,
            proteins: DEFAULT_PROTEINS,
            carbs: DEFAULT_CARBS,
            fats: DEFAULT_FATS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let goals = DailyGoals::defaults_for("u1");
        assert_eq!(goals.calories, 2000.0);
        assert_eq!(goals.proteins, 150.0);
        assert_eq!(goals.carbs, 250.0);
        assert_eq!(goals.fats, 65.0);
    }

    #[test]
    fn test_missing_columns_use_defaults() {
        let goals: DailyGoals = serde_json::from_str(r#"{"user_id":"u1","calories":1800}"#).unwrap();
        assert_eq!(goals.calories, 1800.0);
        assert_eq!(goals.fats, 65.0);
    }
}
