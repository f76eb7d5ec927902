//! Daily totals measured against goals

use chrono::NaiveDate;
use serde::Serialize;

use crate::client::{DailyGoals, Meal};

/// Largest percentage shown; beyond this the number stops being useful
pub const MAX_DISPLAY_PERCENT: f64 = 999.0;

/// Summed calories and macros
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroTotals {
    pub fn add(&mut self, meal: &Meal) {
        self.calories += meal.calories;
        self.proteins += meal.proteins;
        self.carbs += meal.carbs;
        self.fats += meal.fats;
    }
}

/// One day of intake against the user's goals
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub totals: MacroTotals,
    pub goals: DailyGoals,
    pub meal_count: usize,
}

impl DailySummary {
    pub fn calories_percent(&self) -> f64 {
        percent_of(self.totals.calories, self.goals.calories)
    }

    pub fn proteins_percent(&self) -> f64 {
        percent_of(self.totals.proteins, self.goals.proteins)
    }

    pub fn carbs_percent(&self) -> f64 {
        percent_of(self.totals.carbs, self.goals.carbs)
    }

    pub fn fats_percent(&self) -> f64 {
        percent_of(self.totals.fats, self.goals.fats)
    }

    /// Calories left for the day; negative when over
    pub fn calories_remaining(&self) -> f64 {
        self.goals.calories - self.totals.calories
    }
}

/// `value` as a percentage of `goal`, capped for display. A zero goal reads as 0%.
pub fn percent_of(value: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    (value / goal * 100.0).clamp(0.0, MAX_DISPLAY_PERCENT)
}

/// Sum the meals of `date` and pair them with the goals.
pub fn summarize(date: NaiveDate, meals: &[Meal], goals: DailyGoals) -> DailySummary {
    let mut totals = MacroTotals::default();
    for meal in meals {
        totals.add(meal);
    }

    DailySummary {
        date,
        totals,
        goals,
        meal_count: meals.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MealSource, MealType};
    use chrono::Utc;

    fn meal(calories: f64, proteins: f64, carbs: f64, fats: f64) -> Meal {
        Meal {
            id: "m".to_string(),
            user_id: "u1".to_string(),
            name: "x".to_string(),
            calories,
            proteins,
            carbs,
            fats,
            meal_type: MealType::Lunch,
            source: MealSource::Manual,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_summarize_sums_meals() {
        let meals = vec![meal(500.0, 30.0, 60.0, 15.0), meal(700.0, 45.0, 65.0, 20.0)];
        let summary = summarize(date(), &meals, DailyGoals::defaults_for("u1"));

        assert_eq!(summary.meal_count, 2);
        assert_eq!(summary.totals.calories, 1200.0);
        assert_eq!(summary.totals.proteins, 75.0);
        assert_eq!(summary.calories_percent(), 60.0);
        assert_eq!(summary.proteins_percent(), 50.0);
        assert_eq!(summary.calories_remaining(), 800.0);
    }

    #[test]
    fn test_empty_day() {
        let summary = summarize(date(), &[], DailyGoals::defaults_for("u1"));
        assert_eq!(summary.meal_count, 0);
        assert_eq!(summary.totals, MacroTotals::default());
        assert_eq!(summary.calories_percent(), 0.0);
    }

    #[test]
    fn test_percent_is_capped() {
        assert_eq!(percent_of(50_000.0, 10.0), 999.0);
    }

    #[test]
    fn test_zero_goal_reads_as_zero() {
        assert_eq!(percent_of(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_over_goal_has_negative_remaining() {
        let summary = summarize(date(), &[meal(2500.0, 0.0, 0.0, 0.0)], DailyGoals::defaults_for("u1"));
        assert_eq!(summary.calories_remaining(), -500.0);
        assert_eq!(summary.calories_percent(), 125.0);
    }
}
