//! Daily progress display model

use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::round1;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::Formattable;
use crate::output::formatters::{colored_progress_bar, format_kcal, format_percent};
use crate::output::json::format_json;
use crate::output::table::format_table;
use crate::progress::DailySummary;

const BAR_WIDTH: usize = 20;

/// One nutrient measured against its goal
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct NutrientProgress {
    #[tabled(rename = "NUTRIENT")]
    pub nutrient: String,

    #[tabled(rename = "CONSUMED")]
    pub consumed: f64,

    #[tabled(rename = "GOAL")]
    pub goal: f64,

    #[tabled(rename = "UNIT")]
    pub unit: String,

    #[tabled(rename = "PERCENT")]
    pub percent: f64,
}

/// A day's summary for output
#[derive(Debug, Clone, Serialize)]
pub struct ProgressDisplay {
    pub date: NaiveDate,
    pub meal_count: usize,
    pub calories_remaining: f64,
    pub nutrients: Vec<NutrientProgress>,
}

fn nutrient(name: &str, consumed: f64, goal: f64, unit: &str, percent: f64) -> NutrientProgress {
    NutrientProgress {
        nutrient: name.to_string(),
        consumed: round1(consumed),
        goal: round1(goal),
        unit: unit.to_string(),
        percent: percent.round(),
    }
}

impl From<&DailySummary> for ProgressDisplay {
    fn from(summary: &DailySummary) -> Self {
        let totals = &summary.totals;
        let goals = &summary.goals;

        Self {
            date: summary.date,
            meal_count: summary.meal_count,
            calories_remaining: summary.calories_remaining().round(),
            nutrients: vec![
                nutrient("Calories", totals.calories.round(), goals.calories, "kcal", summary.calories_percent()),
                nutrient("Protein", totals.proteins, goals.proteins, "g", summary.proteins_percent()),
                nutrient("Carbs", totals.carbs, goals.carbs, "g", summary.carbs_percent()),
                nutrient("Fat", totals.fats, goals.fats, "g", summary.fats_percent()),
            ],
        }
    }
}

impl ProgressDisplay {
    fn header(&self) -> String {
        let meals = if self.meal_count == 1 { "meal" } else { "meals" };
        format!("Progress for {} ({} {})", self.date, self.meal_count, meals)
    }

    fn remaining_line(&self) -> String {
        if self.calories_remaining >= 0.0 {
            format!("{} remaining", format_kcal(self.calories_remaining))
        } else {
            format!("{} over goal", format_kcal(-self.calories_remaining))
        }
    }
}

impl Formattable for ProgressDisplay {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(format_json(self)?),
            OutputFormat::Table => Ok(format!(
                "{}\n{}\n{}",
                self.header(),
                format_table(&self.nutrients),
                self.remaining_line()
            )),
            OutputFormat::Pretty => {
                let mut out = format!("{}\n\n", self.header().bold());
                for n in &self.nutrients {
                    out.push_str(&format!(
                        "  {:<9} {:>7} / {:<7} {:<4} {} {:>4}\n",
                        n.nutrient,
                        n.consumed,
                        n.goal,
                        n.unit,
                        colored_progress_bar(n.percent, BAR_WIDTH),
                        format_percent(n.percent)
                    ));
                }

                let remaining = self.remaining_line();
                if self.calories_remaining >= 0.0 {
                    out.push_str(&format!("\n  {}", remaining.green()));
                } else {
                    out.push_str(&format!("\n  {}", remaining.red()));
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DailyGoals;
    use crate::progress::MacroTotals;

    fn summary(calories: f64) -> DailySummary {
        DailySummary {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            totals: MacroTotals {
                calories,
                proteins: 75.0,
                carbs: 100.0,
                fats: 30.0,
            },
            goals: DailyGoals::defaults_for("u1"),
            meal_count: 2,
        }
    }

    #[test]
    fn test_progress_display_percentages() {
        let display = ProgressDisplay::from(&summary(1500.0));
        assert_eq!(display.nutrients.len(), 4);
        assert_eq!(display.nutrients[0].percent, 75.0);
        assert_eq!(display.nutrients[1].percent, 50.0);
        assert_eq!(display.calories_remaining, 500.0);
    }

    #[test]
    fn test_progress_over_goal() {
        colored::control::set_override(false);
        let display = ProgressDisplay::from(&summary(2300.0));
        let out = display.format(OutputFormat::Pretty).unwrap();
        assert!(out.contains("300 kcal over goal"));
        assert!(out.contains("Progress for 2024-05-01 (2 meals)"));
    }

    #[test]
    fn test_progress_table_and_json() {
        let display = ProgressDisplay::from(&summary(1000.0));

        let table = display.format(OutputFormat::Table).unwrap();
        assert!(table.contains("NUTRIENT"));
        assert!(table.contains("1000 kcal remaining"));

        let json = display.format(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["data"]["date"], "2024-05-01");
        assert_eq!(value["data"]["nutrients"][0]["percent"], 50.0);
    }
}
