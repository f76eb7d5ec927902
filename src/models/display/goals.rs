//! Daily goals display model

use colored::Colorize;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::DailyGoals;
use crate::error::Result;
use crate::output::Formattable;
use crate::output::formatters::{format_grams, format_kcal};
use crate::output::json::format_json;
use crate::output::table::format_fields;

/// Daily goals for output; the owning user is left out.
#[derive(Debug, Clone, Serialize)]
pub struct GoalsDisplay {
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl From<&DailyGoals> for GoalsDisplay {
    fn from(goals: &DailyGoals) -> Self {
        Self {
            calories: goals.calories,
            proteins: goals.proteins,
            carbs: goals.carbs,
            fats: goals.fats,
        }
    }
}

impl GoalsDisplay {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Calories", format_kcal(self.calories)),
            ("Protein", format_grams(self.proteins)),
            ("Carbs", format_grams(self.carbs)),
            ("Fat", format_grams(self.fats)),
        ]
    }
}

impl Formattable for GoalsDisplay {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(format_json(self)?),
            OutputFormat::Table => Ok(format_fields(&self.fields())),
            OutputFormat::Pretty => {
                let mut out = format!("{}\n", "Daily goals".bold());
                for (label, value) in self.fields() {
                    out.push_str(&format!("  {:<10} {}\n", label, value));
                }
                Ok(out.trim_end().to_string())
            }
        }
    }
}
