//! Food analysis display model

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::round1;
use crate::analysis::{FoodAnalysis, FoodItem};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::Formattable;
use crate::output::formatters::{format_grams, format_kcal};
use crate::output::json::format_json;
use crate::output::table::format_table;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FoodItemDisplay {
    #[tabled(rename = "FOOD")]
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

impl From<&FoodItem> for FoodItemDisplay {
    fn from(item: &FoodItem) -> Self {
        Self {
            name: item.name.clone(),
            calories: item.calories.round(),
            proteins: round1(item.proteins),
            carbs: round1(item.carbs),
            fats: round1(item.fats),
        }
    }
}

/// Recognized foods plus totals and confidence
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisDisplay(pub FoodAnalysis);

impl AnalysisDisplay {
    fn totals_line(&self) -> String {
        let a = &self.0;
        format!(
            "Total: {}, protein {}, carbs {}, fat {}",
            format_kcal(a.total_calories),
            format_grams(a.total_proteins),
            format_grams(a.total_carbs),
            format_grams(a.total_fats)
        )
    }

    fn confidence_line(&self) -> String {
        let confidence = self.0.confidence;
        let text = format!("Confidence: {}%", confidence);
        match confidence {
            70..=100 => text.green().to_string(),
            40..=69 => text.yellow().to_string(),
            _ => text.red().to_string(),
        }
    }
}

impl Formattable for AnalysisDisplay {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(format_json(&self.0)?),
            OutputFormat::Table => {
                let rows: Vec<FoodItemDisplay> = self.0.foods.iter().map(Into::into).collect();
                Ok(format!(
                    "{}\n{}\n{}",
                    format_table(&rows),
                    self.totals_line(),
                    self.confidence_line()
                ))
            }
            OutputFormat::Pretty => {
                let mut out = String::new();
                for item in &self.0.foods {
                    out.push_str(&format!(
                        "  {} {} ({})\n",
                        "•".cyan(),
                        item.name.bold(),
                        format_kcal(item.calories)
                    ));
                }
                out.push_str(&format!("\n{}\n{}", self.totals_line(), self.confidence_line()));
                Ok(out)
            }
        }
    }
}
