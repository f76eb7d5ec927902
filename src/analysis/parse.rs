//! Tolerant parsing of model replies into [`FoodAnalysis`].
//!
//! Models wrap their JSON in code fences or prose and sometimes quote
//! numbers; we take the first well-formed object and coerce what we can.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{FoodAnalysis, FoodItem};
use crate::error::{ApiError, Result};

/// Confidence assumed when the model omits it
const DEFAULT_CONFIDENCE: u8 = 50;

/// The first well-formed JSON object embedded in `text`.
pub fn extract_json_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value @ Value::Object(_))) => Some(value),
            _ => None,
        }
    })
}

/// Number or numeric string; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_end_matches(|c: char| c.is_alphabetic() || c == '%')
            .trim()
            .parse()
            .ok(),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    proteins: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    carbs: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    fats: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    foods: Vec<RawItem>,
    #[serde(default, deserialize_with = "lenient_number")]
    total_calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    total_proteins: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    total_carbs: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    total_fats: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    confidence: Option<f64>,
}

fn non_negative(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0)
}

/// Parse a model reply. Missing totals are summed from the items and
/// confidence is clamped to 0..=100.
pub fn parse_analysis(text: &str) -> Result<FoodAnalysis> {
    let value = extract_json_object(text).ok_or_else(|| {
        ApiError::InvalidResponse("No JSON object in analysis reply".to_string())
    })?;

    let raw: RawAnalysis = serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("Unexpected analysis shape: {}", e)))?;

    let foods: Vec<FoodItem> = raw
        .foods
        .into_iter()
        .map(|item| FoodItem {
            name: item
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unnamed item".to_string()),
            calories: non_negative(item.calories),
            proteins: non_negative(item.proteins),
            carbs: non_negative(item.carbs),
            fats: non_negative(item.fats),
        })
        .collect();

    if foods.is_empty() && raw.total_calories.is_none() {
        return Err(ApiError::InvalidResponse("Analysis reply lists no foods".to_string()).into());
    }

    let sum = |f: fn(&FoodItem) -> f64| foods.iter().map(f).sum::<f64>();
    let total_calories = raw.total_calories.map_or_else(|| sum(|i| i.calories), |v| non_negative(Some(v)));
    let total_proteins = raw.total_proteins.map_or_else(|| sum(|i| i.proteins), |v| non_negative(Some(v)));
    let total_carbs = raw.total_carbs.map_or_else(|| sum(|i| i.carbs), |v| non_negative(Some(v)));
    let total_fats = raw.total_fats.map_or_else(|| sum(|i| i.fats), |v| non_negative(Some(v)));

    let confidence = raw
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| c.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(DEFAULT_CONFIDENCE);

    Ok(FoodAnalysis {
        foods,
        total_calories,
        total_proteins,
        total_carbs,
        total_fats,
        confidence,
    })
}
