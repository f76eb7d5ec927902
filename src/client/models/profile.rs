//! User profile model

use serde::{Deserialize, Serialize};

/// Row of the `profiles` table (keyed by the auth user id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// e.g. sedentary, light, moderate, active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
}
