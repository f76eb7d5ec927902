//! Food recognition through a hosted language model

use std::path::Path;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::client::{MealSource, MealType, NewMeal};
use crate::error::Result;

pub mod openai;
pub mod parse;

pub use openai::OpenAiAnalyzer;
pub use parse::parse_analysis;

/// Name used when recognition fails
pub const PLACEHOLDER_NAME: &str = "Unknown food";

/// Confidence reported for the placeholder
pub const PLACEHOLDER_CONFIDENCE: u8 = 10;

/// One recognized food with its estimated macros
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Result of analyzing a photo or description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodAnalysis {
    pub foods: Vec<FoodItem>,
    pub total_calories: f64,
    pub total_proteins: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
    /// 0..=100
    pub confidence: u8,
}

impl FoodAnalysis {
    /// Stand-in returned when the model cannot be reached or understood
    pub fn placeholder() -> Self {
        Self {
            foods: vec![FoodItem {
                name: PLACEHOLDER_NAME.to_string(),
                calories: 0.0,
                proteins: 0.0,
                carbs: 0.0,
                fats: 0.0,
            }],
            total_calories: 0.0,
            total_proteins: 0.0,
            total_carbs: 0.0,
            total_fats: 0.0,
            confidence: PLACEHOLDER_CONFIDENCE,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.confidence == PLACEHOLDER_CONFIDENCE
            && self.foods.len() == 1
            && self.foods[0].name == PLACEHOLDER_NAME
    }

    /// Display name for the whole plate
    pub fn meal_name(&self) -> String {
        let names: Vec<&str> = self.foods.iter().map(|f| f.name.as_str()).collect();
        if names.is_empty() {
            PLACEHOLDER_NAME.to_string()
        } else {
            names.join(", ")
        }
    }

    /// Meal insert payload built from the totals
    pub fn to_new_meal(
        &self,
        user_id: &str,
        meal_type: MealType,
        source: MealSource,
        image_url: Option<String>,
    ) -> NewMeal {
        NewMeal {
            user_id: user_id.to_string(),
            name: self.meal_name(),
            calories: self.total_calories.round(),
            proteins: round1(self.total_proteins),
            carbs: round1(self.total_carbs),
            fats: round1(self.total_fats),
            meal_type,
            source,
            image_url,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// MIME type for a food photo, from its extension
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Nutrition estimation from text or images
#[async_trait]
pub trait FoodAnalyzer: Send + Sync {
    /// Estimate the foods in a free-text (or transcribed voice) description
    async fn analyze_text(&self, description: &str) -> Result<FoodAnalysis>;

    /// Estimate the foods in a photo
    async fn analyze_image(&self, image: &[u8], mime_type: &str) -> Result<FoodAnalysis>;

    async fn analyze_text_or_fallback(&self, description: &str) -> FoodAnalysis {
        match self.analyze_text(description).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Text analysis failed, using placeholder: {}", e);
                FoodAnalysis::placeholder()
            }
        }
    }

    async fn analyze_image_or_fallback(&self, image: &[u8], mime_type: &str) -> FoodAnalysis {
        match self.analyze_image(image, mime_type).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Image analysis failed, using placeholder: {}", e);
                FoodAnalysis::placeholder()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, Error};

    struct Failing;

    #[async_trait]
    impl FoodAnalyzer for Failing {
        async fn analyze_text(&self, _: &str) -> Result<FoodAnalysis> {
            Err(Error::Api(ApiError::Network("offline".into())))
        }

        async fn analyze_image(&self, _: &[u8], _: &str) -> Result<FoodAnalysis> {
            Err(Error::Api(ApiError::InvalidResponse("garbage".into())))
        }
    }

    #[test]
    fn test_placeholder() {
        let placeholder = FoodAnalysis::placeholder();
        assert_eq!(placeholder.foods[0].name, "Unknown food");
        assert_eq!(placeholder.total_calories, 0.0);
        assert_eq!(placeholder.confidence, 10);
        assert!(placeholder.is_placeholder());
    }

    #[tokio::test]
    async fn test_fallbacks_return_placeholder() {
        assert!(Failing.analyze_text_or_fallback("toast").await.is_placeholder());
        assert!(Failing.analyze_image_or_fallback(&[0xff], "image/jpeg").await.is_placeholder());
    }

    #[test]
    fn test_to_new_meal_rounds_totals() {
        let analysis = FoodAnalysis {
            foods: vec![
                FoodItem {
                    name: "Rice".into(),
                    calories: 200.4,
                    proteins: 4.04,
                    carbs: 44.0,
                    fats: 0.5,
                },
                FoodItem {
                    name: "Beans".into(),
                    calories: 120.0,
                    proteins: 8.0,
                    carbs: 20.0,
                    fats: 0.4,
                },
            ],
            total_calories: 320.4,
            total_proteins: 12.04,
            total_carbs: 64.0,
            total_fats: 0.9,
            confidence: 70,
        };

        let meal = analysis.to_new_meal("u1", MealType::Dinner, MealSource::Photo, None);
        assert_eq!(meal.name, "Rice, Beans");
        assert_eq!(meal.calories, 320.0);
        assert_eq!(meal.proteins, 12.0);
        assert_eq!(meal.source, MealSource::Photo);
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(Path::new("lunch.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime_type(Path::new("a/b/plate.png")), Some("image/png"));
        assert_eq!(image_mime_type(Path::new("notes.txt")), None);
        assert_eq!(image_mime_type(Path::new("noext")), None);
    }
}
