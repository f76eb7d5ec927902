//! Nutrition data models
//!
//! Rows of the Supabase tables, organized by resource type.

mod goals;
mod meal;
mod profile;
mod quick;

pub use goals::DailyGoals;
pub use meal::{Meal, MealSource, MealType, NewMeal};
pub use profile::Profile;
pub use quick::{NewQuickFood, QuickFood};
