//! Display models for CLI output

pub mod display;

pub use display::{
    AnalysisDisplay, GoalsDisplay, MealDisplay, ProfileDisplay, ProgressDisplay,
    QuickFoodDisplay,
};
