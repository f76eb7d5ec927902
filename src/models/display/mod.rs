//! Display model implementations for table and JSON output
//!
//! Display models turn store rows and analysis results into CLI-friendly
//! shapes with column names and rounded values.

mod analysis;
mod goals;
mod meal;
mod profile;
mod progress;
mod quick;

pub use analysis::AnalysisDisplay;
pub use goals::GoalsDisplay;
pub use meal::MealDisplay;
pub use profile::ProfileDisplay;
pub use progress::ProgressDisplay;
pub use quick::QuickFoodDisplay;

/// One decimal place, the precision shown for grams
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
