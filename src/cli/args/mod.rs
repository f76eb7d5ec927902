//! Shared CLI argument types

mod common;
mod global;

pub use common::{MacroArgs, OutputFormat, parse_date, today};
pub use global::GlobalOptions;
