//! Profile display model

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::Profile;
use crate::error::Result;
use crate::output::Formattable;
use crate::output::json::format_json;
use crate::output::table::format_fields;

/// User profile for output
#[derive(Debug, Clone, Serialize)]
pub struct ProfileDisplay(pub Profile);

fn or_dash<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

impl ProfileDisplay {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let p = &self.0;
        vec![
            ("Name", or_dash(&p.full_name)),
            ("Weight (kg)", or_dash(&p.weight_kg)),
            ("Height (cm)", or_dash(&p.height_cm)),
            ("Age", or_dash(&p.age)),
            ("Gender", or_dash(&p.gender)),
            ("Activity", or_dash(&p.activity_level)),
            ("User ID", p.id.clone()),
        ]
    }
}

impl Formattable for ProfileDisplay {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(format_json(&self.0)?),
            OutputFormat::Table => Ok(format_fields(&self.fields())),
            OutputFormat::Pretty => Ok(self
                .fields()
                .iter()
                .map(|(label, value)| format!("{:<12} {}", label, value))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}
