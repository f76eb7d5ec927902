//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Format rows as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

#[derive(Tabled)]
struct FieldRow<'a> {
    #[tabled(rename = "FIELD")]
    field: &'a str,
    #[tabled(rename = "VALUE")]
    value: &'a str,
}

/// Format a single record as a two-column FIELD/VALUE table
pub fn format_fields(fields: &[(&str, String)]) -> String {
    let rows: Vec<FieldRow<'_>> = fields
        .iter()
        .map(|(field, value)| FieldRow {
            field,
            value: value.as_str(),
        })
        .collect();
    format_table(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct TestRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "KCAL")]
        calories: u32,
    }

    #[test]
    fn test_format_table_empty() {
        let items: Vec<TestRow> = vec![];
        assert_eq!(format_table(&items), "No results found.");
    }

    #[test]
    fn test_format_table_rows() {
        let items = vec![
            TestRow {
                name: "Toast".to_string(),
                calories: 80,
            },
            TestRow {
                name: "Coffee".to_string(),
                calories: 5,
            },
        ];

        let result = format_table(&items);
        assert!(result.contains("NAME"));
        assert!(result.contains("KCAL"));
        assert!(result.contains("Toast"));
        assert!(result.contains("Coffee"));
        // Rounded style corners
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }

    #[test]
    fn test_format_fields() {
        let result = format_fields(&[("Calories", "2000 kcal".to_string())]);
        assert!(result.contains("FIELD"));
        assert!(result.contains("Calories"));
        assert!(result.contains("2000 kcal"));
    }
}
