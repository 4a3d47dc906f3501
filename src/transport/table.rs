//! Render backend JSON as terminal tables

use serde_json::Value;
use tabled::{builder::Builder, settings::Style, Table};

/// Render a list of records.
///
/// Columns are the union of object keys in first-seen order. Rows that are
/// not objects land in the first column.
pub fn render_rows(rows: &[Value]) -> String {
    let columns = columns(rows);
    let mut builder = Builder::default();

    if columns.is_empty() {
        builder.push_record(vec!["value".to_string()]);
        for row in rows {
            builder.push_record(vec![cell(row)]);
        }
    } else {
        builder.push_record(columns.clone());
        for row in rows {
            let record: Vec<String> = match row.as_object() {
                Some(object) => columns
                    .iter()
                    .map(|c| object.get(c).map(cell).unwrap_or_default())
                    .collect(),
                None => {
                    let mut record = vec![String::new(); columns.len()];
                    record[0] = cell(row);
                    record
                }
            };
            builder.push_record(record);
        }
    }

    finish(builder.build())
}

/// Render a single record as field/value pairs
pub fn render_item(item: &Value) -> String {
    match item.as_object() {
        Some(object) => {
            let mut builder = Builder::default();
            builder.push_record(vec!["Field".to_string(), "Value".to_string()]);
            for (key, value) in object {
                builder.push_record(vec![key.clone(), cell(value)]);
            }
            finish(builder.build())
        }
        None => cell(item),
    }
}

/// Text for one cell: strings unquoted, null empty, everything else as JSON
pub fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn columns(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for object in rows.iter().filter_map(Value::as_object) {
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn finish(mut table: Table) -> String {
    table.with(Style::rounded());
    table.to_string()
}
