use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let options = table::TableOptions::from_env();

    match serde_json::to_value(value)? {
        Value::Array(items) => Ok(render_array_table(&items, options)),
        Value::Object(map) => {
            let rows = flatten(&map)
                .into_iter()
                .map(|(key, value)| vec![key, value])
                .collect::<Vec<_>>();
            Ok(table::render_rows(&["key", "value"], &rows, options))
        }
        scalar => Ok(table::render_rows(
            &["value"],
            &[vec![value_to_cell(&scalar)]],
            options,
        )),
    }
}

fn render_array_table(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_rows(&["value"], &rows, options);
    }

    let flattened = items
        .iter()
        .filter_map(Value::as_object)
        .map(flatten)
        .collect::<Vec<_>>();

    // Columns in first-seen order
    let mut headers = Vec::<String>::new();
    for row in &flattened {
        for (key, _) in row {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = flattened
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|header| {
                    row.iter()
                        .find(|(key, _)| key == header)
                        .map_or_else(|| String::from("-"), |(_, cell)| cell.clone())
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_rows(&header_refs, &rows, options)
}

/// One level of nesting becomes dotted columns (`company.name`).
fn flatten(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut cells = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Object(inner) => {
                for (inner_key, inner_value) in inner {
                    cells.push((format!("{key}.{inner_key}"), value_to_cell(inner_value)));
                }
            }
            other => cells.push((key.clone(), value_to_cell(other))),
        }
    }
    cells
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}
