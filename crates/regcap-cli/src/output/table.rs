use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, is_row_array};

/// Format output as tables: scalar result fields first, then one table per
/// nested breakdown or row list.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_envelope(result, map),
            _ => print_fields(map),
        },
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", value),
    }
}

fn print_envelope(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let scalars: Map<String, Value> = result
        .iter()
        .filter(|(_, v)| !v.is_object() && !is_row_array(v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    print_fields(&scalars);

    for (key, val) in result {
        match val {
            Value::Object(section) => {
                println!("\n{}:", key);
                if section.values().any(is_row_array) || section.values().any(Value::is_object) {
                    // comparison results nest full calculator outputs
                    print_fields(&flatten(section, ""));
                } else {
                    print_fields(section);
                }
            }
            Value::Array(rows) if is_row_array(val) => {
                println!("\n{}:", key);
                print_rows(rows);
            }
            _ => {}
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    if map.is_empty() {
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &list_cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            println!("{}", list_cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for item in rows.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h).map(list_cell).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

/// Dotted-key view of a nested object.
fn flatten(map: &Map<String, Value>, prefix: &str) -> Map<String, Value> {
    let mut flat = Map::new();
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => flat.extend(flatten(inner, &name)),
            _ => {
                flat.insert(name, val.clone());
            }
        }
    }
    flat
}

fn list_cell(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join("; "),
        _ => cell(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_comparison() {
        let nested = json!({
            "sec_irba": {"risk_weight": "1.5242", "inputs": {"kirb": "0.05"}},
            "optimal_approach": "SEC-IRBA"
        });
        let flat = flatten(nested.as_object().unwrap(), "");
        assert_eq!(flat["sec_irba.risk_weight"], json!("1.5242"));
        assert_eq!(flat["sec_irba.inputs.kirb"], json!("0.05"));
        assert_eq!(flat["optimal_approach"], json!("SEC-IRBA"));
    }

    #[test]
    fn test_list_cell_joins_steps() {
        assert_eq!(list_cell(&json!(["p = 0.67", "RW = 152%"])), "p = 0.67; RW = 152%");
    }
}
