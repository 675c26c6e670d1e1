use serde_json::{Map, Value};
use std::io::{self, Write};

use super::{cell, is_row_array};

/// Write output as CSV to stdout.
///
/// A result holding a row list (scenarios, exposures, counterparties) is
/// written as one row per item; otherwise as `field,value` pairs with nested
/// breakdowns under dotted keys.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_csv<W: Write>(writer: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(rows) = map.values().find(|v| is_row_array(v)).and_then(Value::as_array) {
                write_rows(&mut wtr, rows)?;
            } else {
                wtr.write_record(["field", "value"])?;
                write_pairs(&mut wtr, map, "")?;
            }
        }
        Value::Array(rows) => write_rows(&mut wtr, rows)?,
        _ => wtr.write_record([cell(result)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_pairs<W: Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
    prefix: &str,
) -> Result<(), csv::Error> {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => write_pairs(wtr, inner, &name)?,
            _ => wtr.write_record([name.as_str(), &cell(val)])?,
        }
    }
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for item in rows.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_pairs_with_dotted_breakdown() {
        let out = render(&json!({
            "result": {"leverage_ratio": "0.05", "breakdown": {"sft": "0"}}
        }));
        assert_eq!(out, "field,value\nbreakdown.sft,0\nleverage_ratio,0.05\n");
    }

    #[test]
    fn test_row_list_written_per_item() {
        let out = render(&json!({
            "result": {
                "worst_scenario": "Parallel Up",
                "scenarios": [
                    {"delta_eve": "-2", "scenario_name": "Parallel Up"},
                    {"delta_eve": "2", "scenario_name": "Parallel Down"}
                ]
            }
        }));
        assert_eq!(
            out,
            "delta_eve,scenario_name\n-2,Parallel Up\n2,Parallel Down\n"
        );
    }
}
