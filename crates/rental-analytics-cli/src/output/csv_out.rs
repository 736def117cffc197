use serde_json::Value;
use std::io;

/// Write output as CSV to stdout. Nested result objects flatten into
/// dotted column names.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(result @ Value::Object(_)) = map.get("result") {
                // Two-column CSV: field, value
                let _ = wtr.write_record(["field", "value"]);
                for (field, rendered) in flatten(result) {
                    let _ = wtr.write_record([field.as_str(), rendered.as_str()]);
                }
            } else if let Some(Value::Array(results)) = map.get("results") {
                // Batch output or another array of records
                write_array_csv(&mut wtr, results);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (field, rendered) in flatten(value) {
                    let _ = wtr.write_record([field.as_str(), rendered.as_str()]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Column set comes from the first record
    if let Some(first) = arr.first().filter(|v| v.is_object()) {
        let headers: Vec<String> = flatten(first).into_iter().map(|(field, _)| field).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            let flat: std::collections::HashMap<String, String> =
                flatten(item).into_iter().collect();
            let row: Vec<String> = headers
                .iter()
                .map(|h| flat.get(h).cloned().unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

/// Dotted-path (field, value) pairs for every scalar leaf. Arrays stay a
/// single cell.
fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", value, &mut rows);
    rows
}

fn flatten_into(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                match val {
                    Value::Object(_) => flatten_into(&path, val, rows),
                    _ => rows.push((path, format_csv_value(val))),
                }
            }
        }
        _ => {
            let field = if prefix.is_empty() { "value" } else { prefix };
            rows.push((field.to_string(), format_csv_value(value)));
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
