use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
///
/// Analysis results nest (financials, rate resolution, score), so nested
/// objects flatten into dotted field names and arrays of objects render as
/// their own tables after the main one.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object_tables("", value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    print_object_tables("", result);

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// One field/value table for the scalar leaves, then a table per nested
/// array of objects.
fn print_object_tables(prefix: &str, value: &Value) {
    let mut rows: Vec<(String, String)> = Vec::new();
    let mut nested: Vec<(String, Vec<Value>)> = Vec::new();
    flatten_into(prefix, value, &mut rows, &mut nested);

    if !rows.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (field, rendered) in &rows {
            builder.push_record([field.as_str(), rendered.as_str()]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }

    for (path, arr) in nested {
        println!("\n{}:", path);
        print_array_table(&arr);
    }
}

fn flatten_into(
    prefix: &str,
    value: &Value,
    rows: &mut Vec<(String, String)>,
    nested: &mut Vec<(String, Vec<Value>)>,
) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                match val {
                    Value::Object(_) => flatten_into(&path, val, rows, nested),
                    Value::Array(arr) if arr.iter().any(Value::is_object) => {
                        nested.push((path, arr.clone()));
                    }
                    _ => rows.push((path, format_value(val))),
                }
            }
        }
        _ => {
            let field = if prefix.is_empty() { "value" } else { prefix };
            rows.push((field.to_string(), format_value(value)));
        }
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Flat objects share one table; items with nested structure get a
    // flattened section each.
    let all_flat = arr.iter().all(is_flat_object);
    if all_flat {
        if let Some(Value::Object(first)) = arr.first() {
            let headers: Vec<String> = first.keys().cloned().collect();
            let mut builder = Builder::default();
            builder.push_record(&headers);

            for item in arr {
                if let Value::Object(map) = item {
                    let row: Vec<String> = headers
                        .iter()
                        .map(|h| {
                            map.get(h.as_str())
                                .map(format_value)
                                .unwrap_or_default()
                        })
                        .collect();
                    builder.push_record(row);
                }
            }

            let table = Table::from(builder);
            println!("{}", table);
            return;
        }
    }

    for (index, item) in arr.iter().enumerate() {
        if item.is_object() {
            if index > 0 {
                println!();
            }
            println!("[{}]", index);
            print_object_tables("", item);
        } else {
            println!("{}", format_value(item));
        }
    }
}

fn is_flat_object(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .values()
            .all(|v| !v.is_object() && !matches!(v, Value::Array(a) if a.iter().any(Value::is_object))),
        _ => false,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
