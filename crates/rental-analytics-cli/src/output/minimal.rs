use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object. Composite
/// analyses answer with the score's rating; single-operation outputs
/// answer with their headline number.
pub fn print_minimal(value: &Value) {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Composite analysis: rating plus normalized score
    if let Some(score) = result_obj.get("score") {
        let rating = score.get("rating").and_then(Value::as_str);
        let normalized = score.get("normalized_score");
        if let (Some(rating), Some(normalized)) = (rating, normalized) {
            println!("{} ({}/10)", rating, format_minimal(normalized));
            return;
        }
    }

    // Priority list of key output fields
    let priority_keys = [
        "normalized_score",
        "net_monthly_cashflow",
        "monthly_capex",
        "annual_rate_percent",
        "annualized_roi_on_equity",
        "future_value",
        "monthly_payment",
        "cap_rate",
    ];

    if let Value::Object(map) = result_obj {
        // Try priority keys first (skip null values)
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Not an object, just print directly
    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
