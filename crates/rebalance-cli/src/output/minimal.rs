use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Print just the key answer: one `name: amount` line per asset for an
/// allocation, `label: before% -> after%` for chart datasets.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for line in minimal_lines(result_obj) {
        println!("{}", line);
    }
}

fn minimal_lines(result: &Value) -> Vec<String> {
    if let Some(Value::Array(lines)) = result.get("allocations") {
        return lines
            .iter()
            .map(|l| {
                format!(
                    "{}: {}",
                    l.get("name").and_then(Value::as_str).unwrap_or_default(),
                    cents(l.get("suggested_contribution"))
                )
            })
            .collect();
    }

    if let (Some(before), Some(after)) = (result.get("before"), result.get("after")) {
        let labels = before
            .get("labels")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        return labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                format!(
                    "{}: {}% -> {}%",
                    label.as_str().unwrap_or_default(),
                    cents(before.get("percentages").and_then(|p| p.get(i))),
                    cents(after.get("percentages").and_then(|p| p.get(i)))
                )
            })
            .collect();
    }

    if let Some(Value::Array(results)) = result.get("results") {
        return results
            .iter()
            .map(|r| format_minimal(r.get("value").unwrap_or(&Value::Null)))
            .collect();
    }

    vec![format_minimal(result)]
}

fn cents(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .and_then(|s| Decimal::from_str(s).ok())
        .map(|d| {
            let rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.2}", rounded)
        })
        .unwrap_or_else(|| value.map(format_minimal).unwrap_or_default())
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allocation_lines() {
        let result = json!({
            "allocations": [
                { "name": "A", "suggested_contribution": "33.3333333" },
                { "name": "B", "suggested_contribution": "66.6666667" }
            ]
        });
        assert_eq!(minimal_lines(&result), vec!["A: 33.33", "B: 66.67"]);
    }

    #[test]
    fn test_chart_lines() {
        let result = json!({
            "before": { "labels": ["A"], "percentages": ["100"] },
            "after": { "labels": ["A"], "percentages": ["100"] }
        });
        assert_eq!(minimal_lines(&result), vec!["A: 100.00% -> 100.00%"]);
    }

    #[test]
    fn test_parse_results() {
        let result = json!({ "results": [{ "text": "1,5", "value": "1.5" }] });
        assert_eq!(minimal_lines(&result), vec!["1.5"]);
    }
}
