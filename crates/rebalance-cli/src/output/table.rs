use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Amounts inside a `result` envelope are shown rounded to 2 decimal places;
/// the full-precision values remain available through `--output json`.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_tables(result, map);
            } else if let Some(Value::Array(results)) = map.get("results") {
                print_rows(results, false);
            } else {
                print_fields(map, false);
            }
        }
        Value::Array(arr) => print_rows(arr, false),
        _ => println!("{}", value),
    }
}

fn print_result_tables(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        println!("{}", format_cell(result, false));
        return;
    };

    // Row tables (per-asset lines) first, then column tables (chart datasets),
    // then the remaining scalar fields as a summary.
    let mut scalars = Map::new();
    for (key, val) in res_map {
        match val {
            Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
                println!("{}", title(key));
                print_rows(rows, true);
                println!();
            }
            Value::Object(columns) if is_column_set(columns) => {
                println!("{}", title(key));
                print_columns(columns);
                println!();
            }
            _ => {
                scalars.insert(key.clone(), val.clone());
            }
        }
    }
    if !scalars.is_empty() {
        print_fields(&scalars, true);
    }

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

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>, round: bool) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_cell(val, rounds(key, round))]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value], round: bool) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

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
                            .map(|v| format_cell(v, rounds(h, round)))
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_cell(item, round));
        }
    }
}

/// An object whose fields are parallel arrays, e.g. a pie dataset.
fn is_column_set(map: &Map<String, Value>) -> bool {
    let mut lengths = map.values().map(|v| v.as_array().map(Vec::len));
    match lengths.next() {
        Some(Some(len)) => lengths.all(|l| l == Some(len)),
        _ => false,
    }
}

fn print_columns(columns: &Map<String, Value>) {
    let headers: Vec<String> = columns.keys().cloned().collect();
    let len = columns
        .values()
        .next()
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for i in 0..len {
        let row: Vec<String> = headers
            .iter()
            .map(|h| {
                columns
                    .get(h.as_str())
                    .and_then(Value::as_array)
                    .and_then(|col| col.get(i))
                    .map(|v| format_cell(v, rounds(h, true)))
                    .unwrap_or_default()
            })
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Labels stay verbatim even when they look like numbers.
fn rounds(key: &str, round: bool) -> bool {
    round && !matches!(key, "name" | "labels" | "colors" | "text")
}

fn format_cell(value: &Value, round: bool) -> String {
    match value {
        Value::String(s) if round => round_amount(s).unwrap_or_else(|| s.clone()),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(|v| format_cell(v, round)).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Decimal strings are rounded half away from zero to cents; anything else is left alone.
fn round_amount(s: &str) -> Option<String> {
    let d = Decimal::from_str(s).ok()?;
    let cents = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Some(format!("{:.2}", cents))
}
