use serde_json::{Map, Value};
use std::io;

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout. Values keep full precision.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                write_result_csv(&mut wtr, result);
            } else if let Some(Value::Array(results)) = map.get("results") {
                write_array_csv(&mut wtr, results);
            } else {
                write_fields_csv(&mut wtr, map);
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Per-asset rows when the result has them, one row per slice per series for
/// chart datasets, otherwise a field/value listing.
fn write_result_csv(wtr: &mut StdoutWriter<'_>, result: &Map<String, Value>) {
    if let Some(rows) = result.values().find_map(|v| match v {
        Value::Array(rows) if rows.first().is_some_and(Value::is_object) => Some(rows),
        _ => None,
    }) {
        write_array_csv(wtr, rows);
        return;
    }

    let series: Vec<(&String, &Map<String, Value>)> = result
        .iter()
        .filter_map(|(k, v)| v.as_object().map(|o| (k, o)))
        .collect();
    if !series.is_empty() && series.len() == result.len() {
        write_series_csv(wtr, &series);
        return;
    }

    write_fields_csv(wtr, result);
}

fn write_series_csv(wtr: &mut StdoutWriter<'_>, series: &[(&String, &Map<String, Value>)]) {
    let Some((_, first)) = series.first() else {
        return;
    };
    let columns: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let mut header = vec!["series"];
    header.extend(columns.iter().copied());
    let _ = wtr.write_record(&header);

    for (name, data) in series {
        let len = data
            .values()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        for i in 0..len {
            let mut row = vec![name.to_string()];
            row.extend(columns.iter().map(|c| {
                data.get(*c)
                    .and_then(Value::as_array)
                    .and_then(|col| col.get(i))
                    .map(format_csv_value)
                    .unwrap_or_default()
            }));
            let _ = wtr.write_record(&row);
        }
    }
}

fn write_fields_csv(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
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
