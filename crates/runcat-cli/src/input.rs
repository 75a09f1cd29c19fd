//! Loose input parsing for command arguments.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Parses an RFC 3339 timestamp argument.
pub fn parse_time(text: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    let parsed = DateTime::parse_from_rfc3339(text)
        .map_err(|e| format!("invalid timestamp '{}': {}", text, e))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Shapes a time-constraint argument as the loose JSON the catalog accepts:
/// `T1..T2` becomes an interval object, a comma-separated list becomes a
/// list of instants, and anything else stays a scalar. Instants themselves
/// are validated downstream.
pub fn parse_time_expr(text: &str) -> Value {
    if let Some((start, end)) = text.split_once("..") {
        return json!({
            "start": instant_value(start),
            "end": instant_value(end),
        });
    }
    if text.contains(',') {
        let items: Vec<Value> = text.split(',').map(instant_value).collect();
        return Value::Array(items);
    }
    instant_value(text)
}

/// A bare integer is taken as epoch microseconds, anything else as text.
fn instant_value(text: &str) -> Value {
    let text = text.trim();
    match text.parse::<i64>() {
        Ok(micros) => json!(micros),
        Err(_) => json!(text),
    }
}
