use serde_json::{Map, Value};

/// Free-form attribute map attached to catalog records.
///
/// Headers carry `custom`, descriptors carry `type_descriptor`, events carry
/// `data`, and configuration snapshots carry `config_params`. The catalog
/// never interprets these maps; they are stored and returned verbatim.
pub type AttrMap = Map<String, Value>;

/// Parses an attribute map from a JSON text.
///
/// The text must be a JSON object; any other JSON value is rejected with a
/// data error so callers at loose boundaries (CLI flags, config files) get a
/// usable message instead of a silently mangled record.
pub fn parse_attrs(text: &str) -> Result<AttrMap, serde_json::Error> {
    use serde::de::Error;

    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(serde_json::Error::custom(format!(
            "expected a JSON object, got {}",
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
