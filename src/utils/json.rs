use serde_json::{Map, Value};

/// Whether a JSON value counts as "supplied" in a partial update.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Copies every truthy entry of `update` over `target`, leaving other keys untouched.
pub fn overlay_truthy(target: &mut Map<String, Value>, update: Map<String, Value>) {
    for (key, value) in update {
        if is_truthy(&value) {
            target.insert(key, value);
        }
    }
}
