//! Loose, JavaScript-flavoured access to GeoJSON feature properties.
//!
//! Dataset attributes arrive untyped: capacities are sometimes numbers,
//! sometimes numeric strings, and "missing" can mean absent, `null` or `""`.

use serde_json::{Map, Number, Value};

pub type Properties = Map<String, Value>;

/// `false`, `0`, `NaN`, `""` and `null` are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Property value, only if present and truthy.
pub fn truthy<'a>(props: &'a Properties, key: &str) -> Option<&'a Value> {
    props.get(key).filter(|value| is_truthy(value))
}

/// Numeric view of a property. Numeric strings are coerced; anything else
/// (absent, null, non-numeric text) yields `None`.
pub fn number(props: &Properties, key: &str) -> Option<f64> {
    match props.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Text of a property value as it should appear in a popup.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // 330.0 prints as "330", not "330.0"
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => v.to_string(),
        None => n.to_string(),
    }
}
