//! Lenient readers for loosely-typed JSON values.
//!
//! The API reports numbers as either JSON numbers or numeric strings, and
//! flags as booleans, `0`/`1`, or `"0"`/`"1"`.

use serde_json::Value;

/// Read a number from a JSON number or numeric string.
pub(crate) fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Read a flag; anything unrecognized is `false`.
pub(crate) fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "yes"),
        _ => false,
    }
}

/// Read an optional flag, keeping absence distinct from `false`.
pub(crate) fn optional_flag(value: Option<&Value>) -> Option<bool> {
    match value {
        None | Some(Value::Null) => None,
        other => Some(flag(other)),
    }
}

/// Read text from a JSON string or number. Blank strings are `None`.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
