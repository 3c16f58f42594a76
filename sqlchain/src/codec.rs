//! Rendering of values as SQL literal text or bound parameters

use crate::Value;

/// Escape a string for embedding between single quotes, using the escape
/// sequences MySQL understands.
///
/// Backslashes, both quote characters, NUL, newline, carriage return, tab,
/// backspace and Ctrl-Z are escaped; everything else passes through raw.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out
}

/// Escape and wrap in single quotes
pub fn quote(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Shortest decimal text that round-trips, never in exponent form
pub fn format_float(f: f64) -> String {
    if f.is_finite() {
        format!("{f}")
    } else {
        "null".to_string()
    }
}

fn format_float32(f: f32) -> String {
    if f.is_finite() {
        format!("{f}")
    } else {
        "null".to_string()
    }
}

/// Render a value as an inline SQL literal
///
/// # Examples
/// ```
/// use sqlchain::{codec, Value};
///
/// assert_eq!(codec::to_literal(&Value::from(18)), "18");
/// assert_eq!(codec::to_literal(&Value::from("O'Brien")), "'O\\'Brien'");
/// ```
pub fn to_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::F32(f) => format_float32(*f),
        Value::F64(f) => format_float(*f),
        Value::String(s) => quote(s),
        Value::Bytes(b) => quote(&String::from_utf8_lossy(b)),
        Value::Json(_) | Value::Array(_) => quote(&value.to_json().to_string()),
    }
}

/// Prepare a value for placeholder binding. Structured values travel as
/// their JSON text; the driver escapes everything else.
pub fn to_bound_param(value: Value) -> Value {
    match value {
        Value::Json(_) | Value::Array(_) => Value::String(value.to_json().to_string()),
        other => other,
    }
}

/// Comma-joined literal list for IN / NOT IN
pub fn implode(values: &[Value]) -> String {
    values.iter().map(to_literal).collect::<Vec<_>>().join(",")
}
