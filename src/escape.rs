//! HTML-escaping of JSON string leaves: request values are escaped on capture,
//! response data is decoded back before serialization.

use serde_json::{Map, Value};

/// Escape HTML special characters in a string (quote-inclusive, like
/// htmlspecialchars with ENT_QUOTES).
pub fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Undo `escape_str`. Entity order matters: `&amp;` last so double-escaped
/// input is only unwrapped one level.
pub fn unescape_str(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Recursively trim and escape every string leaf in a Value (objects and
/// arrays descended; other leaves untouched).
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(s) => *s = escape_str(s.trim()),
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                sanitize_value(v);
            }
        }
        Value::Object(map) => sanitize_map(map),
        _ => {}
    }
}

/// Recursively sanitize all values of a JSON object (in place).
pub fn sanitize_map(map: &mut Map<String, Value>) {
    for (_, v) in map.iter_mut() {
        sanitize_value(v);
    }
}

/// Recursively decode escaped string leaves in a Value (in place).
pub fn unescape_value(value: &mut Value) {
    match value {
        Value::String(s) => *s = unescape_str(s),
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                unescape_value(v);
            }
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                unescape_value(v);
            }
        }
        _ => {}
    }
}
