//! Lenient accessors over decoded fragment trees.
//!
//! Fragments drift between producer versions: numbers turn into numeric
//! strings, strings into arrays of lines, keys move one level down. These
//! helpers absorb that drift so the normalizers can read fields without
//! matching on `Value` everywhere.

use serde_json::Value;

/// Look up a dotted path such as `singleVisual.visualType`.
///
/// Each segment is an object key; a segment made of digits also indexes arrays.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// True when `path` resolves to a non-null value.
#[inline]
pub fn has_path(value: &Value, path: &str) -> bool {
    !matches!(get_path(value, path), None | Some(Value::Null))
}

/// String at `path`.
#[inline]
pub fn str_at<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    get_path(value, path)?.as_str()
}

/// First non-empty string found among several key spellings.
pub fn first_str<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a str> {
    paths
        .iter()
        .filter_map(|path| str_at(value, path))
        .find(|s| !s.is_empty())
}

/// Number at `path`; numeric strings are accepted.
pub fn f64_at(value: &Value, path: &str) -> Option<f64> {
    as_f64(get_path(value, path)?)
}

/// Interpret a scalar as a number.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer at `path`; floats are truncated and numeric strings accepted.
pub fn i64_at(value: &Value, path: &str) -> Option<i64> {
    match get_path(value, path)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean at `path`; `"true"`/`"false"` strings and 0/1 numbers are accepted.
pub fn bool_at(value: &Value, path: &str) -> Option<bool> {
    match get_path(value, path)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Array at `path`, or an empty slice.
pub fn array_at<'a>(value: &'a Value, path: &str) -> &'a [Value] {
    get_path(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Formula or script text stored either as a string or an array of lines.
pub fn text_or_lines(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => {
            let lines: Vec<&str> = lines.iter().filter_map(Value::as_str).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        },
        _ => None,
    }
}

/// Unwrap a property literal: `{"expr":{"Literal":{"Value":"'text'"}}}` yields `text`.
///
/// Single-quoted string literals lose their quotes (and `''` escapes collapse);
/// other literals (numbers, booleans) are returned as written.
pub fn literal_string(property: &Value) -> Option<String> {
    let raw = str_at(property, "expr.Literal.Value")?;
    Some(unquote(raw))
}

fn unquote(raw: &str) -> String {
    match raw.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => raw.to_string(),
    }
}
