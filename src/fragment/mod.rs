//! Fragment Decoder.
//!
//! Turns raw entry bytes into a generic JSON tree. Producer builds disagree on
//! the encoding of the same logical entry, so decoding walks the candidate
//! encodings from [`candidate_encodings`] and keeps the first one that yields
//! valid JSON.
//!
//! Some string values are themselves JSON documents (visual configuration,
//! filters, the layout's root `config`). Those are never decoded eagerly:
//! callers that know a field is double-encoded call [`decode_nested`].

pub mod access;

use crate::common::encoding::{candidate_encodings, decode_strict};
use crate::common::{Error, Result};
use crate::package::Entry;
use serde_json::Value;

/// A decoded archive entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Entry path the fragment was decoded from
    pub path: String,
    pub value: Value,
}

impl Fragment {
    /// Decode a materialized archive entry.
    ///
    /// Decoding errors carry the entry path.
    pub fn from_entry(entry: &Entry) -> Result<Self> {
        let value = decode(&entry.data).map_err(|err| with_entry(err, &entry.path))?;
        Ok(Self {
            path: entry.path.clone(),
            value,
        })
    }
}

/// Decode raw entry bytes into a JSON tree.
///
/// # Errors
///
/// Returns [`Error::MalformedFragment`] (with an empty entry name) when no
/// candidate encoding produces valid JSON.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let (candidates, payload) = candidate_encodings(bytes);
    let mut last_reason = String::from("empty fragment");

    for encoding in candidates {
        let Some(text) = decode_strict(payload, encoding) else {
            last_reason = format!("not valid {:?} text", encoding);
            continue;
        };
        let text = clean(&text);
        if text.is_empty() {
            last_reason = String::from("empty fragment");
            continue;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => return Ok(value),
            Err(err) => last_reason = err.to_string(),
        }
    }

    Err(Error::malformed("", last_reason))
}

/// Decode one level of JSON-within-string encoding.
///
/// Strings are parsed as JSON; objects and arrays are returned as they are,
/// since newer producers store some of these blobs inline.
///
/// # Errors
///
/// Returns [`Error::MalformedFragment`] for strings that are not JSON and for
/// scalar values.
pub fn decode_nested(value: &Value) -> Result<Value> {
    match value {
        Value::String(text) => {
            let text = clean(text);
            serde_json::from_str(text).map_err(|err| Error::malformed("", err.to_string()))
        },
        Value::Object(_) | Value::Array(_) => Ok(value.clone()),
        other => Err(Error::malformed(
            "",
            format!("expected an encoded document, found {}", kind_of(other)),
        )),
    }
}

/// Decode the double-encoded field `key` of `value`, if present.
///
/// Returns `Ok(None)` when the field is absent or null.
pub fn decode_nested_field(value: &Value, key: &str) -> Result<Option<Value>> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(field) => decode_nested(field).map(Some),
    }
}

/// Attach `entry` to an error raised without one.
pub(crate) fn with_entry(err: Error, entry: &str) -> Error {
    match err {
        Error::MalformedFragment { entry: inner, reason } if inner.is_empty() => {
            Error::malformed(entry, reason)
        },
        other => other,
    }
}

/// Strip a decoded BOM character, trailing NULs and surrounding whitespace.
fn clean(text: &str) -> &str {
    text.trim_start_matches('\u{feff}')
        .trim_end_matches('\0')
        .trim()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::bom::UTF8_BOM;
    use crate::common::encoding::encode_utf16le;
    use serde_json::json;

    #[test]
    fn test_decode_utf16le() {
        let bytes = encode_utf16le("{\"sections\":[{\"name\":\"Ä\"}]}");
        let value = decode(&bytes).unwrap();
        assert_eq!(value["sections"][0]["name"], "Ä");
    }

    #[test]
    fn test_decode_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(encode_utf16le("{\"a\":1}"));
        assert_eq!(decode(&bytes).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_decode_utf8_fallback() {
        assert_eq!(decode(b"{\"a\": [1, 2]}").unwrap(), json!({"a": [1, 2]}));

        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"  {\"b\": true}\n");
        assert_eq!(decode(&bytes).unwrap(), json!({"b": true}));
    }

    #[test]
    fn test_decode_trailing_nul() {
        let mut bytes = encode_utf16le("{\"v\":\"3.0\"}");
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(decode(&bytes).unwrap(), json!({"v": "3.0"}));
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = encode_utf16le("{\"model\":{\"tables\":[");
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedFragment { .. }));

        assert!(decode(b"").is_err());
        assert!(decode(&[0xC3, 0x28]).is_err());
    }

    #[test]
    fn test_decode_nested_is_lazy() {
        let value = decode(b"{\"config\":\"{\\\"name\\\":\\\"v1\\\"}\",\"title\":\"{not json\"}")
            .unwrap();
        // Strings stay strings until asked for
        assert!(value["config"].is_string());

        let config = decode_nested(&value["config"]).unwrap();
        assert_eq!(config["name"], "v1");
        assert!(decode_nested(&value["title"]).is_err());
    }

    #[test]
    fn test_decode_nested_passthrough() {
        let inline = json!({"name": "v1"});
        assert_eq!(decode_nested(&inline).unwrap(), inline);
        assert!(decode_nested(&json!(42)).is_err());

        let holder = json!({"filters": "[]", "empty": null});
        assert_eq!(decode_nested_field(&holder, "filters").unwrap(), Some(json!([])));
        assert_eq!(decode_nested_field(&holder, "empty").unwrap(), None);
        assert_eq!(decode_nested_field(&holder, "missing").unwrap(), None);
    }

    #[test]
    fn test_from_entry_names_the_entry() {
        let entry = Entry {
            path: "DataModelSchema".to_string(),
            data: bytes::Bytes::from_static(b"{\"model\":"),
        };
        match Fragment::from_entry(&entry).unwrap_err() {
            Error::MalformedFragment { entry, .. } => assert_eq!(entry, "DataModelSchema"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
