//! Character encoding utilities for container fragments.
//!
//! Different builds of the producer tool write the same logical entry either
//! as UTF-16LE or as UTF-8, usually without a BOM. This module decides which
//! decodings are worth attempting and performs them with `encoding_rs`.

use crate::common::bom::{BomKind, strip_bom};
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use smallvec::SmallVec;

/// Text encodings a fragment may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    #[inline]
    fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::Utf16Le => UTF_16LE,
            TextEncoding::Utf16Be => UTF_16BE,
        }
    }
}

impl From<BomKind> for TextEncoding {
    fn from(kind: BomKind) -> Self {
        match kind {
            BomKind::Utf8 => TextEncoding::Utf8,
            BomKind::Utf16Le => TextEncoding::Utf16Le,
            BomKind::Utf16Be => TextEncoding::Utf16Be,
        }
    }
}

/// Returns true when the payload could plausibly be UTF-16.
///
/// JSON always contains ASCII punctuation, which in UTF-16 produces NUL bytes.
/// A payload without any NUL byte is therefore never worth decoding as UTF-16.
#[inline]
pub fn may_be_utf16(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes.len() % 2 == 0 && memchr::memchr(0, bytes).is_some()
}

/// Decodings to attempt for `bytes`, most likely first, with the BOM removed.
///
/// A BOM pins the encoding. Without one, UTF-16LE is attempted before UTF-8.
pub fn candidate_encodings(bytes: &[u8]) -> (SmallVec<[TextEncoding; 2]>, &[u8]) {
    let (bom, payload) = strip_bom(bytes);
    let mut candidates = SmallVec::new();
    match bom {
        Some(kind) => candidates.push(kind.into()),
        None => {
            if may_be_utf16(payload) {
                candidates.push(TextEncoding::Utf16Le);
            }
            candidates.push(TextEncoding::Utf8);
        },
    }
    (candidates, payload)
}

/// Decode `bytes` with `encoding`, failing on any malformed sequence.
#[inline]
pub fn decode_strict(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    encoding
        .encoding()
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// Decode a plain-text entry (such as the producer version) leniently.
///
/// Follows the same candidate order as fragments but never fails: if no
/// strict decoding succeeds, a lossy UTF-8 decoding is returned. Trailing NUL
/// characters and surrounding whitespace are removed.
pub fn decode_text_lossy(bytes: &[u8]) -> String {
    let (candidates, payload) = candidate_encodings(bytes);
    let text = candidates
        .iter()
        .find_map(|&encoding| decode_strict(payload, encoding))
        .unwrap_or_else(|| UTF_8.decode_without_bom_handling(payload).0.into_owned());
    text.trim_end_matches('\0').trim().to_string()
}

/// Encode text as UTF-16LE bytes (no BOM), the producer's native entry encoding.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_candidate_first() {
        let bytes = encode_utf16le("{\"a\":1}");
        let (candidates, payload) = candidate_encodings(&bytes);
        assert_eq!(candidates.as_slice(), &[TextEncoding::Utf16Le, TextEncoding::Utf8]);
        assert_eq!(payload.len(), bytes.len());
    }

    #[test]
    fn test_plain_utf8_skips_utf16() {
        let (candidates, _) = candidate_encodings(b"{\"a\":1}");
        assert_eq!(candidates.as_slice(), &[TextEncoding::Utf8]);
    }

    #[test]
    fn test_bom_pins_encoding() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(encode_utf16le("1.28"));
        let (candidates, payload) = candidate_encodings(&bytes);
        assert_eq!(candidates.as_slice(), &[TextEncoding::Utf16Le]);
        assert_eq!(decode_strict(payload, TextEncoding::Utf16Le).unwrap(), "1.28");
    }

    #[test]
    fn test_decode_strict_rejects_odd_utf16() {
        assert!(decode_strict(&[b'a', 0, b'b'], TextEncoding::Utf16Le).is_none());
        assert!(decode_strict(&[0xC3, 0x28], TextEncoding::Utf8).is_none());
    }

    #[test]
    fn test_decode_text_lossy() {
        assert_eq!(decode_text_lossy(&encode_utf16le("3.0\0")), "3.0");
        assert_eq!(decode_text_lossy(b" 1.28\n"), "1.28");
        assert_eq!(decode_text_lossy(b""), "");
    }
}
