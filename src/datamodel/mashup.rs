//! Embedded query package (`DataMashup`).
//!
//! The entry starts with a little-endian `u32` format version followed by a
//! length-prefixed block holding a nested ZIP archive (the "package parts").
//! The queries live in `Formulas/Section1.m` inside that nested archive as a
//! section document:
//!
//! ```text
//! section Section1;
//!
//! shared Sales = let Source = Sql.Database("srv", "db") in Source;
//! shared #"Date Table" = ...;
//! ```

use crate::common::binary::{read_length_prefixed, read_u32_le};
use crate::common::encoding::decode_text_lossy;
use crate::common::{Error, Result};
use crate::package::archive::read_capped;
use crate::package::paths;
use memchr::memmem;
use std::io::Cursor;
use zip::ZipArchive;

/// A `shared` query of the section document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedQuery {
    pub name: String,
    pub script: String,
}

/// Extract the section document from a `DataMashup` entry.
///
/// `limit` caps the decompressed size of the section document.
pub fn read_section(data: &[u8], limit: u64) -> Result<String> {
    let version = read_u32_le(data, 0).map_err(Error::from)?;
    if version != 0 {
        tracing::debug!(version, "unexpected query package version");
    }
    let (package, _) = read_length_prefixed(data, 4).map_err(Error::from)?;

    let mut zip = ZipArchive::new(Cursor::new(package))
        .map_err(|e| Error::malformed(paths::DATA_MASHUP, e.to_string()))?;
    let file = zip.by_name(paths::MASHUP_SECTION).map_err(|e| {
        Error::malformed(
            paths::DATA_MASHUP,
            format!("{}: {}", paths::MASHUP_SECTION, e),
        )
    })?;
    let declared = file.size();
    let bytes = read_capped(file, declared, limit, paths::DATA_MASHUP)?;
    Ok(decode_text_lossy(&bytes))
}

/// Read the shared queries of a `DataMashup` entry, in document order.
pub fn read_queries(data: &[u8], limit: u64) -> Result<Vec<SharedQuery>> {
    let section = read_section(data, limit)?;
    Ok(parse_section(&section))
}

/// Split a section document into its `shared` members.
pub fn parse_section(section: &str) -> Vec<SharedQuery> {
    let bytes = section.as_bytes();
    let starts: Vec<usize> = memmem::find_iter(bytes, b"shared ")
        .filter(|&at| at == 0 || matches!(bytes[at - 1], b'\n' | b'\r' | b';' | b' ' | b'\t'))
        .collect();

    let mut queries = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(section.len());
        let member = &section[start + "shared ".len()..end];
        let Some((name, body)) = member.split_once('=') else {
            continue;
        };
        let name = unquote_identifier(name.trim());
        if name.is_empty() {
            continue;
        }
        let script = body.trim().trim_end_matches(';').trim_end().to_string();
        queries.push(SharedQuery { name, script });
    }
    queries
}

/// `#"Date Table"` yields `Date Table`; plain identifiers are returned as is.
fn unquote_identifier(raw: &str) -> String {
    match raw.strip_prefix("#\"").and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => raw.to_string(),
    }
}
