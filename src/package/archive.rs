//! Random-access, read-only view of a report container.
//!
//! The container is a ZIP archive. The whole file is held in one shared
//! [`Bytes`] buffer; entries are decompressed on demand. The ZIP reader needs
//! `&mut` access to seek, so it sits behind a mutex, which makes the archive
//! handle safe to share between normalizer tasks.

use crate::common::{Error, Result};
use crate::config::DEFAULT_MAX_ENTRY_SIZE;
use crate::package::paths;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// Upper bound for the up-front allocation of a single entry buffer.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Read-only handle to an opened container.
pub struct Archive {
    /// Display name of the source (file path or `<bytes>`)
    source: String,
    /// Entry names in archive order, directories excluded
    entries: Vec<String>,
    /// Entry name to ZIP index
    index: HashMap<String, usize>,
    /// The underlying ZIP reader over the shared buffer
    reader: Mutex<ZipArchive<Cursor<Bytes>>>,
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("source", &self.source)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Archive {
    /// Open a container from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveUnreadable`] if the file cannot be read or is not
    /// a ZIP archive with a supported layout.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::ArchiveUnreadable(format!("{}: {}", path.display(), e)))?;
        Self::with_source(Bytes::from(data), path.display().to_string())
    }

    /// Open a container from an in-memory buffer.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        Self::with_source(data.into(), "<bytes>".to_string())
    }

    /// Open a container from any reader. The reader is consumed to the end.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| Error::ArchiveUnreadable(e.to_string()))?;
        Self::from_bytes(data)
    }

    fn with_source(data: Bytes, source: String) -> Result<Self> {
        let zip = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::ArchiveUnreadable(format!("{}: {}", source, e)))?;

        let mut entries = Vec::with_capacity(zip.len());
        let mut index = HashMap::with_capacity(zip.len());
        for zip_index in 0..zip.len() {
            let Some(name) = zip.name_for_index(zip_index) else {
                continue;
            };
            // Directory records
            if name.ends_with('/') {
                continue;
            }
            index.insert(paths::normalize(name), zip_index);
            entries.push(name.to_string());
        }

        tracing::debug!(source = %source, entries = entries.len(), "opened container");
        Ok(Self {
            source,
            entries,
            index,
            reader: Mutex::new(zip),
        })
    }

    /// Display name of the container source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All entry names, in archive order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of (non-directory) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if an entry exists.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(&paths::normalize(path))
    }

    /// Entries whose name starts with `prefix`, in archive order.
    pub fn entries_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .map(String::as_str)
            .filter(move |name| name.starts_with(prefix))
    }

    /// First entry (in archive order) whose name starts with `prefix`.
    pub fn find_prefix<'a>(&'a self, prefix: &'a str) -> Option<&'a str> {
        self.entries_with_prefix(prefix).next()
    }

    /// Read an entry by exact logical path, with the default size limit.
    ///
    /// # Errors
    ///
    /// [`Error::EntryNotFound`] if the entry is absent; [`Error::MalformedFragment`]
    /// if the entry exists but cannot be decompressed or is too large.
    pub fn read(&self, path: &str) -> Result<Bytes> {
        self.read_limited(path, DEFAULT_MAX_ENTRY_SIZE)
    }

    /// Read an entry, refusing to decompress more than `limit` bytes.
    pub fn read_limited(&self, path: &str, limit: u64) -> Result<Bytes> {
        let key = paths::normalize(path);
        let zip_index = *self
            .index
            .get(&key)
            .ok_or_else(|| Error::EntryNotFound(key.clone()))?;

        let mut zip = self.reader.lock();
        let file = zip
            .by_index(zip_index)
            .map_err(|e| Error::malformed(key.as_str(), e.to_string()))?;
        let declared = file.size();
        read_capped(file, declared, limit, &key).map(Bytes::from)
    }

    /// Read the first entry whose path starts with `prefix`.
    ///
    /// Returns the matched entry name together with its bytes.
    pub fn read_prefix(&self, prefix: &str) -> Result<(String, Bytes)> {
        let prefix = paths::normalize(prefix);
        let name = self
            .find_prefix(&prefix)
            .ok_or_else(|| Error::EntryNotFound(format!("{}*", prefix)))?
            .to_string();
        let data = self.read(&name)?;
        Ok((name, data))
    }
}

/// Read `reader` to the end, failing once more than `limit` bytes come out.
///
/// The declared size only sizes the initial buffer; it is not trusted.
pub(crate) fn read_capped<R: Read>(reader: R, declared: u64, limit: u64, entry: &str) -> Result<Vec<u8>> {
    let too_large = || Error::malformed(entry, format!("entry exceeds the {} byte limit", limit));
    if declared > limit {
        return Err(too_large());
    }
    let mut data = Vec::with_capacity(declared.min(MAX_PREALLOCATION) as usize);
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut data)
        .map_err(|e| Error::malformed(entry, e.to_string()))?;
    if data.len() as u64 > limit {
        return Err(too_large());
    }
    Ok(data)
}
