//! Unified error types for pbixkit.
//!
//! Only [`Error::ArchiveUnreadable`] (and I/O failures while opening the
//! container) abort a decode. The remaining variants are produced by the
//! lower-level readers and are turned into [`Warning`](crate::common::Warning)
//! values by the normalizers.
use thiserror::Error;

/// Main error type for pbixkit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is corrupt, not a ZIP archive, or uses unsupported compression
    #[error("Archive unreadable: {0}")]
    ArchiveUnreadable(String),

    /// An expected archive entry is absent
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// An entry exists but its bytes could not be decoded into a fragment tree
    #[error("Malformed fragment '{entry}': {reason}")]
    MalformedFragment { entry: String, reason: String },

    /// A reference to a table, column, bookmark or visual that does not exist
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a malformed-fragment error for the given entry.
    pub fn malformed(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedFragment {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Returns true when the error must abort the whole decode.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ArchiveUnreadable(_) | Error::Io(_))
    }
}

/// Result type for pbixkit operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(Error::ArchiveUnreadable("bad".into()).is_fatal());
        assert!(!Error::EntryNotFound("Report/Layout".into()).is_fatal());
        assert!(!Error::malformed("DataModelSchema", "eof").is_fatal());
        assert!(!Error::UnresolvedReference("Ghost".into()).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = Error::malformed("DataModelSchema", "unexpected end of input");
        assert_eq!(
            err.to_string(),
            "Malformed fragment 'DataModelSchema': unexpected end of input"
        );
    }
}
