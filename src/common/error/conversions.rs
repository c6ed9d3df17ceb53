//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from the
//! archive and JSON crates' error types to the unified Error type.

use super::types::Error;

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::EntryNotFound("entry not present in archive".to_string())
            },
            other => Error::ArchiveUnreadable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedFragment {
            entry: String::new(),
            reason: err.to_string(),
        }
    }
}

impl From<crate::common::binary::BinaryError> for Error {
    fn from(err: crate::common::binary::BinaryError) -> Self {
        Error::malformed(String::new(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_error_mapping() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad magic".into()).into();
        assert!(matches!(err, Error::ArchiveUnreadable(_)));

        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::EntryNotFound(_)));
    }

    #[test]
    fn test_json_error_mapping() {
        let json_err = serde_json::from_str::<serde_json::Value>("{\"a\":").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::MalformedFragment { .. }));
    }
}
