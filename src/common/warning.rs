//! Non-fatal diagnostics collected during a decode.
//!
//! Every recoverable condition (missing referenced entry, malformed fragment,
//! unrecognized shape, dangling reference, duplicate name) is captured as a
//! [`Warning`] and attached to the output document. Each normalizer owns its
//! own [`Warnings`] buffer; buffers are concatenated in a fixed order by the
//! assembler so the final list is deterministic.

use crate::common::Error;
use serde::{Deserialize, Serialize};

/// Category of a recorded warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// A referenced entry is absent from the archive
    EntryNotFound,
    /// An entry or nested blob could not be decoded
    MalformedFragment,
    /// A fragment matched none of the known shapes
    UnrecognizedShape,
    /// A relationship endpoint, bookmark, or trigger visual does not exist
    UnresolvedReference,
    /// A name collided with an earlier one and was disambiguated
    DuplicateName,
    /// An entry is stored in a format this crate does not decode
    UnsupportedEncoding,
}

impl WarningKind {
    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            WarningKind::EntryNotFound => "entry not found",
            WarningKind::MalformedFragment => "malformed fragment",
            WarningKind::UnrecognizedShape => "unrecognized shape",
            WarningKind::UnresolvedReference => "unresolved reference",
            WarningKind::DuplicateName => "duplicate name",
            WarningKind::UnsupportedEncoding => "unsupported encoding",
        }
    }
}

/// A single diagnostic attached to the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Archive entry (or entry-relative location) the warning refers to
    pub entry: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "[{}] {}: {}", self.kind.label(), entry, self.message),
            None => write!(f, "[{}] {}", self.kind.label(), self.message),
        }
    }
}

/// Append-only warning buffer owned by one normalizer task.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and mirror it to the log.
    pub fn push(&mut self, kind: WarningKind, entry: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind = kind.label(), entry = entry.unwrap_or(""), "{}", message);
        self.items.push(Warning {
            kind,
            entry: entry.map(str::to_string),
            message,
        });
    }

    /// Record a recoverable error raised while reading `entry`.
    pub fn push_error(&mut self, entry: &str, err: &Error) {
        let (kind, message) = match err {
            Error::EntryNotFound(what) => (WarningKind::EntryNotFound, what.clone()),
            Error::MalformedFragment { reason, .. } => {
                (WarningKind::MalformedFragment, reason.clone())
            },
            Error::UnresolvedReference(what) => (WarningKind::UnresolvedReference, what.clone()),
            other => (WarningKind::MalformedFragment, other.to_string()),
        };
        let entry = match err {
            Error::MalformedFragment { entry: inner, .. } if !inner.is_empty() => inner.as_str(),
            _ => entry,
        };
        self.push(kind, Some(entry), message);
    }

    /// Move all warnings of `other` to the end of this buffer.
    pub fn append(&mut self, other: &mut Warnings) {
        self.items.append(&mut other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.items.iter()
    }

    /// Number of warnings of the given kind.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.items.iter().filter(|w| w.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}

/// A possibly partial result together with the warnings raised producing it.
#[derive(Debug, Clone, Default)]
pub struct Partial<T> {
    pub value: T,
    pub warnings: Warnings,
}

impl<T> Partial<T> {
    pub fn new(value: T, warnings: Warnings) -> Self {
        Self { value, warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_order() {
        let mut warnings = Warnings::new();
        warnings.push(WarningKind::DuplicateName, Some("DataModelSchema"), "Sales[Total]");
        warnings.push(WarningKind::UnresolvedReference, None, "Ghost");
        assert_eq!(warnings.len(), 2);
        let items = warnings.into_vec();
        assert_eq!(items[0].kind, WarningKind::DuplicateName);
        assert_eq!(items[1].entry, None);
    }

    #[test]
    fn test_push_error_prefers_inner_entry() {
        let mut warnings = Warnings::new();
        warnings.push_error("Report/Layout", &Error::malformed("Report/Layout#config", "eof"));
        warnings.push_error("Metadata", &Error::EntryNotFound("Metadata".into()));
        let items = warnings.into_vec();
        assert_eq!(items[0].entry.as_deref(), Some("Report/Layout#config"));
        assert_eq!(items[0].kind, WarningKind::MalformedFragment);
        assert_eq!(items[1].kind, WarningKind::EntryNotFound);
    }

    #[test]
    fn test_append_keeps_order() {
        let mut first = Warnings::new();
        first.push(WarningKind::MalformedFragment, None, "a");
        let mut second = Warnings::new();
        second.push(WarningKind::MalformedFragment, None, "b");
        first.append(&mut second);
        assert!(second.is_empty());
        let messages: Vec<_> = first.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(messages, ["a", "b"]);
        assert_eq!(first.count(WarningKind::MalformedFragment), 2);
    }

    #[test]
    fn test_display() {
        let warning = Warning {
            kind: WarningKind::UnresolvedReference,
            entry: Some("DataModelSchema".into()),
            message: "table 'Ghost'".into(),
        };
        assert_eq!(
            warning.to_string(),
            "[unresolved reference] DataModelSchema: table 'Ghost'"
        );
    }
}
