/// Container-level metadata and summary counts.
///
/// Producer information comes from the `Version` and `Metadata` entries;
/// the counts are computed from the normalized sub-models.
use crate::common::encoding::decode_text_lossy;
use crate::common::{Result, Warnings};
use crate::datamodel::{CalculationKind, DataModel};
use crate::fragment::Fragment;
use crate::fragment::access::{first_str, get_path};
use crate::package::Entry;
use crate::report::Report;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Producer information and summary of a decoded container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Producer version string (`Version` entry, else `Metadata.Version`)
    pub version: Option<String>,
    /// Producer release, e.g. `2023.05`
    pub release: Option<String>,
    /// Producer application that created the container
    pub created_from: Option<String>,
    /// Number of entries in the archive
    pub entry_count: usize,
    pub page_count: usize,
    pub visual_count: usize,
    pub table_count: usize,
    pub column_count: usize,
    pub measure_count: usize,
    pub relationship_count: usize,
    pub bookmark_count: usize,
    pub custom_visual_count: usize,
    /// Visual count per resolved category label
    pub visual_types: BTreeMap<String, usize>,
    /// Sum of table row counts, when recorded by the producer
    pub total_rows: Option<u64>,
    /// The model is only available as the undecoded binary backup
    #[serde(default)]
    pub binary_data_model: bool,
}

impl Metadata {
    /// Read producer information from the archive-level entries.
    ///
    /// A malformed `Metadata` entry is recorded in `warnings`; the `Version`
    /// entry is plain text and never fails.
    pub fn read(version: Option<&Entry>, metadata: Option<&Entry>, warnings: &mut Warnings) -> Self {
        let mut out = Metadata::default();
        out.version = version
            .map(|entry| decode_text_lossy(&entry.data))
            .filter(|v| !v.is_empty());

        if let Some(entry) = metadata {
            match Fragment::from_entry(entry) {
                Ok(fragment) => {
                    let value = &fragment.value;
                    if out.version.is_none() {
                        out.version = get_path(value, "Version").and_then(scalar_text);
                    }
                    out.release = first_str(value, &["CreatedFromRelease"]).map(str::to_string);
                    out.created_from = first_str(value, &["CreatedFrom"]).map(str::to_string);
                },
                Err(err) => warnings.push_error(&entry.path, &err),
            }
        }
        out
    }

    /// Fill in the counts derived from the normalized sub-models.
    pub fn summarize(&mut self, data_model: &DataModel, report: &Report) {
        self.page_count = report.pages.len();
        self.visual_count = report.visual_count();
        self.table_count = data_model.tables.len();
        self.column_count = data_model.column_count();
        self.measure_count = data_model.calculations_of(CalculationKind::Measure).count();
        self.relationship_count = data_model.relationships.len();
        self.bookmark_count = report.bookmarks.len();
        self.custom_visual_count = report.custom_visuals.len();
        self.total_rows = data_model.total_rows();

        self.visual_types.clear();
        for visual in report.visuals() {
            *self
                .visual_types
                .entry(visual.category.label().to_string())
                .or_default() += 1;
        }
    }

    /// True when the container carried any producer information.
    pub fn has_producer_info(&self) -> bool {
        self.version.is_some() || self.release.is_some() || self.created_from.is_some()
    }

    /// Serialize the metadata as a YAML block.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).map_err(|e| {
            crate::common::Error::Other(format!("Failed to serialize metadata to YAML: {}", e))
        })
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::WarningKind;
    use crate::common::encoding::encode_utf16le;
    use bytes::Bytes;

    fn entry(path: &str, text: &str) -> Entry {
        Entry {
            path: path.to_string(),
            data: Bytes::from(encode_utf16le(text)),
        }
    }

    #[test]
    fn test_version_entry_wins() {
        let version = entry("Version", "1.28");
        let metadata = entry(
            "Metadata",
            r#"{"Version":5,"CreatedFrom":"Cloud","CreatedFromRelease":"2023.05"}"#,
        );
        let mut warnings = Warnings::new();
        let meta = Metadata::read(Some(&version), Some(&metadata), &mut warnings);
        assert_eq!(meta.version.as_deref(), Some("1.28"));
        assert_eq!(meta.release.as_deref(), Some("2023.05"));
        assert_eq!(meta.created_from.as_deref(), Some("Cloud"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_version_from_metadata() {
        let metadata = entry("Metadata", r#"{"Version":4}"#);
        let mut warnings = Warnings::new();
        let meta = Metadata::read(None, Some(&metadata), &mut warnings);
        assert_eq!(meta.version.as_deref(), Some("4"));
        assert!(meta.has_producer_info());
    }

    #[test]
    fn test_malformed_metadata() {
        let metadata = entry("Metadata", "{\"Version\":");
        let mut warnings = Warnings::new();
        let meta = Metadata::read(None, Some(&metadata), &mut warnings);
        assert!(!meta.has_producer_info());
        assert_eq!(warnings.count(WarningKind::MalformedFragment), 1);
    }

    #[test]
    fn test_to_yaml() {
        let meta = Metadata {
            version: Some("3.0".into()),
            page_count: 2,
            ..Default::default()
        };
        let yaml = meta.to_yaml().unwrap();
        assert!(yaml.contains("version: "));
        assert!(yaml.contains("page_count: 2"));
    }
}
