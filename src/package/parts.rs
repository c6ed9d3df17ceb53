//! One-pass materialization of the entries consumed by the normalizers.
//!
//! After [`ContainerParts::collect`] returns, the archive handle is no longer
//! needed: every relevant entry lives in a shared [`Bytes`] buffer that can be
//! handed to a normalizer task without copying.

use crate::common::{Error, Warnings};
use crate::config::DecodeOptions;
use crate::package::{Archive, paths};
use bytes::Bytes;

/// A materialized archive entry.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: String,
    pub data: Bytes,
}

/// Entries feeding the Data Model Normalizer.
#[derive(Debug, Default)]
pub struct DataModelParts {
    pub schema: Option<Entry>,
    pub mashup: Option<Entry>,
    /// The container carries the binary model backup (`DataModel`)
    pub binary_model: bool,
    /// Read failures of the entries above
    pub warnings: Warnings,
}

impl DataModelParts {
    /// True when the container holds no data-model entry at all.
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.mashup.is_none() && !self.binary_model
    }
}

/// Entries feeding the UI Model Normalizer.
#[derive(Debug, Default)]
pub struct ReportParts {
    /// Legacy single-document layout
    pub layout: Option<Entry>,
    /// Folder-based report definition entries, in archive order
    pub definition: Vec<Entry>,
    /// Embedded custom-visual manifests, in archive order
    pub custom_visuals: Vec<Entry>,
    /// Names of every archive entry, used to verify resource references
    pub entry_names: Vec<String>,
    /// Read failures of the entries above
    pub warnings: Warnings,
}

impl ReportParts {
    /// True when the container holds no report entry at all.
    pub fn is_empty(&self) -> bool {
        self.layout.is_none() && self.definition.is_empty() && self.custom_visuals.is_empty()
    }
}

/// Every entry the decoder consumes, split by subsystem.
#[derive(Debug, Default)]
pub struct ContainerParts {
    /// Total number of entries in the archive
    pub entry_count: usize,
    pub version: Option<Entry>,
    pub metadata: Option<Entry>,
    pub data_model: DataModelParts,
    pub report: ReportParts,
    /// Read failures of archive-level entries
    pub warnings: Warnings,
}

impl ContainerParts {
    /// Read all relevant entries from `archive`.
    ///
    /// Absent entries are skipped silently; entries that exist but cannot be
    /// decompressed are recorded as warnings of the owning subsystem.
    pub fn collect(archive: &Archive, options: &DecodeOptions) -> Self {
        let limit = options.max_entry_size;
        let mut parts = ContainerParts {
            entry_count: archive.len(),
            ..Default::default()
        };

        parts.version = read_optional(archive, paths::VERSION, limit, &mut parts.warnings);
        parts.metadata = read_optional(archive, paths::METADATA, limit, &mut parts.warnings);

        if options.include_data_model {
            let warnings = &mut parts.data_model.warnings;
            parts.data_model.schema = read_optional(archive, paths::DATA_MODEL_SCHEMA, limit, warnings);
            // The backup can be hundreds of megabytes; it is never decompressed
            parts.data_model.binary_model = archive.contains(paths::DATA_MODEL);
            if cfg!(feature = "mashup") {
                parts.data_model.mashup = read_optional(archive, paths::DATA_MASHUP, limit, warnings);
            }
        }

        if options.include_report {
            let report = &mut parts.report;
            report.entry_names = archive.entries().to_vec();

            if let Some(name) = archive.find_prefix(paths::LAYOUT_PREFIX) {
                report.layout = read_optional(archive, name, limit, &mut report.warnings);
            } else {
                tracing::debug!("no legacy layout entry");
            }

            let definition: Vec<String> = archive
                .entries_with_prefix(paths::DEFINITION_PREFIX)
                .filter(|name| name.ends_with(".json"))
                .map(str::to_string)
                .collect();
            for name in definition {
                if let Some(entry) = read_optional(archive, &name, limit, &mut report.warnings) {
                    report.definition.push(entry);
                }
            }

            let manifests: Vec<String> = archive
                .entries_with_prefix(paths::CUSTOM_VISUALS_PREFIX)
                .filter(|name| name.ends_with(paths::CUSTOM_VISUAL_MANIFEST))
                .map(str::to_string)
                .collect();
            for name in manifests {
                if let Some(entry) = read_optional(archive, &name, limit, &mut report.warnings) {
                    report.custom_visuals.push(entry);
                }
            }
        }

        parts
    }
}

fn read_optional(archive: &Archive, path: &str, limit: u64, warnings: &mut Warnings) -> Option<Entry> {
    match archive.read_limited(path, limit) {
        Ok(data) => Some(Entry {
            path: path.to_string(),
            data,
        }),
        Err(Error::EntryNotFound(_)) => {
            tracing::debug!(entry = path, "optional entry absent");
            None
        },
        Err(err) => {
            warnings.push_error(path, &err);
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::ContainerBuilder;

    #[test]
    fn test_collect_splits_by_subsystem() {
        let bytes = ContainerBuilder::new()
            .utf16("Version", "1.28")
            .utf16("DataModelSchema", "{\"model\":{\"tables\":[]}}")
            .utf16("Report/Layout", "{\"sections\":[]}")
            .utf8("Report/definition/pages/pages.json", "{\"pageOrder\":[]}")
            .utf8("Report/CustomVisuals/gantt/package.json", "{}")
            .utf8("Report/CustomVisuals/gantt/resources/gantt.js", "x")
            .build();
        let archive = Archive::from_bytes(bytes).unwrap();
        let parts = ContainerParts::collect(&archive, &DecodeOptions::default());

        assert_eq!(parts.entry_count, 6);
        assert!(parts.version.is_some());
        assert!(parts.metadata.is_none());
        assert!(parts.data_model.schema.is_some());
        assert!(!parts.data_model.binary_model);
        assert_eq!(parts.report.layout.as_ref().unwrap().path, "Report/Layout");
        assert_eq!(parts.report.definition.len(), 1);
        assert_eq!(parts.report.custom_visuals.len(), 1);
        assert!(parts.warnings.is_empty());
        assert!(parts.report.warnings.is_empty());
    }

    #[test]
    fn test_collect_respects_toggles() {
        let bytes = ContainerBuilder::new()
            .utf16("DataModelSchema", "{}")
            .utf16("Report/Layout", "{}")
            .build();
        let archive = Archive::from_bytes(bytes).unwrap();

        let parts =
            ContainerParts::collect(&archive, &DecodeOptions::new().with_report(false));
        assert!(parts.report.is_empty());
        assert!(!parts.data_model.is_empty());

        let parts =
            ContainerParts::collect(&archive, &DecodeOptions::new().with_data_model(false));
        assert!(parts.data_model.is_empty());
        assert!(!parts.report.is_empty());
    }

    #[test]
    fn test_collect_notes_binary_model() {
        let bytes = ContainerBuilder::new()
            .bytes("DataModel", vec![0xAB; 1024])
            .build();
        let archive = Archive::from_bytes(bytes).unwrap();

        let parts = ContainerParts::collect(&archive, &DecodeOptions::default());
        assert!(parts.data_model.binary_model);
        assert!(parts.data_model.schema.is_none());
        assert!(!parts.data_model.is_empty());
        assert!(parts.data_model.warnings.is_empty());

        let parts =
            ContainerParts::collect(&archive, &DecodeOptions::new().with_data_model(false));
        assert!(!parts.data_model.binary_model);
    }
}
