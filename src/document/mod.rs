/// The decoded output document.
///
/// A [`ReportDocument`] is a plain value: it owns every normalized entity and
/// holds no reference into the archive it was decoded from. Downstream tools
/// consume it through serde (JSON or YAML) or through [`ReportDocument::render_text`].
///
/// # Example
///
/// ```rust,no_run
/// use pbixkit::{DecodeOptions, decode};
///
/// let doc = decode("sales.pbix", &DecodeOptions::default())?;
/// println!("{}", doc.render_text()?);
/// for warning in &doc.warnings {
///     eprintln!("{}", warning);
/// }
/// # Ok::<(), pbixkit::Error>(())
/// ```
pub mod assembler;
pub mod metadata;
mod render;

pub use assembler::assemble;
pub use metadata::Metadata;

use crate::common::{Error, Result, Warning, WarningKind};
use crate::datamodel::DataModel;
use crate::report::Report;
use render::TextWriter;
use serde::{Deserialize, Serialize};

/// Everything decoded from one container, with the diagnostics raised on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub metadata: Metadata,
    pub data_model: DataModel,
    pub report: Report,
    /// Recoverable problems, in a deterministic order
    pub warnings: Vec<Warning>,
}

impl ReportDocument {
    /// True when the decode raised no warning at all.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings of one kind.
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    /// Human-readable report of the whole document.
    pub fn render_text(&self) -> Result<String> {
        let mut writer = TextWriter::new();
        writer.write_summary(self)?;
        writer.write_tables(self)?;
        writer.write_measures(self)?;
        writer.write_queries(self)?;
        writer.write_pages(self)?;
        writer.write_bookmarks(self)?;
        writer.write_custom_visuals(self)?;
        writer.write_warnings(self)?;
        Ok(writer.finish())
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Other(format!("Failed to serialize document to JSON: {}", e)))
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| Error::Other(format!("Failed to serialize document to YAML: {}", e)))
    }
}
