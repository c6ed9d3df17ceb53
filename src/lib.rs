//! pbixkit - decoder and model normalizer for Power BI report containers
//!
//! A report container (`.pbix` / `.pbit`) is a ZIP archive of JSON fragments
//! describing a tabular data model and a report layer. Their shapes drift
//! between producer versions. This crate reads the archive, classifies each
//! fragment by the keys it carries, and normalizes everything into one
//! [`ReportDocument`] value with a list of warnings for whatever could not be
//! read.
//!
//! # Features
//!
//! - **Tolerant decoding**: UTF-16 and UTF-8 fragments, double-encoded
//!   configuration strings, unknown shapes and visual types
//! - **Data model**: tables, columns, relationships, measures, calculated
//!   columns and tables, query scripts with source classification
//! - **Report layer**: pages, visuals with geometry, bound fields, text and
//!   actions, bookmarks and groups, custom visuals, for both the legacy
//!   single-document layout and the folder-based definition
//! - **Parallel**: the two sub-models are normalized concurrently and large
//!   reports are processed page by page on the rayon pool
//!
//! # Example
//!
//! ```no_run
//! use pbixkit::{DecodeOptions, decode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = decode("sales.pbix", &DecodeOptions::default())?;
//!
//! println!("{} pages, {} tables", doc.report.pages.len(), doc.data_model.tables.len());
//! for page in &doc.report.pages {
//!     for visual in &page.visuals {
//!         println!("{}: {}", page.display_name, visual.display_type);
//!     }
//! }
//!
//! // Decoding never fails on content problems; inspect the warnings instead
//! for warning in &doc.warnings {
//!     eprintln!("{}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Data model only
//!
//! ```no_run
//! use pbixkit::{DecodeOptions, decode_bytes};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("template.pbit")?;
//! let doc = decode_bytes(bytes, &DecodeOptions::new().with_report(false))?;
//! for measure in doc.data_model.calculations_of(pbixkit::datamodel::CalculationKind::Measure) {
//!     println!("{} = {}", measure.qualified_name(), measure.expression);
//! }
//! # Ok(())
//! # }
//! ```

/// Common types shared across the crate (errors, warnings, encodings)
pub mod common;

/// Decode options
pub mod config;

/// Tabular data model: tables, relationships, calculations, queries
pub mod datamodel;

/// Output document and the Model Assembler
pub mod document;

/// Fragment Decoder
pub mod fragment;

/// Archive Reader and container entry names
pub mod package;

/// Report layer: pages, visuals, bookmarks, custom visuals
pub mod report;

/// Schema Classifier
pub mod schema;

#[cfg(test)]
mod tests;

pub use common::{Error, Result, Warning, WarningKind};
pub use config::DecodeOptions;
pub use document::{Metadata, ReportDocument};
pub use package::Archive;

use package::ContainerParts;
use std::path::Path;

/// Decode the container at `path`.
///
/// Fails only when the file cannot be opened as an archive. Every other
/// problem is recorded in [`ReportDocument::warnings`].
pub fn decode<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<ReportDocument> {
    let archive = Archive::open(path)?;
    Ok(decode_archive(&archive, options))
}

/// Decode a container held in memory.
pub fn decode_bytes(data: impl Into<bytes::Bytes>, options: &DecodeOptions) -> Result<ReportDocument> {
    let archive = Archive::from_bytes(data)?;
    Ok(decode_archive(&archive, options))
}

/// Decode an already opened archive.
pub fn decode_archive(archive: &Archive, options: &DecodeOptions) -> ReportDocument {
    let parts = ContainerParts::collect(archive, options);

    let (data_model, report) = if options.use_parallel {
        rayon::join(
            || datamodel::normalize(&parts.data_model, options),
            || report::normalize(&parts.report, options),
        )
    } else {
        (
            datamodel::normalize(&parts.data_model, options),
            report::normalize(&parts.report, options),
        )
    };

    let doc = document::assemble(&parts, data_model, report);
    tracing::info!(
        source = archive.source(),
        tables = doc.metadata.table_count,
        pages = doc.metadata.page_count,
        visuals = doc.metadata.visual_count,
        warnings = doc.warnings.len(),
        "decoded container"
    );
    doc
}
