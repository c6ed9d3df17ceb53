//! Model Assembler.
//!
//! Runs after both normalizers have finished. Merges their output with the
//! archive-level metadata and performs integrity cross-checks that only ever
//! add warnings.

use super::ReportDocument;
use super::metadata::Metadata;
use crate::common::{Partial, WarningKind, Warnings};
use crate::datamodel::DataModel;
use crate::package::ContainerParts;
use crate::report::Report;
use crate::report::normalizer::page_index;

/// Merge the normalized sub-models into the output document.
///
/// Warning order: container, data model, report, cross-checks.
pub fn assemble(parts: &ContainerParts, data_model: Partial<DataModel>, report: Partial<Report>) -> ReportDocument {
    let mut warnings = parts.warnings.clone();
    let mut metadata = Metadata::read(parts.version.as_ref(), parts.metadata.as_ref(), &mut warnings);
    metadata.entry_count = parts.entry_count;
    metadata.binary_data_model = parts.data_model.binary_model && parts.data_model.schema.is_none();

    let Partial { value: data_model, warnings: mut model_warnings } = data_model;
    let Partial { value: report, warnings: mut report_warnings } = report;
    warnings.append(&mut model_warnings);
    warnings.append(&mut report_warnings);

    cross_check(&report, &mut warnings);
    metadata.summarize(&data_model, &report);

    ReportDocument {
        metadata,
        data_model,
        report,
        warnings: warnings.into_vec(),
    }
}

fn cross_check(report: &Report, warnings: &mut Warnings) {
    let pages = page_index(&report.pages);

    for bookmark in &report.bookmarks {
        for trigger in &bookmark.triggers {
            let found = pages
                .get(trigger.page.as_str())
                .is_some_and(|&at| report.pages[at].visual(&trigger.visual).is_some());
            if !found {
                warnings.push(
                    WarningKind::UnresolvedReference,
                    None,
                    format!(
                        "bookmark '{}' is triggered by unknown visual '{}' on page '{}'",
                        bookmark.name, trigger.visual, trigger.page
                    ),
                );
            }
        }
        if let Some(target) = &bookmark.target_page {
            if !pages.contains_key(target.as_str()) {
                warnings.push(
                    WarningKind::UnresolvedReference,
                    None,
                    format!("bookmark '{}' targets unknown page '{}'", bookmark.name, target),
                );
            }
        }
    }

    for page in &report.pages {
        for visual in &page.visuals {
            let Some(target) = visual.action.page() else {
                continue;
            };
            // Navigation targets may use either the technical or the display name
            let known = pages.contains_key(target)
                || report.pages.iter().any(|p| p.display_name == target);
            if !known {
                warnings.push(
                    WarningKind::UnresolvedReference,
                    None,
                    format!(
                        "visual '{}' on page '{}' navigates to unknown page '{}'",
                        visual.id, page.name, target
                    ),
                );
            }
        }
    }
}
