//! UI Model Normalizer.
//!
//! Chooses the report format present in the container, registers custom
//! visuals, builds pages (in parallel for large reports), then joins bookmark
//! actions to bookmarks. Page building only reads shared, immutable inputs;
//! each page returns its own warnings, merged afterwards in page order.

use super::bookmark::{BookmarkSet, VisualRef};
use super::custom_visual::Registry;
use super::page::Page;
use super::{Report, ReportFormat, enhanced, legacy, resources};
use crate::common::{Partial, WarningKind, Warnings};
use crate::config::DecodeOptions;
use crate::fragment::Fragment;
use crate::fragment::access::array_at;
use crate::package::parts::ReportParts;
use crate::package::paths;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

/// Normalize the report entries of a container.
pub fn normalize(parts: &ReportParts, options: &DecodeOptions) -> Partial<Report> {
    let mut warnings = parts.warnings.clone();
    let mut registry = Registry::new();

    for manifest in &parts.custom_visuals {
        match Fragment::from_entry(manifest) {
            Ok(fragment) => {
                if !registry.register_fragment(&fragment.value).is_recognized() {
                    warnings.push(
                        WarningKind::UnrecognizedShape,
                        Some(&manifest.path),
                        "custom visual manifest matches no known shape",
                    );
                }
            },
            Err(err) => warnings.push_error(&manifest.path, &err),
        }
    }

    let mut report = if enhanced::has_pages(&parts.definition) {
        normalize_enhanced(parts, options, &mut registry, &mut warnings)
    } else if let Some(layout) = &parts.layout {
        match Fragment::from_entry(layout) {
            Ok(fragment) => {
                normalize_legacy(&fragment, parts, options, &mut registry, &mut warnings)
            },
            Err(err) => {
                warnings.push_error(&layout.path, &err);
                Report::default()
            },
        }
    } else {
        tracing::debug!("no report layout in container");
        Report::default()
    };

    report.custom_visuals = registry.into_vec();
    tracing::debug!(
        pages = report.pages.len(),
        visuals = report.visual_count(),
        bookmarks = report.bookmarks.len(),
        "normalized report"
    );
    Partial::new(report, warnings)
}

fn normalize_legacy(
    layout: &Fragment,
    parts: &ReportParts,
    options: &DecodeOptions,
    registry: &mut Registry,
    warnings: &mut Warnings,
) -> Report {
    let root = &layout.value;
    let entry = layout.path.as_str();
    let Some(sections) = legacy::sections(root) else {
        warnings.push(WarningKind::UnrecognizedShape, Some(entry), "layout matches no known shape");
        return Report::default();
    };

    let config = legacy::nested_field(root, "config", entry, warnings);
    resources::register_declared(root, registry);
    if let Some(config) = &config {
        resources::register_declared(config, registry);
    }
    resources::check_resources(root, &parts.entry_names, entry, warnings);

    let custom_visuals = registry.display_names();
    let mut pages = build_pages(sections, options, warnings, |index, section| {
        legacy::build_page(section, index, entry, &custom_visuals)
    });
    // Stable: pages without an ordinal keep document order
    pages.sort_by_key(|page| page.ordinal);

    let bookmarks = match &config {
        Some(config) => BookmarkSet::read(
            array_at(config, "bookmarks"),
            &options.default_bookmark_group,
            entry,
            warnings,
            |_| None,
        ),
        None => BookmarkSet::default(),
    };

    let filters = legacy::filters(root, entry, warnings);
    assemble(ReportFormat::Legacy, pages, bookmarks, filters, warnings)
}

fn normalize_enhanced(
    parts: &ReportParts,
    options: &DecodeOptions,
    registry: &mut Registry,
    warnings: &mut Warnings,
) -> Report {
    let settings = enhanced::report_settings(&parts.definition, warnings);
    if let Some(settings) = &settings {
        resources::register_declared(settings, registry);
        resources::check_resources(settings, &parts.entry_names, paths::DEFINITION_REPORT, warnings);
    }

    let files = enhanced::group_pages(&parts.definition, warnings);
    let custom_visuals = registry.display_names();
    let pages = build_pages(&files, options, warnings, |index, page_files| {
        enhanced::build_page(page_files, index, &custom_visuals)
    });

    let bookmarks =
        enhanced::read_bookmarks(&parts.definition, &options.default_bookmark_group, warnings);
    let filters = settings
        .as_ref()
        .map(|s| array_at(s, "filterConfig.filters").to_vec())
        .unwrap_or_default();
    assemble(ReportFormat::Enhanced, pages, bookmarks, filters, warnings)
}

/// Build pages, on the rayon pool when the report is large enough.
///
/// Output order (pages and warnings) follows input order either way.
fn build_pages<T, F>(
    inputs: &[T],
    options: &DecodeOptions,
    warnings: &mut Warnings,
    build: F,
) -> Vec<Page>
where
    T: Sync,
    F: Fn(usize, &T) -> Partial<Option<Page>> + Sync,
{
    let results: Vec<Partial<Option<Page>>> = if options.parallel_for(inputs.len()) {
        inputs
            .par_iter()
            .enumerate()
            .map(|(index, input)| build(index, input))
            .collect()
    } else {
        inputs
            .iter()
            .enumerate()
            .map(|(index, input)| build(index, input))
            .collect()
    };

    let mut pages = Vec::with_capacity(results.len());
    for mut result in results {
        warnings.append(&mut result.warnings);
        pages.extend(result.value);
    }
    pages
}

/// Register bookmark triggers and produce the report.
fn assemble(
    format: ReportFormat,
    pages: Vec<Page>,
    mut bookmarks: BookmarkSet,
    filters: Vec<Value>,
    warnings: &mut Warnings,
) -> Report {
    for page in &pages {
        for visual in &page.visuals {
            let Some(target) = visual.action.bookmark() else {
                continue;
            };
            match bookmarks.find(target) {
                Some(at) => bookmarks.bookmarks[at].triggers.push(VisualRef {
                    page: page.name.clone(),
                    visual: visual.id.clone(),
                }),
                None => warnings.push(
                    WarningKind::UnresolvedReference,
                    None,
                    format!(
                        "visual '{}' on page '{}' navigates to missing bookmark '{}'",
                        visual.id, page.name, target
                    ),
                ),
            }
        }
    }

    Report {
        format,
        pages,
        bookmarks: bookmarks.bookmarks,
        bookmark_groups: bookmarks.groups,
        custom_visuals: Vec::new(),
        filters,
    }
}

/// Page-name lookup used by cross-checks.
pub(crate) fn page_index(pages: &[Page]) -> HashMap<&str, usize> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| (page.name.as_str(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::encoding::encode_utf16le;
    use crate::package::Entry;
    use crate::report::visual::Action;
    use crate::report::visual_type::VisualCategory;
    use bytes::Bytes;
    use serde_json::json;

    fn layout_parts(layout: &Value) -> ReportParts {
        ReportParts {
            layout: Some(Entry {
                path: "Report/Layout".to_string(),
                data: Bytes::from(encode_utf16le(&layout.to_string())),
            }),
            entry_names: vec!["Report/Layout".to_string()],
            ..Default::default()
        }
    }

    fn container(name: &str, visual_type: &str, extra: Value) -> Value {
        let mut single = json!({"visualType": visual_type});
        if let (Value::Object(target), Value::Object(source)) = (&mut single, extra) {
            target.extend(source);
        }
        json!({
            "x": 0, "y": 0, "z": 0, "width": 100, "height": 100,
            "config": json!({"name": name, "singleVisual": single}).to_string()
        })
    }

    fn many_pages(count: usize) -> Value {
        let sections: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "name": format!("ReportSection{}", i),
                    "displayName": format!("Page {}", i),
                    "ordinal": count - 1 - i,
                    "visualContainers": [container(&format!("v{}", i), "card", json!({}))]
                })
            })
            .collect();
        json!({"sections": sections, "config": "{}"})
    }

    #[test]
    fn test_bookmark_triggers() {
        let layout = json!({
            "config": json!({"bookmarks": [
                {"name": "BM1", "displayName": "Bookmark 1", "explorationState": {"activeSection": "s1"}}
            ]}).to_string(),
            "sections": [{
                "name": "s1", "displayName": "One",
                "visualContainers": [
                    container("b1", "actionButton", json!({"vcObjects": {"visualLink": [
                        {"properties": {"bookmark": {"expr": {"Literal": {"Value": "'BM1'"}}}}}
                    ]}})),
                    container("b2", "actionButton", json!({"vcObjects": {"visualLink": [
                        {"properties": {"bookmark": {"expr": {"Literal": {"Value": "'Gone'"}}}}}
                    ]}}))
                ]
            }]
        });
        let result = normalize(&layout_parts(&layout), &DecodeOptions::default());
        let report = result.value;
        assert_eq!(report.format, ReportFormat::Legacy);
        assert_eq!(
            report.bookmarks[0].triggers,
            [VisualRef { page: "s1".into(), visual: "b1".into() }]
        );
        assert_eq!(result.warnings.count(WarningKind::UnresolvedReference), 1);
    }

    #[test]
    fn test_pages_sorted_by_ordinal_in_parallel() {
        let layout = many_pages(6);
        let parallel = normalize(&layout_parts(&layout), &DecodeOptions::new().with_parallel_threshold(2));
        let sequential = normalize(&layout_parts(&layout), &DecodeOptions::new().with_parallel(false));

        let names: Vec<&str> = parallel.value.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names[0], "ReportSection5");
        assert_eq!(names[5], "ReportSection0");
        assert_eq!(parallel.value, sequential.value);
    }

    #[test]
    fn test_custom_visual_registered_in_layout() {
        let layout = json!({
            "sections": [{"name": "s", "displayName": "S", "visualContainers": [
                container("g", "gantt0123", json!({})),
                container("f", "futureVisualXYZ", json!({}))
            ]}],
            "publicCustomVisuals": ["gantt0123"]
        });
        let result = normalize(&layout_parts(&layout), &DecodeOptions::default());
        let visuals = &result.value.pages[0].visuals;
        assert_eq!(visuals[0].category, VisualCategory::CustomVisual);
        assert_eq!(visuals[1].category, VisualCategory::Other("futureVisualXYZ".into()));
        assert_eq!(visuals[1].display_type, "futureVisualXYZ");
        assert_eq!(result.value.custom_visuals.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_layout_is_silent() {
        let result = normalize(&ReportParts::default(), &DecodeOptions::default());
        assert!(result.value.pages.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.value.format, ReportFormat::None);
    }

    #[test]
    fn test_malformed_layout() {
        let parts = ReportParts {
            layout: Some(Entry {
                path: "Report/Layout".to_string(),
                data: Bytes::from_static(b"{\"sections\": ["),
            }),
            ..Default::default()
        };
        let result = normalize(&parts, &DecodeOptions::default());
        assert!(result.value.pages.is_empty());
        assert_eq!(result.warnings.count(WarningKind::MalformedFragment), 1);
    }

    #[test]
    fn test_page_navigation_action() {
        let layout = json!({"sections": [
            {"name": "s1", "displayName": "A", "visualContainers": [
                container("nav", "actionButton", json!({"vcObjects": {"visualLink": [
                    {"properties": {"navigationSection": {"expr": {"Literal": {"Value": "'s2'"}}}}}
                ]}}))
            ]},
            {"name": "s2", "displayName": "B", "visualContainers": []}
        ]});
        let report = normalize(&layout_parts(&layout), &DecodeOptions::default()).value;
        assert_eq!(
            report.pages[0].visuals[0].action,
            Action::PageNavigation { page: "s2".into() }
        );
        assert!(page_index(&report.pages).contains_key("s2"));
    }
}
