//! Reader for the legacy single-document layout (`Report/Layout`).
//!
//! The layout is one JSON document holding every page (`sections`). Visual
//! containers carry their configuration as a JSON-encoded string, as do the
//! root `config` (bookmarks), page configs and filter lists.

use super::page::{DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH, Page};
use super::visual::{Geometry, Visual, VisualSource, legacy_fields};
use crate::common::{Partial, WarningKind, Warnings};
use crate::fragment::access::{array_at, f64_at, get_path, i64_at, str_at};
use crate::fragment::decode_nested_field;
use crate::schema::{Family, ShapeTag, classify};
use serde_json::Value;
use std::collections::HashMap;

/// Sections of a layout root, or `None` when the root matches no layout shape.
pub(crate) fn sections(root: &Value) -> Option<&[Value]> {
    match classify(root, Family::Layout) {
        ShapeTag::LayoutSections | ShapeTag::LayoutSectionsBare => Some(array_at(root, "sections")),
        ShapeTag::LayoutPages => Some(array_at(root, "pages")),
        _ => None,
    }
}

/// Decode a double-encoded field, recording a warning on failure.
pub(crate) fn nested_field(value: &Value, key: &str, entry: &str, warnings: &mut Warnings) -> Option<Value> {
    match decode_nested_field(value, key) {
        Ok(decoded) => decoded,
        Err(err) => {
            warnings.push_error(entry, &err);
            None
        },
    }
}

/// Decoded filter list of a double-encoded `filters` field.
pub(crate) fn filters(value: &Value, entry: &str, warnings: &mut Warnings) -> Vec<Value> {
    match nested_field(value, "filters", entry, warnings) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Build one page from a legacy section.
pub(crate) fn build_page(
    section: &Value,
    index: usize,
    entry: &str,
    custom_visuals: &HashMap<String, String>,
) -> Partial<Option<Page>> {
    let mut warnings = Warnings::new();
    let shape = classify(section, Family::Page);
    if !matches!(shape, ShapeTag::LegacySection | ShapeTag::LegacySectionUnnamed) {
        warnings.push(
            WarningKind::UnrecognizedShape,
            Some(entry),
            format!("section #{} matches no known shape", index),
        );
        return Partial::new(None, warnings);
    }

    let name = str_at(section, "name")
        .map(str::to_string)
        .unwrap_or_else(|| format!("ReportSection{}", index));
    let location = format!("{}#{}", entry, name);

    let config = nested_field(section, "config", &location, &mut warnings);
    let is_hidden = config
        .as_ref()
        .and_then(|c| i64_at(c, "visibility"))
        .is_some_and(|v| v == 1);

    let mut visuals = Vec::new();
    for (container_index, container) in array_at(section, "visualContainers").iter().enumerate() {
        if let Some(visual) = build_visual(
            container,
            container_index,
            &name,
            &location,
            custom_visuals,
            &mut warnings,
        ) {
            visuals.push(visual);
        }
    }

    let page = Page {
        display_name: Page::display_name_for(&name, str_at(section, "displayName")),
        ordinal: i64_at(section, "ordinal")
            .and_then(|o| usize::try_from(o).ok())
            .unwrap_or(index),
        width: f64_at(section, "width").unwrap_or(DEFAULT_PAGE_WIDTH),
        height: f64_at(section, "height").unwrap_or(DEFAULT_PAGE_HEIGHT),
        is_hidden,
        visuals,
        filters: filters(section, &location, &mut warnings),
        shape,
        name,
    };
    Partial::new(Some(page), warnings)
}

fn build_visual(
    container: &Value,
    index: usize,
    page: &str,
    location: &str,
    custom_visuals: &HashMap<String, String>,
    warnings: &mut Warnings,
) -> Option<Visual> {
    let container_shape = classify(container, Family::VisualContainer);
    if !container_shape.is_recognized() {
        warnings.push(
            WarningKind::UnrecognizedShape,
            Some(location),
            format!("visual container #{} matches no known shape", index),
        );
        return None;
    }
    let visual_location = format!("{}/{}", location, index);
    let config = nested_field(container, "config", &visual_location, warnings)?;

    let id = str_at(&config, "name")
        .map(str::to_string)
        .or_else(|| container.get("id").map(|id| id.to_string().trim_matches('"').to_string()))
        .unwrap_or_else(|| format!("{}-{}", page, index));

    let geometry = match container_shape {
        ShapeTag::PositionedContainer => Geometry::from_value(container),
        _ => get_path(&config, "layouts.0.position")
            .map(Geometry::from_value)
            .unwrap_or_default(),
    };

    let shape = classify(&config, Family::VisualConfig);
    let mut source = VisualSource {
        id,
        geometry,
        parent_group: str_at(&config, "parentGroupName").map(str::to_string),
        filters: filters(container, &visual_location, warnings),
        shape: Some(shape),
        ..Default::default()
    };

    match shape {
        ShapeTag::SingleVisual | ShapeTag::UnnamedSingleVisual => {
            let single = &config["singleVisual"];
            source.raw_type = str_at(single, "visualType").unwrap_or_default().to_string();
            source.fields = legacy_fields(single);
            source.objects = single.get("objects");
            source.container_objects = single.get("vcObjects");
            source.is_hidden = str_at(single, "display.mode") == Some("hidden");
        },
        ShapeTag::VisualGroup => {
            source.is_group = true;
            source.raw_type = "group".to_string();
        },
        _ => {
            warnings.push(
                WarningKind::UnrecognizedShape,
                Some(&visual_location),
                "visual configuration matches no known shape; kept as a generic visual",
            );
        },
    }
    if source.raw_type.is_empty() && !source.is_group {
        tracing::debug!(visual = %source.id, "visual without a type token");
    }

    Some(source.into_visual(page, custom_visuals))
}
