//! Reader for the folder-based report definition (`Report/definition/`).
//!
//! Every page and every visual is its own UTF-8 JSON file:
//!
//! ```text
//! Report/definition/report.json
//! Report/definition/pages/pages.json                      page order
//! Report/definition/pages/<page>/page.json
//! Report/definition/pages/<page>/visuals/<visual>/visual.json
//! Report/definition/bookmarks/bookmarks.json              groups
//! Report/definition/bookmarks/<name>.bookmark.json
//! ```

use super::bookmark::BookmarkSet;
use super::page::{DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH, Page};
use super::visual::{Geometry, Visual, VisualSource, enhanced_fields};
use crate::common::{Partial, WarningKind, Warnings};
use crate::fragment::Fragment;
use crate::fragment::access::{array_at, bool_at, f64_at, str_at};
use crate::package::{Entry, paths};
use crate::schema::{Family, ShapeTag, classify};
use serde_json::Value;
use std::collections::HashMap;

/// The files making up one page.
#[derive(Debug)]
pub(crate) struct PageFiles<'a> {
    /// Page directory name
    pub dir: &'a str,
    pub page: Option<&'a Entry>,
    pub visuals: Vec<&'a Entry>,
}

/// True when the definition entries describe at least one page.
pub(crate) fn has_pages(definition: &[Entry]) -> bool {
    definition.iter().any(|e| paths::is_definition_page(&e.path))
}

/// Decode an entry, recording a warning on failure.
pub(crate) fn decode_entry(entry: &Entry, warnings: &mut Warnings) -> Option<Value> {
    match Fragment::from_entry(entry) {
        Ok(fragment) => Some(fragment.value),
        Err(err) => {
            warnings.push_error(&entry.path, &err);
            None
        },
    }
}

/// Group definition entries by page, ordered by `pages.json` and then by
/// first appearance in the archive.
pub(crate) fn group_pages<'a>(definition: &'a [Entry], warnings: &mut Warnings) -> Vec<PageFiles<'a>> {
    let mut pages: Vec<PageFiles<'a>> = Vec::new();
    let mut by_dir: HashMap<&'a str, usize> = HashMap::new();

    for entry in definition {
        let is_page = paths::is_definition_page(&entry.path);
        let is_visual = paths::is_definition_visual(&entry.path);
        if !is_page && !is_visual {
            continue;
        }
        let Some(dir) = paths::definition_page_dir(&entry.path) else {
            continue;
        };
        let at = *by_dir.entry(dir).or_insert_with(|| {
            pages.push(PageFiles {
                dir,
                page: None,
                visuals: Vec::new(),
            });
            pages.len() - 1
        });
        if is_page {
            pages[at].page = Some(entry);
        } else {
            pages[at].visuals.push(entry);
        }
    }

    let order: Vec<String> = definition
        .iter()
        .find(|e| e.path == paths::DEFINITION_PAGES)
        .and_then(|e| decode_entry(e, warnings))
        .map(|value| {
            array_at(&value, "pageOrder")
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    // Pages absent from the order keep archive order after the listed ones
    let rank = |dir: &str| order.iter().position(|name| name == dir).unwrap_or(order.len());
    pages.sort_by_key(|files| rank(files.dir));
    pages
}

/// Build one page from its files.
pub(crate) fn build_page(
    files: &PageFiles<'_>,
    index: usize,
    custom_visuals: &HashMap<String, String>,
) -> Partial<Option<Page>> {
    let mut warnings = Warnings::new();
    let Some(page_entry) = files.page else {
        warnings.push(
            WarningKind::EntryNotFound,
            Some(files.dir),
            "visuals stored for a page without page.json",
        );
        return Partial::new(None, warnings);
    };
    let Some(value) = decode_entry(page_entry, &mut warnings) else {
        return Partial::new(None, warnings);
    };

    let shape = classify(&value, Family::Page);
    if shape != ShapeTag::EnhancedPage {
        warnings.push(
            WarningKind::UnrecognizedShape,
            Some(&page_entry.path),
            "page matches no known shape; reading available fields",
        );
    }

    let name = str_at(&value, "name").unwrap_or(files.dir).to_string();
    let mut visuals = Vec::with_capacity(files.visuals.len());
    for entry in &files.visuals {
        if let Some(visual) = build_visual(entry, &name, custom_visuals, &mut warnings) {
            visuals.push(visual);
        }
    }

    let page = Page {
        display_name: Page::display_name_for(&name, str_at(&value, "displayName")),
        ordinal: index,
        width: f64_at(&value, "width").unwrap_or(DEFAULT_PAGE_WIDTH),
        height: f64_at(&value, "height").unwrap_or(DEFAULT_PAGE_HEIGHT),
        is_hidden: str_at(&value, "visibility") == Some("HiddenInViewMode"),
        visuals,
        filters: array_at(&value, "filterConfig.filters").to_vec(),
        shape,
        name,
    };
    Partial::new(Some(page), warnings)
}

fn build_visual(
    entry: &Entry,
    page: &str,
    custom_visuals: &HashMap<String, String>,
    warnings: &mut Warnings,
) -> Option<Visual> {
    let value = decode_entry(entry, warnings)?;
    let shape = classify(&value, Family::VisualConfig);

    let mut source = VisualSource {
        id: str_at(&value, "name").unwrap_or_default().to_string(),
        geometry: value.get("position").map(Geometry::from_value).unwrap_or_default(),
        parent_group: str_at(&value, "parentGroupName").map(str::to_string),
        is_hidden: bool_at(&value, "isHidden").unwrap_or(false),
        filters: array_at(&value, "filterConfig.filters").to_vec(),
        shape: Some(shape),
        ..Default::default()
    };
    if source.id.is_empty() {
        source.id = entry
            .path
            .rsplit('/')
            .nth(1)
            .unwrap_or_default()
            .to_string();
    }

    match shape {
        ShapeTag::EnhancedVisual => {
            let visual = &value["visual"];
            source.raw_type = str_at(visual, "visualType").unwrap_or_default().to_string();
            source.fields = enhanced_fields(visual);
            source.objects = visual.get("objects");
            source.container_objects = visual.get("visualContainerObjects");
        },
        ShapeTag::EnhancedVisualGroup => {
            source.is_group = true;
            source.raw_type = "group".to_string();
        },
        _ => warnings.push(
            WarningKind::UnrecognizedShape,
            Some(&entry.path),
            "visual matches no known shape; kept as a generic visual",
        ),
    }

    Some(source.into_visual(page, custom_visuals))
}

/// Read bookmarks from `bookmarks.json` and the individual bookmark files.
///
/// Without an index file, every bookmark file is an ungrouped bookmark.
pub(crate) fn read_bookmarks(definition: &[Entry], default_group: &str, warnings: &mut Warnings) -> BookmarkSet {
    let mut documents: Vec<Value> = Vec::new();
    for entry in definition {
        if entry.path.starts_with(paths::DEFINITION_BOOKMARKS_DIR)
            && entry.path.ends_with(paths::BOOKMARK_SUFFIX)
        {
            documents.extend(decode_entry(entry, warnings));
        }
    }

    let index = definition
        .iter()
        .find(|e| e.path == paths::DEFINITION_BOOKMARKS)
        .and_then(|e| decode_entry(e, warnings));

    let lookup = |name: &str| documents.iter().find(|d| str_at(d, "name") == Some(name));
    match &index {
        Some(index) => BookmarkSet::read(
            array_at(index, "items"),
            default_group,
            paths::DEFINITION_BOOKMARKS,
            warnings,
            lookup,
        ),
        None => BookmarkSet::read(
            &documents,
            default_group,
            paths::DEFINITION_BOOKMARKS_DIR,
            warnings,
            lookup,
        ),
    }
}

/// Decoded `report.json`, when present.
pub(crate) fn report_settings(definition: &[Entry], warnings: &mut Warnings) -> Option<Value> {
    definition
        .iter()
        .find(|e| e.path == paths::DEFINITION_REPORT)
        .and_then(|e| decode_entry(e, warnings))
}
