//! Logical entry names inside a report container.
//!
//! Names differ between producer versions; the reader looks some of them up by
//! prefix rather than by exact name.

/// Producer version string (UTF-16LE text).
pub const VERSION: &str = "Version";
/// Producer metadata (UTF-16LE JSON).
pub const METADATA: &str = "Metadata";
/// Tabular model definition (UTF-16LE JSON). Present in templates and newer containers.
pub const DATA_MODEL_SCHEMA: &str = "DataModelSchema";
/// Compressed binary backup of the tabular model. Not decoded; only its presence is noted.
pub const DATA_MODEL: &str = "DataModel";
/// Embedded query package (binary header + nested ZIP).
pub const DATA_MASHUP: &str = "DataMashup";
/// Legacy report layout. Looked up by prefix: some producers append a suffix.
pub const LAYOUT_PREFIX: &str = "Report/Layout";
/// Root of the folder-based report definition.
pub const DEFINITION_PREFIX: &str = "Report/definition/";
/// Page order of the folder-based report definition.
pub const DEFINITION_PAGES: &str = "Report/definition/pages/pages.json";
/// Directory holding one sub-directory per page.
pub const DEFINITION_PAGES_DIR: &str = "Report/definition/pages/";
/// Bookmark index of the folder-based report definition.
pub const DEFINITION_BOOKMARKS: &str = "Report/definition/bookmarks/bookmarks.json";
/// Directory holding one file per bookmark.
pub const DEFINITION_BOOKMARKS_DIR: &str = "Report/definition/bookmarks/";
/// Embedded custom-visual packages.
pub const CUSTOM_VISUALS_PREFIX: &str = "Report/CustomVisuals/";
/// Registered static resources referenced by resource packages.
pub const REGISTERED_RESOURCES_PREFIX: &str = "Report/StaticResources/RegisteredResources/";
/// Shared static resources (base themes) referenced by resource packages.
pub const SHARED_RESOURCES_PREFIX: &str = "Report/StaticResources/SharedResources/";
/// Report-level settings of the folder-based report definition.
pub const DEFINITION_REPORT: &str = "Report/definition/report.json";
/// Section document inside the nested query package.
pub const MASHUP_SECTION: &str = "Formulas/Section1.m";

/// File name of a page definition inside its page directory.
pub const PAGE_FILE: &str = "page.json";
/// File name of a visual definition inside its visual directory.
pub const VISUAL_FILE: &str = "visual.json";
/// Suffix of individual bookmark files.
pub const BOOKMARK_SUFFIX: &str = ".bookmark.json";
/// Manifest of an embedded custom visual.
pub const CUSTOM_VISUAL_MANIFEST: &str = "package.json";

/// Normalize a caller-supplied path to the archive's naming convention.
///
/// Archive entries use forward slashes and no leading separator.
pub fn normalize(path: &str) -> String {
    path.trim_start_matches(['/', '\\']).replace('\\', "/")
}

/// Returns true for entries describing a page of the folder-based definition.
pub fn is_definition_page(path: &str) -> bool {
    path.starts_with(DEFINITION_PAGES_DIR)
        && path.ends_with(PAGE_FILE)
        && path.matches('/').count() == 4
}

/// Returns true for entries describing a visual of the folder-based definition.
pub fn is_definition_visual(path: &str) -> bool {
    path.starts_with(DEFINITION_PAGES_DIR)
        && path.ends_with(VISUAL_FILE)
        && path.contains("/visuals/")
}

/// Page directory name of a folder-based definition entry.
///
/// `Report/definition/pages/<page>/...` yields `<page>`.
pub fn definition_page_dir(path: &str) -> Option<&str> {
    path.strip_prefix(DEFINITION_PAGES_DIR)?.split('/').next().filter(|s| !s.is_empty())
}
