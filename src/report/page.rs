//! Report pages.

use super::visual::Visual;
use crate::schema::ShapeTag;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canvas size used when a page declares none.
pub const DEFAULT_PAGE_WIDTH: f64 = 1280.0;
pub const DEFAULT_PAGE_HEIGHT: f64 = 720.0;

/// Technical page names longer than this are generated identifiers.
const GENERATED_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Technical name, referenced by navigation actions and bookmarks
    pub name: String,
    pub display_name: String,
    /// Position in the report's page order
    pub ordinal: usize,
    pub width: f64,
    pub height: f64,
    pub is_hidden: bool,
    pub visuals: Vec<Visual>,
    /// Page-level filters, preserved uninterpreted
    pub filters: Vec<Value>,
    pub shape: ShapeTag,
}

impl Page {
    pub fn visual(&self, id: &str) -> Option<&Visual> {
        self.visuals.iter().find(|v| v.id == id)
    }

    /// Name shown to people: the given display name, or a cleaned-up technical name.
    pub fn display_name_for(name: &str, display_name: Option<&str>) -> String {
        match display_name.map(str::trim).filter(|s| !s.is_empty()) {
            Some(display) => display.to_string(),
            None => clean_page_name(name),
        }
    }
}

/// Turn a technical page name into something readable.
///
/// `ReportSection3` becomes `Page 3`; long generated identifiers become
/// `Page <last four characters>`.
pub fn clean_page_name(name: &str) -> String {
    if name.chars().count() > GENERATED_NAME_LEN {
        let tail: String = {
            let chars: Vec<char> = name.chars().collect();
            chars[chars.len() - 4..].iter().collect()
        };
        return format!("Page {}", tail);
    }
    match name.strip_prefix("ReportSection") {
        Some(rest) => format!("Page {}", rest).trim_end().to_string(),
        None => name.to_string(),
    }
}
