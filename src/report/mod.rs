//! UI model: pages, visuals, bookmarks and custom visuals.
//!
//! Two storage formats exist. The legacy format keeps the whole layout in a
//! single `Report/Layout` document with double-encoded configs; the
//! folder-based format splits it into one JSON file per page, visual and
//! bookmark under `Report/definition/`. Both normalize to [`Report`].

pub mod bookmark;
pub mod custom_visual;
mod enhanced;
mod legacy;
pub mod normalizer;
pub mod page;
mod resources;
pub mod visual;
pub mod visual_type;

pub use bookmark::{Bookmark, BookmarkGroup, VisualRef};
pub use custom_visual::CustomVisualRegistration;
pub use normalizer::normalize;
pub use page::Page;
pub use visual::{Action, BoundField, Geometry, Visual, VisualProperties};
pub use visual_type::VisualCategory;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage format the report was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// No report entries in the container
    #[default]
    None,
    Legacy,
    Enhanced,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub format: ReportFormat,
    /// Pages in display order
    pub pages: Vec<Page>,
    pub bookmarks: Vec<Bookmark>,
    pub bookmark_groups: Vec<BookmarkGroup>,
    pub custom_visuals: Vec<CustomVisualRegistration>,
    /// Report-level filters, passed through undecoded
    pub filters: Vec<Value>,
}

impl Report {
    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    pub fn visual_count(&self) -> usize {
        self.pages.iter().map(|p| p.visuals.len()).sum()
    }

    pub fn visuals(&self) -> impl Iterator<Item = &Visual> {
        self.pages.iter().flat_map(|p| p.visuals.iter())
    }

    pub fn bookmark(&self, reference: &str) -> Option<&Bookmark> {
        self.bookmarks
            .iter()
            .find(|b| b.name == reference)
            .or_else(|| self.bookmarks.iter().find(|b| b.display_name == reference))
    }
}
