//! Bookmarks and bookmark groups.
//!
//! A bookmark is a named snapshot of report state. Its exploration state is
//! preserved as an opaque value; only the active page is read out of it.

use crate::common::{WarningKind, Warnings};
use crate::fragment::access::{array_at, first_str, str_at};
use crate::schema::{Family, ShapeTag, classify};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a visual on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualRef {
    pub page: String,
    pub visual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Identifier referenced by bookmark-navigation actions
    pub name: String,
    pub display_name: String,
    /// Name of the owning group (the implicit default group when none was declared)
    pub group: String,
    /// Position within the group
    pub position: usize,
    /// Page the bookmark switches to, when recorded
    pub target_page: Option<String>,
    /// Captured report state, uninterpreted
    pub state: Option<Value>,
    /// Visuals whose action navigates to this bookmark, in page order
    pub triggers: Vec<VisualRef>,
    pub shape: ShapeTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkGroup {
    pub name: String,
    pub display_name: String,
    /// True for the group collecting bookmarks declared outside any group
    pub implicit: bool,
    /// Member bookmark names, in order
    pub bookmarks: Vec<String>,
}

/// Bookmarks of a report with their groups, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkSet {
    pub bookmarks: Vec<Bookmark>,
    pub groups: Vec<BookmarkGroup>,
}

impl BookmarkSet {
    /// Read a bookmark list where groups carry their members in `children`.
    ///
    /// `resolve_child` turns a child that is only a name (folder-based format)
    /// into the bookmark's own document.
    pub fn read<'a, F>(
        items: &'a [Value],
        default_group: &str,
        entry: &str,
        warnings: &mut Warnings,
        mut resolve_child: F,
    ) -> Self
    where
        F: FnMut(&str) -> Option<&'a Value>,
    {
        let mut set = BookmarkSet::default();
        let mut ungrouped = Vec::new();

        for (index, item) in items.iter().enumerate() {
            match classify(item, Family::Bookmark) {
                ShapeTag::BookmarkGroup => {
                    let name = str_at(item, "name").unwrap_or_default().to_string();
                    let mut group = BookmarkGroup {
                        display_name: first_str(item, &["displayName", "name"])
                            .unwrap_or_default()
                            .to_string(),
                        name,
                        implicit: false,
                        bookmarks: Vec::new(),
                    };
                    for (child_index, child) in array_at(item, "children").iter().enumerate() {
                        let document = match child {
                            Value::String(child_name) => match resolve_child(child_name) {
                                Some(document) => document,
                                None => {
                                    warnings.push(
                                        WarningKind::UnresolvedReference,
                                        Some(entry),
                                        format!(
                                            "bookmark group '{}' lists unknown bookmark '{}'",
                                            group.name, child_name
                                        ),
                                    );
                                    continue;
                                },
                            },
                            other => other,
                        };
                        let position = group.bookmarks.len();
                        match read_bookmark(document, &group.name, position) {
                            Some(bookmark) => {
                                group.bookmarks.push(bookmark.name.clone());
                                set.bookmarks.push(bookmark);
                            },
                            None => warnings.push(
                                WarningKind::UnrecognizedShape,
                                Some(entry),
                                format!(
                                    "bookmark #{}.children[{}] matches no known shape",
                                    index, child_index
                                ),
                            ),
                        }
                    }
                    set.groups.push(group);
                },
                ShapeTag::BookmarkState | ShapeTag::BookmarkStub => {
                    let name = str_at(item, "name").unwrap_or_default();
                    let document = if item.get("explorationState").is_none() {
                        resolve_child(name).unwrap_or(item)
                    } else {
                        item
                    };
                    match read_bookmark(document, default_group, 0) {
                        Some(bookmark) => ungrouped.push(bookmark),
                        None => warnings.push(
                            WarningKind::UnrecognizedShape,
                            Some(entry),
                            format!("bookmark #{} matches no known shape", index),
                        ),
                    }
                },
                _ => warnings.push(
                    WarningKind::UnrecognizedShape,
                    Some(entry),
                    format!("bookmark #{} matches no known shape", index),
                ),
            }
        }

        if !ungrouped.is_empty() {
            let mut group = BookmarkGroup {
                name: default_group.to_string(),
                display_name: default_group.to_string(),
                implicit: true,
                bookmarks: Vec::with_capacity(ungrouped.len()),
            };
            for (position, mut bookmark) in ungrouped.into_iter().enumerate() {
                bookmark.position = position;
                group.bookmarks.push(bookmark.name.clone());
                set.bookmarks.push(bookmark);
            }
            set.groups.push(group);
        }
        set
    }

    pub fn find(&self, reference: &str) -> Option<usize> {
        self.bookmarks
            .iter()
            .position(|b| b.name == reference)
            .or_else(|| self.bookmarks.iter().position(|b| b.display_name == reference))
    }
}

fn read_bookmark(value: &Value, group: &str, position: usize) -> Option<Bookmark> {
    let shape = classify(value, Family::Bookmark);
    if !matches!(shape, ShapeTag::BookmarkState | ShapeTag::BookmarkStub) {
        return None;
    }
    let name = str_at(value, "name")?.to_string();
    let state = value.get("explorationState").cloned();
    Some(Bookmark {
        display_name: first_str(value, &["displayName", "name"])
            .unwrap_or_default()
            .to_string(),
        target_page: state
            .as_ref()
            .and_then(|s| str_at(s, "activeSection"))
            .map(str::to_string),
        name,
        group: group.to_string(),
        position,
        state,
        triggers: Vec::new(),
        shape,
    })
}
