//! Visual instances and the extraction helpers shared by both report formats.

use super::visual_type::{self, VisualCategory};
use crate::fragment::access::{array_at, f64_at, get_path, literal_string, str_at};
use crate::schema::ShapeTag;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Position and stacking of a visual on its page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z: f64,
}

impl Geometry {
    /// Read `x`/`y`/`width`/`height`/`z` from an object; missing values are 0.
    pub fn from_value(value: &Value) -> Self {
        let at = |key: &str| f64_at(value, key).unwrap_or(0.0);
        Geometry {
            x: at("x"),
            y: at("y"),
            width: at("width"),
            height: at("height"),
            z: at("z"),
        }
    }
}

/// A data field bound to a visual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundField {
    /// Data role (`Values`, `Category`, ...) when known
    pub role: Option<String>,
    /// Field reference such as `Sales.Total` or `Sum(Sales.Amount)`
    pub query_ref: String,
}

/// Formatting properties of a visual, keyed by object name (`title`,
/// `legend`, ...). Each object holds the `properties` maps of its selectors,
/// kept uninterpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualProperties {
    /// From `objects`
    pub objects: BTreeMap<String, Vec<Value>>,
    /// From `vcObjects` / `visualContainerObjects`
    pub container: BTreeMap<String, Vec<Value>>,
}

impl VisualProperties {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.container.is_empty()
    }
}

/// What happens when a visual is clicked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Action {
    #[default]
    None,
    BookmarkNavigation { bookmark: String },
    PageNavigation { page: String },
    Drillthrough { page: String },
    WebUrl { url: String },
    Back,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::None => "none",
            Action::BookmarkNavigation { .. } => "bookmark-navigation",
            Action::PageNavigation { .. } => "page-navigation",
            Action::Drillthrough { .. } => "drillthrough",
            Action::WebUrl { .. } => "web-url",
            Action::Back => "back",
        }
    }

    /// Target bookmark of a bookmark-navigation action.
    pub fn bookmark(&self) -> Option<&str> {
        match self {
            Action::BookmarkNavigation { bookmark } => Some(bookmark),
            _ => None,
        }
    }

    /// Target page of a page-navigation or drillthrough action.
    pub fn page(&self) -> Option<&str> {
        match self {
            Action::PageNavigation { page } | Action::Drillthrough { page } => Some(page),
            _ => None,
        }
    }
}

/// A visual widget placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub id: String,
    /// Name of the page holding this visual
    pub page: String,
    pub category: VisualCategory,
    pub display_type: String,
    /// Type token as written by the producer, even when unresolved
    pub raw_type: String,
    pub geometry: Geometry,
    pub fields: Vec<BoundField>,
    /// Extracted text content; empty when the visual carries none
    pub text: String,
    pub action: Action,
    /// Group container this visual belongs to
    pub parent_group: Option<String>,
    pub is_hidden: bool,
    /// Visual-level filters, preserved uninterpreted
    pub filters: Vec<Value>,
    #[serde(default, skip_serializing_if = "VisualProperties::is_empty")]
    pub properties: VisualProperties,
    pub shape: ShapeTag,
}

/// Format-independent description of a visual, produced by the layout readers.
#[derive(Debug, Clone, Default)]
pub(crate) struct VisualSource<'a> {
    pub id: String,
    pub raw_type: String,
    pub is_group: bool,
    pub geometry: Geometry,
    pub fields: Vec<BoundField>,
    /// Formatting objects (`objects`)
    pub objects: Option<&'a Value>,
    /// Container objects (`vcObjects` / `visualContainerObjects`)
    pub container_objects: Option<&'a Value>,
    pub parent_group: Option<String>,
    pub is_hidden: bool,
    pub filters: Vec<Value>,
    pub shape: Option<ShapeTag>,
}

impl VisualSource<'_> {
    /// Resolve the type and extract text and action.
    ///
    /// `custom_visuals` maps registered package ids to display names.
    pub fn into_visual(self, page: &str, custom_visuals: &HashMap<String, String>) -> Visual {
        let (category, display_type) = if self.is_group {
            (VisualCategory::Group, "Group".to_string())
        } else {
            resolve_with_registry(&self.raw_type, custom_visuals)
        };
        Visual {
            text: extract_text(self.objects, self.container_objects),
            action: extract_action(self.container_objects),
            properties: VisualProperties {
                objects: extract_properties(self.objects),
                container: extract_properties(self.container_objects),
            },
            id: self.id,
            page: page.to_string(),
            category,
            display_type,
            raw_type: self.raw_type,
            geometry: self.geometry,
            fields: self.fields,
            parent_group: self.parent_group,
            is_hidden: self.is_hidden,
            filters: self.filters,
            shape: self.shape.unwrap_or(ShapeTag::Unrecognized),
        }
    }
}

/// Resolve a token, letting registered custom visuals claim unknown tokens.
pub fn resolve_with_registry(
    raw: &str,
    custom_visuals: &HashMap<String, String>,
) -> (VisualCategory, String) {
    let resolved = visual_type::resolve(raw);
    if resolved.0.is_other() {
        if let Some(display) = custom_visuals.get(raw) {
            return (VisualCategory::CustomVisual, display.clone());
        }
    }
    resolved
}

/// Collect text fragments in document order: container title, button label,
/// then text-box paragraphs. Fragments are joined with `\n`.
pub fn extract_text(objects: Option<&Value>, container_objects: Option<&Value>) -> String {
    let mut fragments: Vec<String> = Vec::new();

    if let Some(container) = container_objects {
        for title in array_at(container, "title") {
            fragments.extend(get_path(title, "properties.text").and_then(literal_string));
        }
    }

    if let Some(objects) = objects {
        for label in array_at(objects, "text") {
            fragments.extend(get_path(label, "properties.text").and_then(literal_string));
        }
        for general in array_at(objects, "general") {
            for paragraph in array_at(general, "properties.paragraphs") {
                let line: String = array_at(paragraph, "textRuns")
                    .iter()
                    .filter_map(|run| str_at(run, "value"))
                    .collect();
                fragments.push(line);
            }
        }
    }

    // Trailing empty paragraphs carry no content
    while fragments.last().is_some_and(|f| f.is_empty()) {
        fragments.pop();
    }
    fragments.join("\n")
}

/// Collect the `properties` map of every selector entry, per object name.
///
/// Objects whose value is not a list are kept with no entries.
pub fn extract_properties(objects: Option<&Value>) -> BTreeMap<String, Vec<Value>> {
    let Some(Value::Object(objects)) = objects else {
        return BTreeMap::new();
    };
    objects
        .iter()
        .map(|(name, entries)| {
            let properties = entries
                .as_array()
                .map(Vec::as_slice)
                .unwrap_or(&[])
                .iter()
                .filter_map(|entry| entry.get("properties").cloned())
                .collect();
            (name.clone(), properties)
        })
        .collect()
}

/// Read the click action of a visual from its `visualLink` container objects.
pub fn extract_action(container_objects: Option<&Value>) -> Action {
    let Some(container) = container_objects else {
        return Action::None;
    };
    for link in array_at(container, "visualLink") {
        let Some(properties) = link.get("properties") else {
            continue;
        };
        let literal = |key: &str| properties.get(key).and_then(literal_string);
        if literal("show").as_deref() == Some("false") {
            continue;
        }
        let action = if let Some(bookmark) = literal("bookmark") {
            Action::BookmarkNavigation { bookmark }
        } else if let Some(page) = literal("navigationSection") {
            Action::PageNavigation { page }
        } else if let Some(page) = literal("drillthroughSection") {
            Action::Drillthrough { page }
        } else if let Some(url) = literal("webUrl") {
            Action::WebUrl { url }
        } else if literal("type").as_deref() == Some("Back") {
            Action::Back
        } else {
            continue;
        };
        return action;
    }
    Action::None
}

/// Bound fields of a legacy `singleVisual`: projections per role, falling back
/// to the prototype query's select list.
pub fn legacy_fields(single_visual: &Value) -> Vec<BoundField> {
    let mut fields = Vec::new();
    if let Some(Value::Object(projections)) = single_visual.get("projections") {
        for (role, entries) in projections {
            for entry in entries.as_array().map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(query_ref) = str_at(entry, "queryRef") {
                    fields.push(BoundField {
                        role: Some(role.clone()),
                        query_ref: query_ref.to_string(),
                    });
                }
            }
        }
    }
    if fields.is_empty() {
        for select in array_at(single_visual, "prototypeQuery.Select") {
            if let Some(name) = str_at(select, "Name") {
                fields.push(BoundField {
                    role: None,
                    query_ref: name.to_string(),
                });
            }
        }
    }
    fields
}

/// Bound fields of a folder-based `visual`: `query.queryState.<role>.projections`.
pub fn enhanced_fields(visual: &Value) -> Vec<BoundField> {
    let mut fields = Vec::new();
    if let Some(Value::Object(roles)) = get_path(visual, "query.queryState") {
        for (role, state) in roles {
            for projection in array_at(state, "projections") {
                if let Some(query_ref) = str_at(projection, "queryRef") {
                    fields.push(BoundField {
                        role: Some(role.clone()),
                        query_ref: query_ref.to_string(),
                    });
                }
            }
        }
    }
    fields
}
