//! Schema Classifier.
//!
//! Determines which known shape a decoded fragment matches. Classification is
//! duck-typed: a shape matches when all of its marker keys are present, and
//! the most specific candidate (most markers) wins. New producer versions tend
//! to add optional keys rather than rename required ones, so marker presence
//! survives schema drift where exact-schema matching would not.
//!
//! # Example
//!
//! ```rust
//! use pbixkit::schema::{classify, Family, ShapeTag};
//! use serde_json::json;
//!
//! let rel = json!({"fromTable": "Sales", "fromColumn": "Key",
//!                  "toTable": "Date", "toColumn": "Key"});
//! assert_eq!(classify(&rel, Family::Relationship), ShapeTag::RelationshipImplicit);
//! assert_eq!(classify(&json!([]), Family::Relationship), ShapeTag::Unrecognized);
//! ```

pub mod rules;

use crate::fragment::access::has_path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of fragment the caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    DataModel,
    Table,
    Column,
    Relationship,
    Expression,
    Layout,
    Page,
    VisualContainer,
    VisualConfig,
    Bookmark,
    CustomVisual,
}

impl Family {
    pub const ALL: &'static [Family] = &[
        Family::DataModel,
        Family::Table,
        Family::Column,
        Family::Relationship,
        Family::Expression,
        Family::Layout,
        Family::Page,
        Family::VisualContainer,
        Family::VisualConfig,
        Family::Bookmark,
        Family::CustomVisual,
    ];
}

/// A known fragment shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeTag {
    // Data model root
    TabularDatabase,
    TabularModel,
    TableCollection,
    // Tables
    CalculatedTable,
    TableWithPartitions,
    TableDefinition,
    TableStub,
    // Columns
    CalculatedColumn,
    DataColumn,
    ColumnStub,
    // Relationships
    RelationshipExplicit,
    RelationshipImplicit,
    RelationshipLegacy,
    // Shared expressions
    SharedExpression,
    // Legacy layout
    LayoutSections,
    LayoutSectionsBare,
    LayoutPages,
    // Pages
    LegacySection,
    LegacySectionUnnamed,
    EnhancedPage,
    // Visual containers
    PositionedContainer,
    ConfigOnlyContainer,
    // Visual configuration
    SingleVisual,
    VisualGroup,
    UnnamedSingleVisual,
    EnhancedVisual,
    EnhancedVisualGroup,
    // Bookmarks
    BookmarkGroup,
    BookmarkState,
    BookmarkStub,
    // Custom visuals
    ResourcePackage,
    PublicCustomVisual,
    CustomVisualManifest,
    /// Matched none of the family's shapes
    Unrecognized,
}

impl ShapeTag {
    #[inline]
    pub fn is_recognized(self) -> bool {
        self != ShapeTag::Unrecognized
    }

    /// Marker keys of this shape; empty for [`ShapeTag::Unrecognized`].
    pub fn markers(self) -> &'static [&'static str] {
        rules::rule_for(self).map(|rule| rule.markers).unwrap_or(&[])
    }
}

/// Classify `value` against the shapes of `family`.
///
/// Never fails: non-object values and objects missing every shape's markers
/// yield [`ShapeTag::Unrecognized`].
pub fn classify(value: &Value, family: Family) -> ShapeTag {
    if !value.is_object() {
        return ShapeTag::Unrecognized;
    }
    let tag = rules::ordered(family)
        .iter()
        .find(|rule| rule.markers.iter().all(|marker| has_path(value, marker)))
        .map(|rule| rule.tag)
        .unwrap_or(ShapeTag::Unrecognized);
    tracing::trace!(?family, ?tag, "classified fragment");
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_most_specific_wins() {
        let table = json!({"name": "Sales", "columns": [], "partitions": []});
        assert_eq!(classify(&table, Family::Table), ShapeTag::TableWithPartitions);

        let table = json!({"name": "Sales", "columns": []});
        assert_eq!(classify(&table, Family::Table), ShapeTag::TableDefinition);

        let table = json!({"name": "Calc", "partitions": []});
        assert_eq!(classify(&table, Family::Table), ShapeTag::CalculatedTable);

        assert_eq!(classify(&json!({"name": "x"}), Family::Table), ShapeTag::TableStub);
    }

    #[test]
    fn test_extra_keys_are_tolerated() {
        let model = json!({
            "culture": "en-US",
            "tables": [],
            "relationships": [],
            "annotations": [{"name": "future"}]
        });
        assert_eq!(classify(&model, Family::DataModel), ShapeTag::TabularModel);

        let db = json!({"name": "db", "compatibilityLevel": 1550, "model": {}, "extra": 1});
        assert_eq!(classify(&db, Family::DataModel), ShapeTag::TabularDatabase);
    }

    #[test]
    fn test_relationship_shapes() {
        let explicit = json!({
            "fromTable": "Sales", "fromColumn": "DateKey",
            "toTable": "Date", "toColumn": "DateKey",
            "fromCardinality": "many"
        });
        assert_eq!(classify(&explicit, Family::Relationship), ShapeTag::RelationshipExplicit);

        let legacy = json!({
            "FromTableName": "Sales", "FromColumnName": "DateKey",
            "ToTableName": "Date", "ToColumnName": "DateKey"
        });
        assert_eq!(classify(&legacy, Family::Relationship), ShapeTag::RelationshipLegacy);

        let partial = json!({"fromTable": "Sales", "toTable": "Date"});
        assert_eq!(classify(&partial, Family::Relationship), ShapeTag::Unrecognized);
    }

    #[test]
    fn test_null_marker_does_not_count() {
        let container = json!({"x": 0, "y": 0, "width": 10, "height": null, "config": "{}"});
        assert_eq!(
            classify(&container, Family::VisualContainer),
            ShapeTag::ConfigOnlyContainer
        );
    }

    #[test]
    fn test_dotted_markers() {
        let package = json!({"resourcePackage": {"name": "gantt", "type": 0, "items": []}});
        assert_eq!(classify(&package, Family::CustomVisual), ShapeTag::ResourcePackage);

        let manifest = json!({"visual": {"guid": "gantt1", "displayName": "Gantt"}});
        assert_eq!(classify(&manifest, Family::CustomVisual), ShapeTag::CustomVisualManifest);
    }

    #[test]
    fn test_non_objects_are_unrecognized() {
        for family in Family::ALL {
            assert_eq!(classify(&json!("text"), *family), ShapeTag::Unrecognized);
            assert_eq!(classify(&json!({}), *family), ShapeTag::Unrecognized);
        }
    }

    #[test]
    fn test_markers_round_trip() {
        for rule in rules::RULES {
            let mut object = serde_json::Map::new();
            for marker in rule.markers {
                insert_path(&mut object, marker);
            }
            let value = Value::Object(object);
            // The minimal object of a shape classifies as that shape
            assert_eq!(classify(&value, rule.family), rule.tag, "{:?}", rule.tag);
        }
    }

    fn insert_path(object: &mut serde_json::Map<String, Value>, path: &str) {
        match path.split_once('.') {
            Some((head, rest)) => {
                let child = object
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Object(Default::default()));
                if let Value::Object(map) = child {
                    insert_path(map, rest);
                }
            },
            None => {
                object.insert(path.to_string(), json!(1));
            },
        }
    }
}
