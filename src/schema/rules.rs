//! Marker-key rule table.
//!
//! Each rule names the keys (dotted paths allowed) that must be present for a
//! fragment to match a shape. The table is grouped by family in the order the
//! shapes were introduced; [`ordered`] derives the evaluation order.

use super::{Family, ShapeTag};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One candidate shape of a family.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub family: Family,
    pub tag: ShapeTag,
    pub markers: &'static [&'static str],
}

const fn rule(family: Family, tag: ShapeTag, markers: &'static [&'static str]) -> Rule {
    Rule {
        family,
        tag,
        markers,
    }
}

/// All known shapes.
pub static RULES: &[Rule] = &[
    // Data model root
    rule(Family::DataModel, ShapeTag::TableCollection, &["tables"]),
    rule(Family::DataModel, ShapeTag::TabularModel, &["tables", "relationships"]),
    rule(
        Family::DataModel,
        ShapeTag::TabularDatabase,
        &["name", "compatibilityLevel", "model"],
    ),
    // Tables
    rule(Family::Table, ShapeTag::TableStub, &["name"]),
    rule(Family::Table, ShapeTag::TableDefinition, &["name", "columns"]),
    rule(Family::Table, ShapeTag::CalculatedTable, &["name", "partitions"]),
    rule(Family::Table, ShapeTag::TableWithPartitions, &["name", "columns", "partitions"]),
    // Columns
    rule(Family::Column, ShapeTag::ColumnStub, &["name"]),
    rule(Family::Column, ShapeTag::CalculatedColumn, &["name", "expression"]),
    rule(Family::Column, ShapeTag::DataColumn, &["name", "dataType"]),
    // Relationships
    rule(
        Family::Relationship,
        ShapeTag::RelationshipImplicit,
        &["fromTable", "fromColumn", "toTable", "toColumn"],
    ),
    rule(
        Family::Relationship,
        ShapeTag::RelationshipExplicit,
        &["fromTable", "fromColumn", "toTable", "toColumn", "fromCardinality"],
    ),
    rule(
        Family::Relationship,
        ShapeTag::RelationshipLegacy,
        &["FromTableName", "FromColumnName", "ToTableName", "ToColumnName"],
    ),
    // Shared expressions
    rule(Family::Expression, ShapeTag::SharedExpression, &["name", "expression"]),
    // Legacy layout root
    rule(Family::Layout, ShapeTag::LayoutPages, &["pages"]),
    rule(Family::Layout, ShapeTag::LayoutSectionsBare, &["sections"]),
    rule(Family::Layout, ShapeTag::LayoutSections, &["sections", "config"]),
    // Pages
    rule(Family::Page, ShapeTag::LegacySectionUnnamed, &["visualContainers"]),
    rule(
        Family::Page,
        ShapeTag::LegacySection,
        &["name", "displayName", "visualContainers"],
    ),
    rule(Family::Page, ShapeTag::EnhancedPage, &["name", "displayName", "displayOption"]),
    // Visual containers
    rule(Family::VisualContainer, ShapeTag::ConfigOnlyContainer, &["config"]),
    rule(
        Family::VisualContainer,
        ShapeTag::PositionedContainer,
        &["x", "y", "width", "height", "config"],
    ),
    // Visual configuration
    rule(Family::VisualConfig, ShapeTag::UnnamedSingleVisual, &["singleVisual"]),
    rule(Family::VisualConfig, ShapeTag::SingleVisual, &["name", "singleVisual"]),
    rule(Family::VisualConfig, ShapeTag::VisualGroup, &["name", "singleVisualGroup"]),
    rule(Family::VisualConfig, ShapeTag::EnhancedVisual, &["name", "position", "visual"]),
    rule(
        Family::VisualConfig,
        ShapeTag::EnhancedVisualGroup,
        &["name", "position", "visualGroup"],
    ),
    // Bookmarks
    rule(Family::Bookmark, ShapeTag::BookmarkStub, &["name"]),
    rule(Family::Bookmark, ShapeTag::BookmarkGroup, &["name", "children"]),
    rule(Family::Bookmark, ShapeTag::BookmarkState, &["name", "explorationState"]),
    // Custom visuals
    rule(
        Family::CustomVisual,
        ShapeTag::ResourcePackage,
        &["resourcePackage.name", "resourcePackage.type"],
    ),
    rule(Family::CustomVisual, ShapeTag::PublicCustomVisual, &["name"]),
    rule(
        Family::CustomVisual,
        ShapeTag::CustomVisualManifest,
        &["visual.guid", "visual.displayName"],
    ),
];

static ORDERED: Lazy<HashMap<Family, Vec<Rule>>> = Lazy::new(|| {
    let mut by_family: HashMap<Family, Vec<Rule>> = HashMap::new();
    for rule in RULES {
        by_family.entry(rule.family).or_default().push(*rule);
    }
    // Stable: equally specific rules keep table order
    for rules in by_family.values_mut() {
        rules.sort_by(|a, b| b.markers.len().cmp(&a.markers.len()));
    }
    by_family
});

/// Rules of `family`, most specific first.
pub fn ordered(family: Family) -> &'static [Rule] {
    ORDERED.get(&family).map(Vec::as_slice).unwrap_or(&[])
}

/// The rule that produces `tag`.
pub fn rule_for(tag: ShapeTag) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.tag == tag)
}
