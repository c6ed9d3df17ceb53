//! Visual Type Resolver.
//!
//! Maps the open vocabulary of visual type tokens onto a closed category set
//! with a human-readable display name. Unknown tokens are expected (new
//! producer releases and marketplace visuals keep adding them) and resolve to
//! [`VisualCategory::Other`] carrying the token itself.

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Closed taxonomy of visual kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualCategory {
    Chart,
    Table,
    Card,
    Kpi,
    Map,
    Slicer,
    Text,
    Shape,
    Image,
    Button,
    QnA,
    /// AI-driven analysis visuals (decomposition tree, key influencers, ...)
    Ai,
    /// Script-rendered visuals (R, Python)
    Script,
    /// A visual supplied by an embedded or marketplace package
    CustomVisual,
    /// A container grouping other visuals
    Group,
    /// An unrecognized token, kept verbatim
    Other(String),
}

impl VisualCategory {
    pub fn label(&self) -> &str {
        match self {
            VisualCategory::Chart => "chart",
            VisualCategory::Table => "table",
            VisualCategory::Card => "card",
            VisualCategory::Kpi => "kpi",
            VisualCategory::Map => "map",
            VisualCategory::Slicer => "slicer",
            VisualCategory::Text => "text",
            VisualCategory::Shape => "shape",
            VisualCategory::Image => "image",
            VisualCategory::Button => "button",
            VisualCategory::QnA => "q&a",
            VisualCategory::Ai => "ai",
            VisualCategory::Script => "script",
            VisualCategory::CustomVisual => "custom-visual",
            VisualCategory::Group => "group",
            VisualCategory::Other(_) => "other",
        }
    }

    #[inline]
    pub fn is_other(&self) -> bool {
        matches!(self, VisualCategory::Other(_))
    }
}

/// Known categories, as storable in the static table.
#[derive(Debug, Clone, Copy)]
enum Known {
    Chart,
    Table,
    Card,
    Kpi,
    Map,
    Slicer,
    Text,
    Shape,
    Image,
    Button,
    QnA,
    Ai,
    Script,
    Group,
}

impl From<Known> for VisualCategory {
    fn from(known: Known) -> Self {
        match known {
            Known::Chart => VisualCategory::Chart,
            Known::Table => VisualCategory::Table,
            Known::Card => VisualCategory::Card,
            Known::Kpi => VisualCategory::Kpi,
            Known::Map => VisualCategory::Map,
            Known::Slicer => VisualCategory::Slicer,
            Known::Text => VisualCategory::Text,
            Known::Shape => VisualCategory::Shape,
            Known::Image => VisualCategory::Image,
            Known::Button => VisualCategory::Button,
            Known::QnA => VisualCategory::QnA,
            Known::Ai => VisualCategory::Ai,
            Known::Script => VisualCategory::Script,
            Known::Group => VisualCategory::Group,
        }
    }
}

/// Compile-time table of known visual type tokens.
static VISUAL_TYPES: phf::Map<&'static str, (Known, &'static str)> = phf_map! {
    // Bar and column
    "barChart" => (Known::Chart, "Stacked Bar Chart"),
    "clusteredBarChart" => (Known::Chart, "Clustered Bar Chart"),
    "stackedBarChart" => (Known::Chart, "Stacked Bar Chart"),
    "hundredPercentStackedBarChart" => (Known::Chart, "100% Stacked Bar Chart"),
    "100stackedBarChart" => (Known::Chart, "100% Stacked Bar Chart"),
    "columnChart" => (Known::Chart, "Stacked Column Chart"),
    "clusteredColumnChart" => (Known::Chart, "Clustered Column Chart"),
    "stackedColumnChart" => (Known::Chart, "Stacked Column Chart"),
    "hundredPercentStackedColumnChart" => (Known::Chart, "100% Stacked Column Chart"),
    "100stackedColumnChart" => (Known::Chart, "100% Stacked Column Chart"),
    // Line and area
    "lineChart" => (Known::Chart, "Line Chart"),
    "areaChart" => (Known::Chart, "Area Chart"),
    "stackedAreaChart" => (Known::Chart, "Stacked Area Chart"),
    "hundredPercentStackedAreaChart" => (Known::Chart, "100% Stacked Area Chart"),
    "lineStackedColumnComboChart" => (Known::Chart, "Line and Stacked Column Chart"),
    "lineClusteredColumnComboChart" => (Known::Chart, "Line and Clustered Column Chart"),
    "ribbonChart" => (Known::Chart, "Ribbon Chart"),
    "waterfallChart" => (Known::Chart, "Waterfall Chart"),
    "funnel" => (Known::Chart, "Funnel Chart"),
    "funnelChart" => (Known::Chart, "Funnel Chart"),
    "scatterChart" => (Known::Chart, "Scatter Chart"),
    "pieChart" => (Known::Chart, "Pie Chart"),
    "donutChart" => (Known::Chart, "Donut Chart"),
    "treemap" => (Known::Chart, "Treemap"),
    "gauge" => (Known::Chart, "Gauge"),
    // Tables
    "tableEx" => (Known::Table, "Table"),
    "table" => (Known::Table, "Table"),
    "pivotTable" => (Known::Table, "Matrix"),
    "matrix" => (Known::Table, "Matrix"),
    // Cards
    "card" => (Known::Card, "Card"),
    "cardVisual" => (Known::Card, "Card (new)"),
    "multiRowCard" => (Known::Card, "Multi-row Card"),
    "kpi" => (Known::Kpi, "KPI"),
    "scorecard" => (Known::Kpi, "Metrics"),
    // Maps
    "map" => (Known::Map, "Map"),
    "filledMap" => (Known::Map, "Filled Map"),
    "shapeMap" => (Known::Map, "Shape Map"),
    "azureMap" => (Known::Map, "Azure Map"),
    "esriVisual" => (Known::Map, "ArcGIS Map"),
    // Slicers
    "slicer" => (Known::Slicer, "Slicer"),
    "advancedSlicerVisual" => (Known::Slicer, "Button Slicer"),
    "listSlicer" => (Known::Slicer, "List Slicer"),
    "textSlicer" => (Known::Slicer, "Text Slicer"),
    // Static content
    "textbox" => (Known::Text, "Text Box"),
    "shape" => (Known::Shape, "Shape"),
    "basicShape" => (Known::Shape, "Shape"),
    "image" => (Known::Image, "Image"),
    "actionButton" => (Known::Button, "Action Button"),
    "pageNavigator" => (Known::Button, "Page Navigator"),
    "bookmarkNavigator" => (Known::Button, "Bookmark Navigator"),
    // Analysis
    "qnaVisual" => (Known::QnA, "Q&A"),
    "decompositionTreeVisual" => (Known::Ai, "Decomposition Tree"),
    "keyDriversVisual" => (Known::Ai, "Key Influencers"),
    "aiNarratives" => (Known::Ai, "Smart Narrative"),
    "scriptVisual" => (Known::Script, "R Script Visual"),
    "pythonVisual" => (Known::Script, "Python Visual"),
    // Containers
    "group" => (Known::Group, "Group"),
    "visualGroup" => (Known::Group, "Group"),
};

/// Resolve a raw visual type token.
///
/// Never fails: unknown tokens yield `(Other(token), token)`.
///
/// # Examples
///
/// ```
/// use pbixkit::report::visual_type::{resolve, VisualCategory};
///
/// assert_eq!(resolve("tableEx"), (VisualCategory::Table, "Table".to_string()));
/// let (category, name) = resolve("futureVisualXYZ");
/// assert_eq!(category, VisualCategory::Other("futureVisualXYZ".to_string()));
/// assert_eq!(name, "futureVisualXYZ");
/// ```
pub fn resolve(raw: &str) -> (VisualCategory, String) {
    match VISUAL_TYPES.get(raw) {
        Some((known, display)) => ((*known).into(), (*display).to_string()),
        None => (VisualCategory::Other(raw.to_string()), raw.to_string()),
    }
}

/// True when `raw` is part of the built-in vocabulary.
#[inline]
pub fn is_known(raw: &str) -> bool {
    VISUAL_TYPES.contains_key(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_tokens() {
        assert_eq!(resolve("actionButton"), (VisualCategory::Button, "Action Button".into()));
        assert_eq!(resolve("pivotTable").0, VisualCategory::Table);
        assert_eq!(resolve("decompositionTreeVisual").1, "Decomposition Tree");
        assert_eq!(resolve("qnaVisual").0, VisualCategory::QnA);
    }

    #[test]
    fn test_unknown_token() {
        let (category, display) = resolve("futureVisualXYZ");
        assert_eq!(category, VisualCategory::Other("futureVisualXYZ".into()));
        assert_eq!(display, "futureVisualXYZ");
        assert!(category.is_other());
        // Lookup is case-sensitive like the producer's own tokens
        assert!(resolve("TableEx").0.is_other());
    }

    proptest! {
        #[test]
        fn resolve_is_total(token in "\\PC{0,40}") {
            let (category, display) = resolve(&token);
            if category.is_other() {
                prop_assert_eq!(display, token.clone());
                prop_assert_eq!(category, VisualCategory::Other(token));
            } else {
                prop_assert!(is_known(&token));
                prop_assert!(!display.is_empty());
            }
        }
    }
}
