//! Calculation definitions: measures, calculated columns and calculated tables.
//!
//! Formula text is opaque payload. It is preserved verbatim and never parsed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculationKind {
    Measure,
    CalculatedColumn,
    CalculatedTable,
}

impl CalculationKind {
    pub fn label(self) -> &'static str {
        match self {
            CalculationKind::Measure => "measure",
            CalculationKind::CalculatedColumn => "calculated column",
            CalculationKind::CalculatedTable => "calculated table",
        }
    }
}

/// A named formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationDefinition {
    /// Owning table
    pub table: String,
    /// Measure or column name; equals `table` for calculated tables.
    /// Measure names are unique within their table.
    pub name: String,
    pub kind: CalculationKind,
    pub expression: String,
    pub format_string: Option<String>,
    pub display_folder: Option<String>,
    pub description: Option<String>,
    pub is_hidden: bool,
}

impl CalculationDefinition {
    /// `Table[Name]` reference.
    pub fn qualified_name(&self) -> String {
        match self.kind {
            CalculationKind::CalculatedTable => self.table.clone(),
            _ => format!("{}[{}]", self.table, self.name),
        }
    }
}
