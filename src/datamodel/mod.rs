//! Data Model Normalizer and its entities.
//!
//! The tabular model is read from the `DataModelSchema` entry and, when the
//! `mashup` feature is enabled, from the embedded query package.

pub mod calculation;
#[cfg(feature = "mashup")]
pub mod mashup;
pub mod normalizer;
pub mod query;
pub mod relationship;
pub mod table;

pub use calculation::{CalculationDefinition, CalculationKind};
pub use normalizer::normalize;
pub use query::{QueryOrigin, QueryTransform, SourceKind};
pub use relationship::{Cardinality, CrossFilter, Relationship};
pub use table::{Column, DataType, Table};

use serde::{Deserialize, Serialize};

/// The normalized data model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub calculations: Vec<CalculationDefinition>,
    pub queries: Vec<QueryTransform>,
}

impl DataModel {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Calculations of the given kind, in document order.
    pub fn calculations_of(&self, kind: CalculationKind) -> impl Iterator<Item = &CalculationDefinition> {
        self.calculations.iter().filter(move |c| c.kind == kind)
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    /// Sum of recorded row counts; `None` when no table recorded one.
    pub fn total_rows(&self) -> Option<u64> {
        self.tables
            .iter()
            .filter_map(|t| t.row_count)
            .reduce(|a, b| a.saturating_add(b))
    }
}
