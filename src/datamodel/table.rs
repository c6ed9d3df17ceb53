//! Tables and columns of the tabular model.

use crate::schema::ShapeTag;
use serde::{Deserialize, Serialize};

/// Declared data type of a column.
///
/// Serialized as the producer's own spelling (`string`, `int64`, ...), so
/// types this crate does not know survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    String,
    Int64,
    Double,
    Decimal,
    Boolean,
    DateTime,
    Binary,
    Variant,
    Other(String),
}

impl DataType {
    /// Parse a declared type; matching is case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => DataType::String,
            "int64" | "integer" | "whole number" => DataType::Int64,
            "double" | "decimal number" => DataType::Double,
            "decimal" | "currency" => DataType::Decimal,
            "boolean" | "bool" => DataType::Boolean,
            "datetime" | "date" | "time" => DataType::DateTime,
            "binary" => DataType::Binary,
            "variant" => DataType::Variant,
            _ => DataType::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DataType::String => "string",
            DataType::Int64 => "int64",
            DataType::Double => "double",
            DataType::Decimal => "decimal",
            DataType::Boolean => "boolean",
            DataType::DateTime => "dateTime",
            DataType::Binary => "binary",
            DataType::Variant => "variant",
            DataType::Other(raw) => raw,
        }
    }
}

impl From<String> for DataType {
    fn from(raw: String) -> Self {
        DataType::parse(&raw)
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        data_type.as_str().to_string()
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Unique within the owning table
    pub name: String,
    pub data_type: DataType,
    /// False when `data_type` is the configured fallback
    pub type_declared: bool,
    pub is_calculated: bool,
    /// Formula text of a calculated column, verbatim
    pub expression: Option<String>,
    pub is_hidden: bool,
    pub shape: ShapeTag,
}

/// A table of the tabular model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Unique within the model
    pub name: String,
    pub columns: Vec<Column>,
    /// Defined by a formula rather than loaded by a query
    pub is_calculated: bool,
    pub is_hidden: bool,
    /// Row count when the producer recorded one
    pub row_count: Option<u64>,
    pub shape: ShapeTag,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}
