//! Query transforms and best-effort source classification.
//!
//! Query scripts are opaque like formulas, but the data source they read from
//! is worth knowing for audits. The first recognized source function in a
//! script decides its [`SourceKind`]; scripts without one are tagged `Other`.

use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Where a query reads its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Sql,
    Excel,
    Csv,
    Web,
    SharePoint,
    OData,
    Odbc,
    Json,
    Folder,
    AnalysisServices,
    /// Data typed into the producer tool
    EnteredData,
    /// Formula-defined table
    Calculated,
    /// Shared parameter value
    Parameter,
    Other,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Sql => "sql",
            SourceKind::Excel => "excel",
            SourceKind::Csv => "csv",
            SourceKind::Web => "web",
            SourceKind::SharePoint => "sharepoint",
            SourceKind::OData => "odata",
            SourceKind::Odbc => "odbc",
            SourceKind::Json => "json",
            SourceKind::Folder => "folder",
            SourceKind::AnalysisServices => "analysis-services",
            SourceKind::EnteredData => "entered-data",
            SourceKind::Calculated => "calculated",
            SourceKind::Parameter => "parameter",
            SourceKind::Other => "other",
        }
    }
}

/// Where in the container a query transform was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryOrigin {
    /// A table partition of the model definition
    Partition,
    /// A shared expression of the model definition
    SharedExpression,
    /// The embedded query package
    Mashup,
}

/// A query script feeding a table (or shared across tables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTransform {
    /// Table name, or the shared query's name
    pub name: String,
    /// Partition name when the script belongs to a table partition
    pub partition: Option<String>,
    pub script: String,
    pub source_kind: SourceKind,
    pub origin: QueryOrigin,
}

const SOURCE_FUNCTIONS: &[(&str, SourceKind)] = &[
    ("Sql.Database", SourceKind::Sql),
    ("Sql.Databases", SourceKind::Sql),
    ("Oracle.Database", SourceKind::Sql),
    ("PostgreSQL.Database", SourceKind::Sql),
    ("MySQL.Database", SourceKind::Sql),
    ("Snowflake.Databases", SourceKind::Sql),
    ("GoogleBigQuery.Database", SourceKind::Sql),
    ("Excel.Workbook", SourceKind::Excel),
    ("Excel.CurrentWorkbook", SourceKind::Excel),
    ("Csv.Document", SourceKind::Csv),
    ("Web.Contents", SourceKind::Web),
    ("Web.Page", SourceKind::Web),
    ("SharePoint.Files", SourceKind::SharePoint),
    ("SharePoint.Contents", SourceKind::SharePoint),
    ("SharePoint.Tables", SourceKind::SharePoint),
    ("OData.Feed", SourceKind::OData),
    ("Odbc.DataSource", SourceKind::Odbc),
    ("Odbc.Query", SourceKind::Odbc),
    ("Json.Document", SourceKind::Json),
    ("Folder.Files", SourceKind::Folder),
    ("Folder.Contents", SourceKind::Folder),
    ("AnalysisServices.Database", SourceKind::AnalysisServices),
    ("AnalysisServices.Databases", SourceKind::AnalysisServices),
    ("#table", SourceKind::EnteredData),
    ("Table.FromRows", SourceKind::EnteredData),
];

static SOURCE_MATCHER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(SOURCE_FUNCTIONS.iter().map(|(pattern, _)| pattern))
        .ok()
});

/// Classify an M query script by the first source function it calls.
pub fn classify_script(script: &str) -> SourceKind {
    if is_parameter(script) {
        return SourceKind::Parameter;
    }
    SOURCE_MATCHER
        .as_ref()
        .and_then(|matcher| matcher.find(script))
        .map(|m| SOURCE_FUNCTIONS[m.pattern().as_usize()].1)
        .unwrap_or(SourceKind::Other)
}

/// True for shared parameter queries (`"value" meta [IsParameterQuery=true, ...]`).
pub fn is_parameter(script: &str) -> bool {
    let compact: String = script.chars().filter(|c| !c.is_whitespace()).collect();
    compact.to_ascii_lowercase().contains("isparameterquery=true")
}
