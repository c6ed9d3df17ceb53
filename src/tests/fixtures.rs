//! In-memory report containers for tests.

use crate::common::encoding::encode_utf16le;
use crate::package::paths;
use serde_json::{Value, json};
use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Builds a ZIP container entry by entry, in insertion order.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry stored as UTF-8 text.
    pub fn utf8(self, name: &str, text: &str) -> Self {
        self.bytes(name, text.as_bytes().to_vec())
    }

    /// Add an entry stored as UTF-16LE text without BOM, the producer's usual encoding.
    pub fn utf16(self, name: &str, text: &str) -> Self {
        self.bytes(name, encode_utf16le(text))
    }

    /// Add a JSON entry stored as UTF-16LE.
    pub fn json16(self, name: &str, value: &Value) -> Self {
        self.utf16(name, &value.to_string())
    }

    /// Add a JSON entry stored as UTF-8.
    pub fn json8(self, name: &str, value: &Value) -> Self {
        self.utf8(name, &value.to_string())
    }

    pub fn bytes(mut self, name: &str, data: Vec<u8>) -> Self {
        self.entries.push((name.to_string(), data));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.entries {
            zip.start_file(name.as_str(), options).expect("start entry");
            zip.write_all(data).expect("write entry");
        }
        zip.finish().expect("finish container").into_inner()
    }
}

/// A `DataMashup` entry whose package holds `section` as its section document.
pub fn mashup_entry(section: &str) -> Vec<u8> {
    let package = ContainerBuilder::new()
        .utf8("[Content_Types].xml", "<Types/>")
        .utf8(paths::MASHUP_SECTION, section)
        .build();
    let mut data = 0u32.to_le_bytes().to_vec();
    data.extend_from_slice(&(package.len() as u32).to_le_bytes());
    data.extend_from_slice(&package);
    // Permissions and metadata blocks follow the package; readers ignore them
    data.extend_from_slice(&0u32.to_le_bytes());
    data
}

/// Legacy visual container with geometry and a double-encoded config.
pub fn legacy_container(name: &str, visual_type: &str, single_visual_extra: Value) -> Value {
    let mut single = json!({"visualType": visual_type});
    if let (Value::Object(target), Value::Object(extra)) = (&mut single, single_visual_extra) {
        target.extend(extra);
    }
    json!({
        "x": 10, "y": 20, "z": 0, "width": 200, "height": 100,
        "config": json!({"name": name, "singleVisual": single}).to_string()
    })
}

/// `vcObjects` navigating to `bookmark`.
pub fn bookmark_link(bookmark: &str) -> Value {
    json!({"vcObjects": {"visualLink": [{"properties": {
        "show": {"expr": {"Literal": {"Value": "true"}}},
        "type": {"expr": {"Literal": {"Value": "'Bookmark'"}}},
        "bookmark": {"expr": {"Literal": {"Value": format!("'{}'", bookmark)}}}
    }}]}})
}

/// Tabular model with two related tables, a measure and a partition query.
pub fn sales_schema() -> Value {
    json!({
        "name": "b3f1c0de",
        "compatibilityLevel": 1550,
        "model": {
            "culture": "en-US",
            "tables": [
                {
                    "name": "Sales",
                    "columns": [
                        {"name": "RowNumber-2662979B", "dataType": "int64", "type": "rowNumber", "isHidden": true},
                        {"name": "OrderId", "dataType": "int64", "sourceColumn": "OrderId"},
                        {"name": "DateKey", "dataType": "dateTime", "sourceColumn": "DateKey"},
                        {"name": "Amount", "dataType": "double", "sourceColumn": "Amount"},
                        {"name": "Margin", "type": "calculated", "expression": "[Amount] * 0.2"}
                    ],
                    "partitions": [{"name": "Sales-1", "source": {"type": "m", "expression": [
                        "let",
                        "    Source = Sql.Database(\"srv\", \"db\")",
                        "in",
                        "    Source"
                    ]}}],
                    "measures": [
                        {"name": "Total Sales", "expression": "SUM(Sales[Amount])", "formatString": "#,0"}
                    ]
                },
                {
                    "name": "Date",
                    "columns": [{"name": "DateKey", "dataType": "dateTime"}],
                    "partitions": [{"name": "Date", "source": {"type": "calculated", "expression": "CALENDARAUTO()"}}]
                }
            ],
            "relationships": [
                {"name": "r1", "fromTable": "Sales", "fromColumn": "DateKey", "toTable": "Date", "toColumn": "DateKey"}
            ]
        }
    })
}

/// Two-page legacy layout: page A with a card, a text box and a button
/// navigating to bookmark `BM1`; page B with one chart.
pub fn two_page_layout() -> Value {
    json!({
        "id": 0,
        "config": json!({
            "version": "5.43",
            "bookmarks": [{
                "name": "BM1",
                "displayName": "Overview",
                "explorationState": {"version": "1.3", "activeSection": "ReportSectionA"}
            }]
        }).to_string(),
        "sections": [
            {
                "name": "ReportSectionA",
                "displayName": "Overview",
                "ordinal": 0,
                "width": 1280, "height": 720,
                "visualContainers": [
                    legacy_container("card1", "card", json!({
                        "projections": {"Values": [{"queryRef": "Sales.Total Sales"}]}
                    })),
                    legacy_container("text1", "textbox", json!({"objects": {"general": [{"properties": {
                        "paragraphs": [{"textRuns": [{"value": "Quarterly "}, {"value": "results"}]}]
                    }}]}})),
                    legacy_container("button1", "actionButton", bookmark_link("BM1"))
                ]
            },
            {
                "name": "ReportSectionB",
                "displayName": "Detail",
                "ordinal": 1,
                "visualContainers": [
                    legacy_container("chart1", "clusteredColumnChart", json!({}))
                ]
            }
        ]
    })
}

/// Complete legacy container: version, metadata, model and two-page layout.
pub fn legacy_container_bytes() -> Vec<u8> {
    ContainerBuilder::new()
        .utf16(paths::VERSION, "1.28")
        .json16(paths::METADATA, &json!({"Version": 5, "CreatedFrom": "Cloud", "CreatedFromRelease": "2023.05"}))
        .json16(paths::DATA_MODEL_SCHEMA, &sales_schema())
        .json16("Report/Layout", &two_page_layout())
        .build()
}
