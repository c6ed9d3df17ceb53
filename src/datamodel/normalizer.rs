//! Data Model Normalizer.
//!
//! Walks the classified model definition in a fixed order: tables (with their
//! columns, measures and partitions), then relationships validated against the
//! extracted tables, then shared expressions, then the embedded query package.
//! Tables are independent of one another and may be processed on the rayon
//! pool; results are merged in document order so output does not depend on
//! scheduling.

use super::calculation::{CalculationDefinition, CalculationKind};
use super::query::{QueryOrigin, QueryTransform, SourceKind, classify_script};
use super::relationship::Relationship;
use super::table::{Column, DataType, Table};
use super::DataModel;
use crate::common::{NameScope, Partial, WarningKind, Warnings};
use crate::config::DecodeOptions;
use crate::fragment::Fragment;
use crate::fragment::access::{array_at, bool_at, first_str, i64_at, str_at, text_or_lines};
use crate::package::paths;
use crate::package::parts::DataModelParts;
use crate::schema::{Family, ShapeTag, classify};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashSet;

const ENTRY: &str = paths::DATA_MODEL_SCHEMA;

/// Normalize the data-model entries of a container.
pub fn normalize(parts: &DataModelParts, options: &DecodeOptions) -> Partial<DataModel> {
    let mut warnings = parts.warnings.clone();
    let mut model = DataModel::default();

    if let Some(entry) = &parts.schema {
        match Fragment::from_entry(entry) {
            Ok(fragment) => read_schema(&fragment.value, options, &mut model, &mut warnings),
            Err(err) => warnings.push_error(&entry.path, &err),
        }
    } else if parts.binary_model {
        warnings.push(
            WarningKind::UnsupportedEncoding,
            Some(paths::DATA_MODEL),
            "model is stored only as a binary backup; tables, relationships and calculations are not decoded",
        );
    } else {
        tracing::debug!("no model definition entry");
    }

    read_mashup(parts, options.max_entry_size, &mut model, &mut warnings);

    tracing::debug!(
        tables = model.tables.len(),
        relationships = model.relationships.len(),
        calculations = model.calculations.len(),
        queries = model.queries.len(),
        "normalized data model"
    );
    Partial::new(model, warnings)
}

fn read_schema(root: &Value, options: &DecodeOptions, model: &mut DataModel, warnings: &mut Warnings) {
    let shape = classify(root, Family::DataModel);
    tracing::debug!(?shape, "classified model definition");
    let body = match shape {
        ShapeTag::TabularDatabase => &root["model"],
        ShapeTag::TabularModel | ShapeTag::TableCollection => root,
        _ => match root.get("model") {
            // Wrapper without the usual database markers
            Some(inner) if classify(inner, Family::DataModel).is_recognized() => inner,
            _ => {
                warnings.push(
                    WarningKind::UnrecognizedShape,
                    Some(ENTRY),
                    "model definition matches no known shape",
                );
                return;
            },
        },
    };

    read_tables(array_at(body, "tables"), options, model, warnings);
    read_relationships(array_at(body, "relationships"), model, warnings);
    read_expressions(array_at(body, "expressions"), model, warnings);
}

/// Everything extracted from one table fragment.
struct TableOutput {
    table: Table,
    calculations: Vec<CalculationDefinition>,
    queries: Vec<QueryTransform>,
    warnings: Warnings,
}

fn read_tables(tables: &[Value], options: &DecodeOptions, model: &mut DataModel, warnings: &mut Warnings) {
    let outputs: Vec<Option<TableOutput>> = if options.parallel_for(tables.len()) {
        tables
            .par_iter()
            .enumerate()
            .map(|(index, value)| read_table(index, value, options))
            .collect()
    } else {
        tables
            .iter()
            .enumerate()
            .map(|(index, value)| read_table(index, value, options))
            .collect()
    };

    let mut names = NameScope::new();
    for (index, output) in outputs.into_iter().enumerate() {
        let Some(mut output) = output else {
            warnings.push(
                WarningKind::UnrecognizedShape,
                Some(ENTRY),
                format!("table #{} matches no known shape", index),
            );
            continue;
        };
        warnings.append(&mut output.warnings);

        let original = output.table.name.clone();
        let (name, renamed) = names.claim(&original);
        if renamed {
            warnings.push(
                WarningKind::DuplicateName,
                Some(ENTRY),
                format!("table '{}' renamed to '{}'", original, name),
            );
            for calculation in &mut output.calculations {
                calculation.table = name.clone();
                if calculation.kind == CalculationKind::CalculatedTable {
                    calculation.name = name.clone();
                }
            }
            for query in &mut output.queries {
                query.name = name.clone();
            }
            output.table.name = name;
        }

        model.tables.push(output.table);
        model.calculations.extend(output.calculations);
        model.queries.extend(output.queries);
    }
}

fn read_table(index: usize, value: &Value, options: &DecodeOptions) -> Option<TableOutput> {
    let shape = classify(value, Family::Table);
    if !shape.is_recognized() {
        return None;
    }
    let name = str_at(value, "name").unwrap_or_default().to_string();
    let mut warnings = Warnings::new();
    let mut calculations = Vec::new();
    let mut queries = Vec::new();

    // Columns
    let mut columns = Vec::new();
    let mut column_names = NameScope::new();
    for (col_index, raw) in array_at(value, "columns").iter().enumerate() {
        if str_at(raw, "type") == Some("rowNumber") {
            continue;
        }
        let Some(mut column) = read_column(raw, options) else {
            warnings.push(
                WarningKind::UnrecognizedShape,
                Some(ENTRY),
                format!("column #{} of table '{}' matches no known shape", col_index, name),
            );
            continue;
        };
        let (unique, renamed) = column_names.claim(&column.name);
        if renamed {
            warnings.push(
                WarningKind::DuplicateName,
                Some(ENTRY),
                format!("column '{}[{}]' renamed to '{}'", name, column.name, unique),
            );
            column.name = unique;
        }
        if let Some(expression) = &column.expression {
            calculations.push(CalculationDefinition {
                table: name.clone(),
                name: column.name.clone(),
                kind: CalculationKind::CalculatedColumn,
                expression: expression.clone(),
                format_string: None,
                display_folder: str_at(raw, "displayFolder").map(str::to_string),
                description: raw.get("description").and_then(text_or_lines),
                is_hidden: column.is_hidden,
            });
        }
        columns.push(column);
    }

    // Measures
    let mut measure_names = NameScope::new();
    for measure in array_at(value, "measures") {
        let Some(raw_name) = str_at(measure, "name") else {
            warnings.push(
                WarningKind::UnrecognizedShape,
                Some(ENTRY),
                format!("unnamed measure in table '{}'", name),
            );
            continue;
        };
        let (measure_name, renamed) = measure_names.claim(raw_name);
        if renamed {
            warnings.push(
                WarningKind::DuplicateName,
                Some(ENTRY),
                format!("measure '{}[{}]' kept as '{}'", name, raw_name, measure_name),
            );
        }
        calculations.push(CalculationDefinition {
            table: name.clone(),
            name: measure_name,
            kind: CalculationKind::Measure,
            expression: measure.get("expression").and_then(text_or_lines).unwrap_or_default(),
            format_string: str_at(measure, "formatString").map(str::to_string),
            display_folder: str_at(measure, "displayFolder").map(str::to_string),
            description: measure.get("description").and_then(text_or_lines),
            is_hidden: bool_at(measure, "isHidden").unwrap_or(false),
        });
    }

    // Partitions
    let mut is_calculated = false;
    for partition in array_at(value, "partitions") {
        let source_type = str_at(partition, "source.type").unwrap_or("m");
        let script = partition
            .get("source")
            .and_then(|source| source.get("expression").or_else(|| source.get("query")))
            .and_then(text_or_lines);
        let Some(script) = script else {
            continue;
        };
        let calculated = source_type.eq_ignore_ascii_case("calculated");
        if calculated {
            is_calculated = true;
            calculations.push(CalculationDefinition {
                table: name.clone(),
                name: name.clone(),
                kind: CalculationKind::CalculatedTable,
                expression: script.clone(),
                format_string: None,
                display_folder: None,
                description: None,
                is_hidden: false,
            });
        }
        let source_kind = if calculated {
            SourceKind::Calculated
        } else {
            classify_script(&script)
        };
        queries.push(QueryTransform {
            name: name.clone(),
            partition: str_at(partition, "name").map(str::to_string),
            script,
            source_kind,
            origin: QueryOrigin::Partition,
        });
    }

    tracing::trace!(table = %name, index, columns = columns.len(), "read table");
    Some(TableOutput {
        table: Table {
            name,
            columns,
            is_calculated,
            is_hidden: bool_at(value, "isHidden").unwrap_or(false),
            row_count: i64_at(value, "rowCount").and_then(|n| u64::try_from(n).ok()),
            shape,
        },
        calculations,
        queries,
        warnings,
    })
}

fn read_column(value: &Value, options: &DecodeOptions) -> Option<Column> {
    let shape = classify(value, Family::Column);
    if !shape.is_recognized() {
        return None;
    }
    let declared = str_at(value, "dataType").filter(|s| !s.is_empty());
    let expression = value.get("expression").and_then(text_or_lines);
    let is_calculated = expression.is_some() || str_at(value, "type") == Some("calculated");
    Some(Column {
        name: first_str(value, &["name", "explicitName"]).unwrap_or_default().to_string(),
        data_type: declared
            .map(DataType::parse)
            .unwrap_or_else(|| options.default_column_type.clone()),
        type_declared: declared.is_some(),
        is_calculated,
        expression,
        is_hidden: bool_at(value, "isHidden").unwrap_or(false),
        shape,
    })
}

fn read_relationships(relationships: &[Value], model: &mut DataModel, warnings: &mut Warnings) {
    let tables: HashSet<&str> = model.tables.iter().map(|t| t.name.as_str()).collect();
    let endpoints: HashSet<(&str, &str)> = model
        .tables
        .iter()
        .flat_map(|t| t.columns.iter().map(move |c| (t.name.as_str(), c.name.as_str())))
        .collect();

    let mut resolved_list = Vec::with_capacity(relationships.len());
    for (index, value) in relationships.iter().enumerate() {
        let shape = classify(value, Family::Relationship);
        let Some(mut relationship) = Relationship::from_fragment(value, shape) else {
            warnings.push(
                WarningKind::UnrecognizedShape,
                Some(ENTRY),
                format!("relationship #{} matches no known shape", index),
            );
            continue;
        };

        let mut resolved = true;
        for (table, column) in [
            (&relationship.from_table, &relationship.from_column),
            (&relationship.to_table, &relationship.to_column),
        ] {
            let message = if !tables.contains(table.as_str()) {
                format!("relationship {}: table '{}' not found", relationship.describe(), table)
            } else if !endpoints.contains(&(table.as_str(), column.as_str())) {
                format!(
                    "relationship {}: column '{}[{}]' not found",
                    relationship.describe(),
                    table,
                    column
                )
            } else {
                continue;
            };
            resolved = false;
            warnings.push(WarningKind::UnresolvedReference, Some(ENTRY), message);
        }
        relationship.resolved = resolved;
        resolved_list.push(relationship);
    }
    model.relationships = resolved_list;
}

fn read_expressions(expressions: &[Value], model: &mut DataModel, warnings: &mut Warnings) {
    for (index, value) in expressions.iter().enumerate() {
        if classify(value, Family::Expression) != ShapeTag::SharedExpression {
            warnings.push(
                WarningKind::UnrecognizedShape,
                Some(ENTRY),
                format!("expression #{} matches no known shape", index),
            );
            continue;
        }
        let Some(script) = value.get("expression").and_then(text_or_lines) else {
            continue;
        };
        model.queries.push(QueryTransform {
            name: str_at(value, "name").unwrap_or_default().to_string(),
            partition: None,
            source_kind: classify_script(&script),
            script,
            origin: QueryOrigin::SharedExpression,
        });
    }
}

#[cfg(feature = "mashup")]
fn read_mashup(parts: &DataModelParts, limit: u64, model: &mut DataModel, warnings: &mut Warnings) {
    let Some(entry) = &parts.mashup else {
        return;
    };
    let queries = match super::mashup::read_queries(&entry.data, limit) {
        Ok(queries) => queries,
        Err(err) => {
            warnings.push_error(paths::DATA_MASHUP, &err);
            return;
        },
    };
    let known: HashSet<String> = model.queries.iter().map(|q| q.name.clone()).collect();
    for query in queries {
        if known.contains(&query.name) {
            continue;
        }
        model.queries.push(QueryTransform {
            source_kind: classify_script(&query.script),
            name: query.name,
            partition: None,
            script: query.script,
            origin: QueryOrigin::Mashup,
        });
    }
}

#[cfg(not(feature = "mashup"))]
fn read_mashup(_parts: &DataModelParts, _limit: u64, _model: &mut DataModel, _warnings: &mut Warnings) {}
