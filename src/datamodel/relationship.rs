//! Relationships between table columns.

use crate::fragment::access::{bool_at, i64_at, str_at};
use crate::schema::ShapeTag;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// One side of a relationship as the producer spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    One,
    Many,
}

impl End {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "one" | "1" => Some(End::One),
            "many" | "m" | "*" => Some(End::Many),
            _ => None,
        }
    }
}

impl Cardinality {
    fn from_ends(from: End, to: End) -> Self {
        match (from, to) {
            (End::One, End::One) => Cardinality::OneToOne,
            (End::Many, End::Many) => Cardinality::ManyToMany,
            _ => Cardinality::OneToMany,
        }
    }

    /// Parse `fromCardinality` / `toCardinality`; absent sides default to many→one.
    pub fn from_sides(from: Option<&str>, to: Option<&str>) -> Self {
        let from = from.and_then(End::parse).unwrap_or(End::Many);
        let to = to.and_then(End::parse).unwrap_or(End::One);
        Self::from_ends(from, to)
    }

    /// Parse a legacy `M:1` style cardinality.
    pub fn from_legacy(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((from, to)) => Self::from_sides(Some(from), Some(to)),
            None => Cardinality::OneToMany,
        }
    }

    fn sides(self) -> (&'static str, &'static str) {
        match self {
            Cardinality::OneToOne => ("one", "one"),
            Cardinality::OneToMany => ("many", "one"),
            Cardinality::ManyToMany => ("many", "many"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "*:1",
            Cardinality::ManyToMany => "*:*",
        }
    }
}

/// Direction in which filters propagate across a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossFilter {
    Single,
    Both,
    Automatic,
}

impl CrossFilter {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bothdirections" | "both" => CrossFilter::Both,
            "automatic" => CrossFilter::Automatic,
            _ => CrossFilter::Single,
        }
    }

    pub fn from_legacy(code: i64) -> Self {
        match code {
            2 => CrossFilter::Both,
            0 => CrossFilter::Automatic,
            _ => CrossFilter::Single,
        }
    }

    fn as_model_str(self) -> &'static str {
        match self {
            CrossFilter::Single => "oneDirection",
            CrossFilter::Both => "bothDirections",
            CrossFilter::Automatic => "automatic",
        }
    }

    fn legacy_code(self) -> i64 {
        match self {
            CrossFilter::Single => 1,
            CrossFilter::Both => 2,
            CrossFilter::Automatic => 0,
        }
    }
}

/// A relationship between two table columns.
///
/// Relationships whose endpoints do not exist among the decoded tables are
/// kept with `resolved == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub name: Option<String>,
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub cardinality: Cardinality,
    pub is_active: bool,
    pub cross_filter: CrossFilter,
    pub resolved: bool,
    /// Shape the relationship was read from
    pub shape: ShapeTag,
}

impl Relationship {
    /// Read a relationship from a fragment already classified as `shape`.
    ///
    /// Returns `None` for shapes that are not relationship shapes.
    pub fn from_fragment(value: &Value, shape: ShapeTag) -> Option<Self> {
        let text = |key: &str| str_at(value, key).unwrap_or_default().to_string();
        let relationship = match shape {
            ShapeTag::RelationshipExplicit | ShapeTag::RelationshipImplicit => Relationship {
                name: str_at(value, "name").map(str::to_string),
                from_table: text("fromTable"),
                from_column: text("fromColumn"),
                to_table: text("toTable"),
                to_column: text("toColumn"),
                cardinality: Cardinality::from_sides(
                    str_at(value, "fromCardinality"),
                    str_at(value, "toCardinality"),
                ),
                is_active: bool_at(value, "isActive").unwrap_or(true),
                cross_filter: str_at(value, "crossFilteringBehavior")
                    .map(CrossFilter::parse)
                    .unwrap_or(CrossFilter::Single),
                resolved: true,
                shape,
            },
            ShapeTag::RelationshipLegacy => Relationship {
                name: str_at(value, "Name").map(str::to_string),
                from_table: text("FromTableName"),
                from_column: text("FromColumnName"),
                to_table: text("ToTableName"),
                to_column: text("ToColumnName"),
                cardinality: str_at(value, "Cardinality")
                    .map(Cardinality::from_legacy)
                    .unwrap_or(Cardinality::OneToMany),
                is_active: bool_at(value, "IsActive").unwrap_or(true),
                cross_filter: i64_at(value, "CrossFilteringBehavior")
                    .map(CrossFilter::from_legacy)
                    .unwrap_or(CrossFilter::Single),
                resolved: true,
                shape,
            },
            _ => return None,
        };
        Some(relationship)
    }

    /// Re-encode as the minimal fragment of the shape it was read from.
    pub fn to_fragment(&self) -> Value {
        let (from_side, to_side) = self.cardinality.sides();
        let mut map = Map::new();
        match self.shape {
            ShapeTag::RelationshipLegacy => {
                if let Some(name) = &self.name {
                    map.insert("Name".into(), json!(name));
                }
                map.insert("FromTableName".into(), json!(self.from_table));
                map.insert("FromColumnName".into(), json!(self.from_column));
                map.insert("ToTableName".into(), json!(self.to_table));
                map.insert("ToColumnName".into(), json!(self.to_column));
                map.insert("Cardinality".into(), json!(legacy_cardinality(self.cardinality)));
                map.insert("IsActive".into(), json!(self.is_active));
                map.insert(
                    "CrossFilteringBehavior".into(),
                    json!(self.cross_filter.legacy_code()),
                );
            },
            _ => {
                if let Some(name) = &self.name {
                    map.insert("name".into(), json!(name));
                }
                map.insert("fromTable".into(), json!(self.from_table));
                map.insert("fromColumn".into(), json!(self.from_column));
                map.insert("toTable".into(), json!(self.to_table));
                map.insert("toColumn".into(), json!(self.to_column));
                if self.shape == ShapeTag::RelationshipExplicit {
                    map.insert("fromCardinality".into(), json!(from_side));
                }
                if to_side != "one" || self.shape == ShapeTag::RelationshipExplicit {
                    map.insert("toCardinality".into(), json!(to_side));
                }
                if !self.is_active {
                    map.insert("isActive".into(), json!(false));
                }
                if self.cross_filter != CrossFilter::Single {
                    map.insert(
                        "crossFilteringBehavior".into(),
                        json!(self.cross_filter.as_model_str()),
                    );
                }
            },
        }
        Value::Object(map)
    }

    /// `Table[Column] → Table[Column]` description.
    pub fn describe(&self) -> String {
        format!(
            "{}[{}] → {}[{}]",
            self.from_table, self.from_column, self.to_table, self.to_column
        )
    }
}

fn legacy_cardinality(cardinality: Cardinality) -> &'static str {
    match cardinality {
        Cardinality::OneToOne => "1:1",
        Cardinality::OneToMany => "M:1",
        Cardinality::ManyToMany => "M:M",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Family, classify};

    #[test]
    fn test_cardinality_mapping() {
        assert_eq!(Cardinality::from_sides(Some("many"), Some("one")), Cardinality::OneToMany);
        assert_eq!(Cardinality::from_sides(Some("one"), Some("many")), Cardinality::OneToMany);
        assert_eq!(Cardinality::from_sides(Some("one"), Some("one")), Cardinality::OneToOne);
        assert_eq!(Cardinality::from_sides(Some("many"), Some("many")), Cardinality::ManyToMany);
        assert_eq!(Cardinality::from_sides(None, None), Cardinality::OneToMany);
        assert_eq!(Cardinality::from_legacy("M:M"), Cardinality::ManyToMany);
        assert_eq!(Cardinality::from_legacy("1:1"), Cardinality::OneToOne);
    }

    #[test]
    fn test_cross_filter() {
        assert_eq!(CrossFilter::parse("bothDirections"), CrossFilter::Both);
        assert_eq!(CrossFilter::parse("oneDirection"), CrossFilter::Single);
        assert_eq!(CrossFilter::from_legacy(2), CrossFilter::Both);
        assert_eq!(CrossFilter::from_legacy(1), CrossFilter::Single);
    }

    #[test]
    fn test_read_legacy() {
        let value = json!({
            "FromTableName": "Sales", "FromColumnName": "DateKey",
            "ToTableName": "Date", "ToColumnName": "DateKey",
            "Cardinality": "M:1", "IsActive": false, "CrossFilteringBehavior": 2
        });
        let rel = Relationship::from_fragment(&value, ShapeTag::RelationshipLegacy).unwrap();
        assert_eq!(rel.describe(), "Sales[DateKey] → Date[DateKey]");
        assert!(!rel.is_active);
        assert_eq!(rel.cross_filter, CrossFilter::Both);
        assert!(Relationship::from_fragment(&value, ShapeTag::TableStub).is_none());
    }

    #[test]
    fn test_fragment_round_trip() {
        let fragments = [
            json!({
                "name": "r1", "fromTable": "Sales", "fromColumn": "Key",
                "toTable": "Date", "toColumn": "Key",
                "fromCardinality": "one", "toCardinality": "one",
                "crossFilteringBehavior": "bothDirections"
            }),
            json!({
                "fromTable": "Sales", "fromColumn": "Key",
                "toTable": "Date", "toColumn": "Key", "toCardinality": "many",
                "isActive": false
            }),
            json!({
                "FromTableName": "Sales", "FromColumnName": "Key",
                "ToTableName": "Date", "ToColumnName": "Key", "Cardinality": "1:1"
            }),
        ];
        for fragment in fragments {
            let shape = classify(&fragment, Family::Relationship);
            let rel = Relationship::from_fragment(&fragment, shape).unwrap();
            let encoded = rel.to_fragment();
            assert_eq!(classify(&encoded, Family::Relationship), shape);
            assert_eq!(Relationship::from_fragment(&encoded, shape).unwrap(), rel);
        }
    }
}
