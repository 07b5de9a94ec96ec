use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use utoipa::ToSchema;

use crate::errors::{SchemaError, SchemaResult};

/// Column types supported by the designer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Varchar,
    Int,
    Boolean,
    Date,
    Text,
    Decimal,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Int => "INT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Text => "TEXT",
            ColumnType::Decimal => "DECIMAL",
        };
        write!(f, "{}", name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary: bool,
}

/// 2D canvas coordinate. A layout hint only, with no schema semantics.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, ToSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        // Placement used for new tables and for stored tables without a position
        Self { x: 100.0, y: 100.0 }
    }
}

/// One table node in a design. Table names are not required to be unique;
/// the `id` is the identity relationships refer to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct TableNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, ToSchema)]
pub enum RelationType {
    #[default]
    #[serde(rename = "1:N")]
    OneToMany,
    #[serde(rename = "N:1")]
    ManyToOne,
    #[serde(rename = "M:N")]
    ManyToMany,
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RelationType::OneToMany => "1:N",
            RelationType::ManyToOne => "N:1",
            RelationType::ManyToMany => "M:N",
        };
        write!(f, "{}", label)
    }
}

/// Presentation attributes carried on a relationship. Opaque to the model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct EdgeData {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_animated")]
    pub animated: bool,
    #[serde(default = "default_style")]
    pub style: Value,
}

impl Default for EdgeData {
    fn default() -> Self {
        Self {
            label: None,
            animated: default_animated(),
            style: default_style(),
        }
    }
}

fn default_animated() -> bool {
    true
}

fn default_style() -> Value {
    json!({ "stroke": "#3b82f6", "strokeWidth": 2 })
}

/// A typed relationship between two tables of a design.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct Relationship {
    pub id: String,
    pub source_table_id: String,
    pub target_table_id: String,
    #[serde(default)]
    pub relationship_type: RelationType,
    #[serde(default)]
    pub edge_data: EdgeData,
}

/// Partial update for one table. Absent fields are left untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default, ToSchema)]
pub struct TablePatch {
    pub name: Option<String>,
    pub columns: Option<Vec<Column>>,
    pub description: Option<String>,
}

/// The full `{tables, relationships}` document exchanged with persistence
/// and with export/import. Both collections are always replaced together.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ToSchema)]
pub struct SchemaDocument {
    pub tables: Vec<TableNode>,
    pub relationships: Vec<Relationship>,
}

impl SchemaDocument {
    /// Parse a portable document, rejecting anything that is not an object
    /// carrying both `tables` and `relationships` arrays.
    pub fn from_value(value: &Value) -> SchemaResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidDocument("document must be an object".into()))?;
        for field in ["tables", "relationships"] {
            match obj.get(field) {
                Some(v) if v.is_array() => {}
                Some(_) => {
                    return Err(SchemaError::InvalidDocument(format!(
                        "'{}' must be an array",
                        field
                    )))
                }
                None => {
                    return Err(SchemaError::InvalidDocument(format!(
                        "missing required field '{}'",
                        field
                    )))
                }
            }
        }
        serde_json::from_value(value.clone())
            .map_err(|e| SchemaError::InvalidDocument(e.to_string()))
    }

    pub fn parse(s: &str) -> SchemaResult<Self> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| SchemaError::InvalidDocument(e.to_string()))?;
        Self::from_value(&value)
    }
}

/// Portable document produced by export: the design metadata plus the
/// same collections as persisted. Import reads only the collections; the
/// design's own name and description are not replaced by an import.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct ExportDocument {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub tables: Vec<TableNode>,
    pub relationships: Vec<Relationship>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_round_trips_wire_names() {
        for (ty, wire) in [
            (ColumnType::Varchar, "\"VARCHAR\""),
            (ColumnType::Int, "\"INT\""),
            (ColumnType::Boolean, "\"BOOLEAN\""),
            (ColumnType::Date, "\"DATE\""),
            (ColumnType::Text, "\"TEXT\""),
            (ColumnType::Decimal, "\"DECIMAL\""),
        ] {
            assert_eq!(serde_json::to_string(&ty).unwrap(), wire);
            let parsed: ColumnType = serde_json::from_str(wire).unwrap();
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn relation_type_uses_cardinality_labels() {
        assert_eq!(
            serde_json::to_string(&RelationType::OneToMany).unwrap(),
            "\"1:N\""
        );
        let parsed: RelationType = serde_json::from_str("\"M:N\"").unwrap();
        assert_eq!(parsed, RelationType::ManyToMany);
        assert_eq!(RelationType::default(), RelationType::OneToMany);
    }

    #[test]
    fn table_without_position_gets_default_placement() {
        let table: TableNode = serde_json::from_value(serde_json::json!({
            "id": "table-1",
            "name": "users"
        }))
        .unwrap();
        assert_eq!(table.position.x, 100.0);
        assert_eq!(table.position.y, 100.0);
        assert!(table.columns.is_empty());
    }

    #[test]
    fn document_requires_both_collections() {
        let err = SchemaDocument::from_value(&serde_json::json!({ "tables": [] })).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDocument(_)));

        let err =
            SchemaDocument::from_value(&serde_json::json!({ "tables": {}, "relationships": [] }))
                .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDocument(_)));

        let doc =
            SchemaDocument::from_value(&serde_json::json!({ "tables": [], "relationships": [] }))
                .unwrap();
        assert!(doc.tables.is_empty());
        assert!(doc.relationships.is_empty());
    }

    #[test]
    fn document_rejects_unparsable_json() {
        let err = SchemaDocument::parse("{not json").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDocument(_)));
    }
}
