use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::errors::{SchemaError, SchemaResult};
use crate::schema::model::{
    Column, ColumnType, EdgeData, Position, RelationType, Relationship, SchemaDocument, TableNode,
    TablePatch,
};

/// The authoritative in-memory graph for one open design.
///
/// Every mutation either succeeds or returns an error leaving the graph
/// exactly as it was; no operation is fatal to the session.
#[derive(Clone, Debug, Default)]
pub struct SchemaGraph {
    tables: Vec<TableNode>,
    relationships: Vec<Relationship>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[TableNode] {
        &self.tables
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn get_table(&self, id: &str) -> Option<&TableNode> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn get_relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    pub fn stats(&self) -> String {
        format!(
            "Tables: {}, Relationships: {}",
            self.tables.len(),
            self.relationships.len()
        )
    }

    /// Append a new table with the two convenience columns every new table
    /// starts with (a primary `id` and a `created_at`) and the default
    /// placement. Table names are not required to be unique.
    pub fn add_table(&mut self, name: &str) -> &TableNode {
        let table = TableNode {
            id: format!("table-{}", Uuid::new_v4()),
            name: name.to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    ty: ColumnType::Int,
                    nullable: false,
                    primary: true,
                },
                Column {
                    name: "created_at".to_string(),
                    ty: ColumnType::Date,
                    nullable: false,
                    primary: false,
                },
            ],
            position: Position::default(),
            description: String::new(),
        };
        debug!("Adding table '{}' as {}", name, table.id);
        self.tables.push(table);
        &self.tables[self.tables.len() - 1]
    }

    /// Apply a partial update to one table. Unknown ids are surfaced as
    /// [`SchemaError::TableNotFound`] rather than silently ignored.
    pub fn update_table(&mut self, id: &str, patch: TablePatch) -> SchemaResult<()> {
        let table = self
            .tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SchemaError::TableNotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            table.name = name;
        }
        if let Some(columns) = patch.columns {
            table.columns = columns;
        }
        if let Some(description) = patch.description {
            table.description = description;
        }
        Ok(())
    }

    /// Remove a table and every relationship whose source or target is the
    /// table. The cascade is mandatory: a relationship referencing a
    /// removed table would violate the graph's integrity.
    pub fn delete_table(&mut self, id: &str) -> SchemaResult<()> {
        if self.get_table(id).is_none() {
            return Err(SchemaError::TableNotFound(id.to_string()));
        }
        self.tables.retain(|t| t.id != id);
        let before = self.relationships.len();
        self.relationships
            .retain(|r| r.source_table_id != id && r.target_table_id != id);
        debug!(
            "Deleted table {} and {} touching relationship(s); {}",
            id,
            before - self.relationships.len(),
            self.stats()
        );
        Ok(())
    }

    /// Create a `1:N` relationship between two existing tables. Rejected
    /// when the endpoints are the same table or a relationship for the
    /// ordered (source, target) pair already exists, regardless of type.
    pub fn connect(&mut self, source_id: &str, target_id: &str) -> SchemaResult<&Relationship> {
        if source_id == target_id {
            return Err(SchemaError::SelfReference(source_id.to_string()));
        }
        for id in [source_id, target_id] {
            if self.get_table(id).is_none() {
                return Err(SchemaError::TableNotFound(id.to_string()));
            }
        }
        if self
            .relationships
            .iter()
            .any(|r| r.source_table_id == source_id && r.target_table_id == target_id)
        {
            return Err(SchemaError::DuplicateRelationship {
                source_table: source_id.to_string(),
                target: target_id.to_string(),
            });
        }

        let relationship_type = RelationType::default();
        let relationship = Relationship {
            id: format!("edge-{}", Uuid::new_v4()),
            source_table_id: source_id.to_string(),
            target_table_id: target_id.to_string(),
            relationship_type,
            edge_data: EdgeData {
                label: Some(relationship_type.to_string()),
                ..EdgeData::default()
            },
        };
        self.relationships.push(relationship);
        Ok(&self.relationships[self.relationships.len() - 1])
    }

    /// Remove a single relationship by identity.
    pub fn disconnect(&mut self, relationship_id: &str) -> SchemaResult<()> {
        if self.get_relationship(relationship_id).is_none() {
            return Err(SchemaError::RelationshipNotFound(
                relationship_id.to_string(),
            ));
        }
        self.relationships.retain(|r| r.id != relationship_id);
        Ok(())
    }

    /// Change the cardinality of a relationship. The presentation label is
    /// kept in step with the type.
    pub fn retype_relationship(
        &mut self,
        relationship_id: &str,
        new_type: RelationType,
    ) -> SchemaResult<()> {
        let relationship = self
            .relationships
            .iter_mut()
            .find(|r| r.id == relationship_id)
            .ok_or_else(|| SchemaError::RelationshipNotFound(relationship_id.to_string()))?;
        relationship.relationship_type = new_type;
        relationship.edge_data.label = Some(new_type.to_string());
        Ok(())
    }

    /// The full document sent to persistence on save.
    pub fn to_document(&self) -> SchemaDocument {
        SchemaDocument {
            tables: self.tables.clone(),
            relationships: self.relationships.clone(),
        }
    }

    /// Rebuild a graph from a persisted or imported document, verifying the
    /// structural invariants the mutation paths enforce. A rejected
    /// document leaves whatever graph the caller holds untouched.
    pub fn from_document(document: SchemaDocument) -> SchemaResult<Self> {
        let table_ids: HashSet<&str> = document.tables.iter().map(|t| t.id.as_str()).collect();
        let mut seen_pairs = HashSet::new();

        for relationship in &document.relationships {
            for table in [
                relationship.source_table_id.as_str(),
                relationship.target_table_id.as_str(),
            ] {
                if !table_ids.contains(table) {
                    return Err(SchemaError::UnknownTableReference {
                        relationship: relationship.id.clone(),
                        table: table.to_string(),
                    });
                }
            }
            if relationship.source_table_id == relationship.target_table_id {
                return Err(SchemaError::SelfReference(
                    relationship.source_table_id.clone(),
                ));
            }
            if !seen_pairs.insert((
                relationship.source_table_id.as_str(),
                relationship.target_table_id.as_str(),
            )) {
                return Err(SchemaError::DuplicateRelationship {
                    source_table: relationship.source_table_id.clone(),
                    target: relationship.target_table_id.clone(),
                });
            }
        }

        Ok(Self {
            tables: document.tables,
            relationships: document.relationships,
        })
    }
}
