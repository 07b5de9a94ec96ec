//! Synchronizes schema documents between the store and the graph model.
//!
//! Saves are whole-document: the `tables` and `relationships` columns are
//! always overwritten together, never patched. Concurrent saves on the
//! same design are last-writer-wins. A save that fails validation or the
//! store leaves the row untouched.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::debug;

use crate::database::entities::designs;
use crate::errors::{SchemaError, SchemaResult};
use crate::schema::{ExportDocument, SchemaDocument, SchemaGraph};

pub struct DesignService {
    db: DatabaseConnection,
}

impl DesignService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetch a design scoped to its owner. A design belonging to another
    /// user is reported as not found.
    pub async fn find_owned(&self, design_id: i32, user_id: i32) -> SchemaResult<designs::Model> {
        let design = designs::Entity::find_by_id(design_id)
            .one(&self.db)
            .await?
            .ok_or(SchemaError::DesignNotFound(design_id))?;
        if design.user_id != user_id {
            return Err(SchemaError::DesignNotFound(design_id));
        }
        Ok(design)
    }

    /// Whole-document save: validate the incoming document, then overwrite
    /// the design's `tables` and `relationships` together.
    pub async fn replace_schema(
        &self,
        design_id: i32,
        user_id: i32,
        document: SchemaDocument,
    ) -> SchemaResult<designs::Model> {
        let design = self.find_owned(design_id, user_id).await?;

        // Validation happens before anything touches the row
        let graph = SchemaGraph::from_document(document)?;
        let document = graph.to_document();

        let mut design: designs::ActiveModel = design.into();
        design.tables = Set(serialize_collection(&document.tables)?);
        design.relationships = Set(serialize_collection(&document.relationships)?);
        design.updated_at = Set(Utc::now());

        let design = design.update(&self.db).await?;
        debug!("Saved design {}: {}", design_id, graph.stats());
        Ok(design)
    }

    /// The portable document: the design's metadata plus the persisted
    /// collections.
    pub async fn export(&self, design_id: i32, user_id: i32) -> SchemaResult<ExportDocument> {
        let design = self.find_owned(design_id, user_id).await?;
        let document = design.document()?;
        Ok(ExportDocument {
            name: design.name,
            description: design.description,
            tables: document.tables,
            relationships: document.relationships,
        })
    }

    /// Import a portable document, fully replacing the stored schema.
    /// Malformed documents are rejected with the stored row unchanged.
    pub async fn import(
        &self,
        design_id: i32,
        user_id: i32,
        value: &serde_json::Value,
    ) -> SchemaResult<designs::Model> {
        let document = SchemaDocument::from_value(value)?;
        self.replace_schema(design_id, user_id, document).await
    }

    /// Render the stored design as SQL text.
    pub async fn generate_sql(&self, design_id: i32, user_id: i32) -> SchemaResult<String> {
        let design = self.find_owned(design_id, user_id).await?;
        let graph = SchemaGraph::from_document(design.document()?)?;
        Ok(graph.to_sql(&design.name))
    }
}

fn serialize_collection<T: serde::Serialize>(collection: &[T]) -> SchemaResult<String> {
    serde_json::to_string(collection).map_err(|e| SchemaError::InvalidDocument(e.to_string()))
}
