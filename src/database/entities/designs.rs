use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{SchemaError, SchemaResult};
use crate::schema::SchemaDocument;

/// One database design. The designed tables and relationships are stored
/// as JSON text columns and always replaced together on save.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Design)]
#[sea_orm(table_name = "designs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub tables: String,
    #[sea_orm(column_type = "Text")]
    pub relationships: String,
    pub user_id: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parse the stored columns back into a schema document.
    pub fn document(&self) -> SchemaResult<SchemaDocument> {
        let tables = serde_json::from_str(&self.tables)
            .map_err(|e| SchemaError::InvalidDocument(format!("stored tables: {}", e)))?;
        let relationships = serde_json::from_str(&self.relationships)
            .map_err(|e| SchemaError::InvalidDocument(format!("stored relationships: {}", e)))?;
        Ok(SchemaDocument {
            tables,
            relationships,
        })
    }
}
