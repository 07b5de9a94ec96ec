use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;
use utoipa::ToSchema;

use crate::database::entities::{designs, designs::Entity as Designs};
use crate::errors::SchemaError;
use crate::schema::{ExportDocument, Relationship, SchemaDocument, SchemaGraph, TableNode};
use crate::server::app::AppState;
use crate::server::extract::CurrentUser;
use crate::services::DesignService;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateDesignRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tables: Vec<TableNode>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateDesignRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tables: Vec<TableNode>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Map schema errors onto the REST surface: structural violations are
/// conflicts, lookup failures are 404s, malformed documents are 422s.
fn schema_status(err: SchemaError) -> StatusCode {
    match err {
        SchemaError::DesignNotFound(_)
        | SchemaError::TableNotFound(_)
        | SchemaError::RelationshipNotFound(_) => StatusCode::NOT_FOUND,
        SchemaError::SelfReference(_)
        | SchemaError::DuplicateRelationship { .. }
        | SchemaError::UnknownTableReference { .. } => StatusCode::CONFLICT,
        SchemaError::InvalidDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SchemaError::Database(err) => {
            error!("Database error in design operation: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn validate_document(document: SchemaDocument) -> Result<SchemaDocument, StatusCode> {
    let graph = SchemaGraph::from_document(document).map_err(schema_status)?;
    Ok(graph.to_document())
}

fn serialize_collection<T: serde::Serialize>(collection: &[T]) -> Result<String, StatusCode> {
    serde_json::to_string(collection).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[utoipa::path(
    get,
    path = "/api/v1/designs",
    responses(
        (status = 200, description = "List the caller's designs", body = [designs::Model])
    )
)]
pub async fn list_designs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<designs::Model>>, StatusCode> {
    let designs = Designs::find()
        .filter(designs::Column::UserId.eq(user.id))
        .all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(designs))
}

#[utoipa::path(
    post,
    path = "/api/v1/designs",
    request_body = CreateDesignRequest,
    responses(
        (status = 201, description = "Design created", body = designs::Model),
        (status = 409, description = "Initial schema violates a structural invariant")
    )
)]
pub async fn create_design(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateDesignRequest>,
) -> Result<(StatusCode, Json<designs::Model>), StatusCode> {
    let document = validate_document(SchemaDocument {
        tables: payload.tables,
        relationships: payload.relationships,
    })?;

    let now = Utc::now();
    let design = designs::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        tables: Set(serialize_collection(&document.tables)?),
        relationships: Set(serialize_collection(&document.relationships)?),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let design = design.insert(&state.db).await.map_err(|err| {
        error!("Database error creating design: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(design)))
}

#[utoipa::path(
    get,
    path = "/api/v1/designs/{id}",
    params(
        ("id" = i32, Path, description = "Design ID")
    ),
    responses(
        (status = 200, description = "Design found", body = designs::Model),
        (status = 404, description = "Design not found")
    )
)]
pub async fn get_design(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<designs::Model>, StatusCode> {
    let design = DesignService::new(state.db.clone())
        .find_owned(id, user.id)
        .await
        .map_err(schema_status)?;
    Ok(Json(design))
}

#[utoipa::path(
    put,
    path = "/api/v1/designs/{id}",
    params(
        ("id" = i32, Path, description = "Design ID")
    ),
    request_body = UpdateDesignRequest,
    responses(
        (status = 200, description = "Design replaced", body = designs::Model),
        (status = 404, description = "Design not found"),
        (status = 409, description = "Schema violates a structural invariant")
    )
)]
pub async fn update_design(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDesignRequest>,
) -> Result<Json<designs::Model>, StatusCode> {
    let design = DesignService::new(state.db.clone())
        .find_owned(id, user.id)
        .await
        .map_err(schema_status)?;

    let document = validate_document(SchemaDocument {
        tables: payload.tables,
        relationships: payload.relationships,
    })?;

    // The owner never changes; all other fields are replaced together
    let mut design: designs::ActiveModel = design.into();
    design.name = Set(payload.name);
    design.description = Set(payload.description);
    design.tables = Set(serialize_collection(&document.tables)?);
    design.relationships = Set(serialize_collection(&document.relationships)?);
    design.updated_at = Set(Utc::now());

    let design = design
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(design))
}

#[utoipa::path(
    delete,
    path = "/api/v1/designs/{id}",
    params(
        ("id" = i32, Path, description = "Design ID")
    ),
    responses(
        (status = 204, description = "Design deleted"),
        (status = 404, description = "Design not found")
    )
)]
pub async fn delete_design(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let design = DesignService::new(state.db.clone())
        .find_owned(id, user.id)
        .await
        .map_err(schema_status)?;

    Designs::delete_by_id(design.id)
        .exec(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/designs/{id}/schema",
    params(
        ("id" = i32, Path, description = "Design ID")
    ),
    request_body = SchemaDocument,
    responses(
        (status = 200, description = "Schema replaced wholesale", body = designs::Model),
        (status = 404, description = "Design not found"),
        (status = 409, description = "Schema violates a structural invariant"),
        (status = 422, description = "Malformed document")
    )
)]
pub async fn save_schema(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<Value>,
) -> Result<Json<designs::Model>, StatusCode> {
    let document = SchemaDocument::from_value(&payload).map_err(schema_status)?;

    let design = DesignService::new(state.db.clone())
        .replace_schema(id, user.id, document)
        .await
        .map_err(schema_status)?;

    Ok(Json(design))
}

#[utoipa::path(
    get,
    path = "/api/v1/designs/{id}/export",
    params(
        ("id" = i32, Path, description = "Design ID")
    ),
    responses(
        (status = 200, description = "Portable schema document", body = ExportDocument),
        (status = 404, description = "Design not found")
    )
)]
pub async fn export_schema(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ExportDocument>, StatusCode> {
    let document = DesignService::new(state.db.clone())
        .export(id, user.id)
        .await
        .map_err(schema_status)?;

    Ok(Json(document))
}

#[utoipa::path(
    post,
    path = "/api/v1/designs/{id}/import",
    params(
        ("id" = i32, Path, description = "Design ID")
    ),
    request_body = SchemaDocument,
    responses(
        (status = 200, description = "Schema imported, replacing the stored one", body = designs::Model),
        (status = 404, description = "Design not found"),
        (status = 409, description = "Imported schema violates a structural invariant"),
        (status = 422, description = "Malformed document; stored schema unchanged")
    )
)]
pub async fn import_schema(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<Value>,
) -> Result<Json<designs::Model>, StatusCode> {
    let design = DesignService::new(state.db.clone())
        .import(id, user.id, &payload)
        .await
        .map_err(schema_status)?;

    Ok(Json(design))
}

#[utoipa::path(
    get,
    path = "/api/v1/designs/{id}/sql",
    params(
        ("id" = i32, Path, description = "Design ID")
    ),
    responses(
        (status = 200, description = "SQL text for the design"),
        (status = 404, description = "Design not found")
    )
)]
pub async fn generate_sql(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>, StatusCode> {
    let sql = DesignService::new(state.db.clone())
        .generate_sql(id, user.id)
        .await
        .map_err(schema_status)?;

    Ok(Json(json!({ "sql": sql })))
}
