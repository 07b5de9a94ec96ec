use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::database::entities::{projects, projects::Entity as Projects, todos, todos::Entity as Todos};
use crate::server::app::AppState;
use crate::server::extract::CurrentUser;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: String,
}

/// Fetch a project scoped to its owner; another user's project is a 404.
async fn find_owned(
    state: &AppState,
    id: i32,
    user_id: i32,
) -> Result<projects::Model, StatusCode> {
    let project = Projects::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    if project.user_id != user_id {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(project)
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "List the caller's projects", body = [projects::Model])
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<projects::Model>>, StatusCode> {
    let projects = Projects::find()
        .filter(projects::Column::UserId.eq(user.id))
        .all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(projects))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = projects::Model)
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<projects::Model>), StatusCode> {
    let now = Utc::now();
    let project = projects::ActiveModel {
        name: Set(payload.name),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let project = project.insert(&state.db).await.map_err(|err| {
        error!("Database error creating project: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project found", body = projects::Model),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<projects::Model>, StatusCode> {
    let project = find_owned(&state, id, user.id).await?;
    Ok(Json(project))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = projects::Model),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<projects::Model>, StatusCode> {
    let project = find_owned(&state, id, user.id).await?;

    let mut project: projects::ActiveModel = project.into();
    project.name = Set(payload.name);
    project.updated_at = Set(Utc::now());

    let project = project
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    responses(
        (status = 204, description = "Project deleted; its todos cascade"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let project = find_owned(&state, id, user.id).await?;

    // Todos are removed by the FK cascade; the store owns that rule
    Projects::delete_by_id(project.id)
        .exec(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/todos",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Todos of one project", body = [todos::Model]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_project_todos(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<todos::Model>>, StatusCode> {
    let project = find_owned(&state, id, user.id).await?;

    let todos = Todos::find()
        .filter(todos::Column::ProjectId.eq(project.id))
        .filter(todos::Column::UserId.eq(user.id))
        .all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(todos))
}
