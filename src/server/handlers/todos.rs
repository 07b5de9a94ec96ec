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

use crate::database::entities::{
    projects::Entity as Projects, todos, todos::Entity as Todos,
};
use crate::server::app::AppState;
use crate::server::extract::CurrentUser;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: Option<String>,
    pub project_id: i32,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<i32>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateTodoStatusRequest {
    pub status: String,
}

async fn find_owned(state: &AppState, id: i32, user_id: i32) -> Result<todos::Model, StatusCode> {
    let todo = Todos::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    if todo.user_id != user_id {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(todo)
}

/// The referenced project must exist and belong to the caller.
async fn check_project(state: &AppState, project_id: i32, user_id: i32) -> Result<(), StatusCode> {
    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    if project.user_id != user_id {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/todos",
    responses(
        (status = 200, description = "List the caller's todos", body = [todos::Model])
    )
)]
pub async fn list_todos(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<todos::Model>>, StatusCode> {
    let todos = Todos::find()
        .filter(todos::Column::UserId.eq(user.id))
        .all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(todos))
}

#[utoipa::path(
    post,
    path = "/api/v1/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = todos::Model),
        (status = 422, description = "Invalid priority, status, or project")
    )
)]
pub async fn create_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<todos::Model>), StatusCode> {
    if !todos::is_valid_priority(&payload.priority) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let status = payload
        .status
        .unwrap_or_else(|| todos::DEFAULT_STATUS.to_string());
    if !todos::is_valid_status(&status) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    check_project(&state, payload.project_id, user.id).await?;

    let now = Utc::now();
    let todo = todos::ActiveModel {
        title: Set(payload.title),
        description: Set(payload.description),
        priority: Set(payload.priority),
        status: Set(status),
        project_id: Set(payload.project_id),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let todo = todo.insert(&state.db).await.map_err(|err| {
        error!("Database error creating todo: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(todo)))
}

#[utoipa::path(
    get,
    path = "/api/v1/todos/{id}",
    params(
        ("id" = i32, Path, description = "Todo ID")
    ),
    responses(
        (status = 200, description = "Todo found", body = todos::Model),
        (status = 404, description = "Todo not found")
    )
)]
pub async fn get_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<todos::Model>, StatusCode> {
    let todo = find_owned(&state, id, user.id).await?;
    Ok(Json(todo))
}

#[utoipa::path(
    put,
    path = "/api/v1/todos/{id}",
    params(
        ("id" = i32, Path, description = "Todo ID")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = todos::Model),
        (status = 404, description = "Todo not found"),
        (status = 422, description = "Invalid priority, status, or project")
    )
)]
pub async fn update_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<todos::Model>, StatusCode> {
    let todo = find_owned(&state, id, user.id).await?;

    if let Some(priority) = &payload.priority {
        if !todos::is_valid_priority(priority) {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }
    if let Some(status) = &payload.status {
        if !todos::is_valid_status(status) {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }
    if let Some(project_id) = payload.project_id {
        check_project(&state, project_id, user.id).await?;
    }

    let mut todo: todos::ActiveModel = todo.into();
    if let Some(title) = payload.title {
        todo.title = Set(title);
    }
    if let Some(description) = payload.description {
        todo.description = Set(Some(description));
    }
    if let Some(priority) = payload.priority {
        todo.priority = Set(priority);
    }
    if let Some(status) = payload.status {
        todo.status = Set(status);
    }
    if let Some(project_id) = payload.project_id {
        todo.project_id = Set(project_id);
    }
    todo.updated_at = Set(Utc::now());

    let todo = todo
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(todo))
}

#[utoipa::path(
    delete,
    path = "/api/v1/todos/{id}",
    params(
        ("id" = i32, Path, description = "Todo ID")
    ),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 404, description = "Todo not found")
    )
)]
pub async fn delete_todo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let todo = find_owned(&state, id, user.id).await?;

    Todos::delete_by_id(todo.id)
        .exec(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/todos/{id}/status",
    params(
        ("id" = i32, Path, description = "Todo ID")
    ),
    request_body = UpdateTodoStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = todos::Model),
        (status = 404, description = "Todo not found"),
        (status = 422, description = "Unknown status")
    )
)]
pub async fn update_todo_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTodoStatusRequest>,
) -> Result<Json<todos::Model>, StatusCode> {
    if !todos::is_valid_status(&payload.status) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let todo = find_owned(&state, id, user.id).await?;

    let mut todo: todos::ActiveModel = todo.into();
    todo.status = Set(payload.status);
    todo.updated_at = Set(Utc::now());

    let todo = todo
        .update(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(todo))
}
