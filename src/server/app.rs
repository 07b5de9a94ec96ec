use anyhow::Result;
use axum::{
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use super::handlers::{auth, designs, health, projects, todos};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::logout,
        auth::change_password,
        projects::list_projects,
        projects::create_project,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        projects::list_project_todos,
        todos::list_todos,
        todos::create_todo,
        todos::get_todo,
        todos::update_todo,
        todos::delete_todo,
        todos::update_todo_status,
        designs::list_designs,
        designs::create_design,
        designs::get_design,
        designs::update_design,
        designs::delete_design,
        designs::save_schema,
        designs::export_schema,
        designs::import_schema,
        designs::generate_sql,
    ),
    components(schemas(
        auth::LoginRequest,
        auth::LoginResponse,
        auth::ChangePasswordRequest,
        projects::CreateProjectRequest,
        projects::UpdateProjectRequest,
        todos::CreateTodoRequest,
        todos::UpdateTodoRequest,
        todos::UpdateTodoStatusRequest,
        designs::CreateDesignRequest,
        designs::UpdateDesignRequest,
        crate::database::entities::users::Model,
        crate::database::entities::projects::Model,
        crate::database::entities::todos::Model,
        crate::database::entities::designs::Model,
        crate::schema::Column,
        crate::schema::ColumnType,
        crate::schema::EdgeData,
        crate::schema::ExportDocument,
        crate::schema::Position,
        crate::schema::RelationType,
        crate::schema::Relationship,
        crate::schema::SchemaDocument,
        crate::schema::TableNode,
        crate::schema::TablePatch,
    ))
)]
pub struct ApiDoc;

pub async fn create_app(db: DatabaseConnection, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState { db };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // OpenAPI document
        .route("/api-docs/openapi.json", get(openapi_json))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        // Add middleware
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Auth routes
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/password", put(auth::change_password))
        // Project routes
        .route("/projects", get(projects::list_projects))
        .route("/projects", post(projects::create_project))
        .route("/projects/:id", get(projects::get_project))
        .route("/projects/:id", put(projects::update_project))
        .route("/projects/:id", delete(projects::delete_project))
        .route("/projects/:id/todos", get(projects::list_project_todos))
        // Todo routes
        .route("/todos", get(todos::list_todos))
        .route("/todos", post(todos::create_todo))
        .route("/todos/:id", get(todos::get_todo))
        .route("/todos/:id", put(todos::update_todo))
        .route("/todos/:id", delete(todos::delete_todo))
        .route("/todos/:id/status", put(todos::update_todo_status))
        // Design routes
        .route("/designs", get(designs::list_designs))
        .route("/designs", post(designs::create_design))
        .route("/designs/:id", get(designs::get_design))
        .route("/designs/:id", put(designs::update_design))
        .route("/designs/:id", delete(designs::delete_design))
        .route("/designs/:id/schema", put(designs::save_schema))
        .route("/designs/:id/export", get(designs::export_schema))
        .route("/designs/:id/import", post(designs::import_schema))
        .route("/designs/:id/sql", get(designs::generate_sql))
}
