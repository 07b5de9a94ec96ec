//! API integration tests
//!
//! Tests for the REST endpoints: auth flow, owner scoping, project and
//! todo CRUD, and the schema designer document endpoints.

use anyhow::Result;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use sea_orm::Database;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use taskdeck::auth::AuthService;
use taskdeck::database::connection::setup_database;
use taskdeck::server::app::create_app;

/// Create a test server with a file-backed database and one known user.
async fn setup_test_server() -> Result<(TestServer, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    AuthService::new(db.clone())
        .create_user("Test User", "test@example.com", "secret")
        .await?;

    let app = create_app(db, None).await?;
    let server = TestServer::new(app)?;

    Ok((server, temp_file))
}

async fn login(server: &TestServer, email: &str, password: &str) -> Result<String> {
    let response = server
        .post("/api/v1/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    Ok(body["token"].as_str().expect("token in response").to_string())
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header"),
    )
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "taskdeck-server");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_login_and_logout_flow() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    // Wrong password is rejected
    let response = server
        .post("/api/v1/login")
        .json(&json!({ "email": "test@example.com", "password": "wrong" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    // Good credentials issue a token that authenticates requests
    let token = login(&server, "test@example.com", "secret").await?;
    let (name, value) = bearer(&token);
    let response = server.get("/api/v1/projects").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Logout revokes the token
    let (name, value) = bearer(&token);
    let response = server.post("/api/v1/logout").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let (name, value) = bearer(&token);
    let response = server.get("/api/v1/projects").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() -> Result<()> {
    let (server, _db) = setup_test_server().await?;

    let response = server.get("/api/v1/projects").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server.post("/api/v1/designs").json(&json!({ "name": "x" })).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_change_password() -> Result<()> {
    let (server, _db) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;

    // Wrong old password rejected
    let (name, value) = bearer(&token);
    let response = server
        .put("/api/v1/password")
        .add_header(name, value)
        .json(&json!({ "old_password": "nope", "new_password": "next" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let (name, value) = bearer(&token);
    let response = server
        .put("/api/v1/password")
        .add_header(name, value)
        .json(&json!({ "old_password": "secret", "new_password": "next" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    // Old password no longer works, new one does
    let response = server
        .post("/api/v1/login")
        .json(&json!({ "email": "test@example.com", "password": "secret" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    login(&server, "test@example.com", "next").await?;

    Ok(())
}

#[tokio::test]
async fn test_projects_crud_api() -> Result<()> {
    let (server, _db) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;

    // Create
    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/projects")
        .add_header(name, value)
        .json(&json!({ "name": "Test API Project" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    let project_id = created["id"].as_i64().expect("project id");
    assert_eq!(created["name"], "Test API Project");

    // List
    let (name, value) = bearer(&token);
    let response = server.get("/api/v1/projects").add_header(name, value).await;
    let listed: Value = response.json();
    assert_eq!(listed.as_array().expect("array").len(), 1);

    // Update
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/projects/{}", project_id))
        .add_header(name, value)
        .json(&json!({ "name": "Renamed Project" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Renamed Project");

    // Delete
    let (name, value) = bearer(&token);
    let response = server
        .delete(&format!("/api/v1/projects/{}", project_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{}", project_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_resources_are_scoped_to_their_owner() -> Result<()> {
    let (server, temp_file) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/projects")
        .add_header(name, value)
        .json(&json!({ "name": "Private Project" }))
        .await;
    let project_id = response.json::<Value>()["id"].as_i64().expect("project id");

    // Second user cannot see or delete the first user's project
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());
    let db = Database::connect(&db_url).await?;
    AuthService::new(db)
        .create_user("Other User", "other@example.com", "secret")
        .await?;
    let other_token = login(&server, "other@example.com", "secret").await?;

    let (name, value) = bearer(&other_token);
    let response = server
        .get(&format!("/api/v1/projects/{}", project_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let (name, value) = bearer(&other_token);
    let response = server
        .delete(&format!("/api/v1/projects/{}", project_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_todos_crud_and_status_transition() -> Result<()> {
    let (server, _db) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/projects")
        .add_header(name, value)
        .json(&json!({ "name": "Board" }))
        .await;
    let project_id = response.json::<Value>()["id"].as_i64().expect("project id");

    // Unknown priority is rejected
    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/todos")
        .add_header(name, value)
        .json(&json!({
            "title": "Bad", "priority": "urgent", "project_id": project_id
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    // Create with default status
    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/todos")
        .add_header(name, value)
        .json(&json!({
            "title": "Write docs", "priority": "medium", "project_id": project_id
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let todo: Value = response.json();
    let todo_id = todo["id"].as_i64().expect("todo id");
    assert_eq!(todo["status"], "pending");

    // Status-only transition
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/todos/{}/status", todo_id))
        .add_header(name, value)
        .json(&json!({ "status": "in_progress" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "in_progress");

    // Unknown status rejected
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/todos/{}/status", todo_id))
        .add_header(name, value)
        .json(&json!({ "status": "paused" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    // Project-scoped listing
    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{}/todos", project_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>().as_array().expect("array").len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_deleting_project_cascades_to_todos() -> Result<()> {
    let (server, _db) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/projects")
        .add_header(name, value)
        .json(&json!({ "name": "Doomed" }))
        .await;
    let project_id = response.json::<Value>()["id"].as_i64().expect("project id");

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/todos")
        .add_header(name, value)
        .json(&json!({
            "title": "Orphan-to-be", "priority": "low", "project_id": project_id
        }))
        .await;
    let todo_id = response.json::<Value>()["id"].as_i64().expect("todo id");

    let (name, value) = bearer(&token);
    server
        .delete(&format!("/api/v1/projects/{}", project_id))
        .add_header(name, value)
        .await;

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/todos/{}", todo_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

fn two_table_document() -> Value {
    json!({
        "tables": [
            {
                "id": "table-users",
                "name": "users",
                "columns": [
                    { "name": "id", "type": "INT", "nullable": false, "primary": true }
                ],
                "position": { "x": 40.0, "y": 80.0 },
                "description": ""
            },
            {
                "id": "table-orders",
                "name": "orders",
                "columns": [
                    { "name": "id", "type": "INT", "nullable": false, "primary": true },
                    { "name": "total", "type": "DECIMAL", "nullable": false, "primary": false }
                ]
            }
        ],
        "relationships": [
            {
                "id": "edge-1",
                "source_table_id": "table-orders",
                "target_table_id": "table-users",
                "relationship_type": "N:1"
            }
        ]
    })
}

async fn create_design(server: &TestServer, token: &str) -> Result<i64> {
    let (name, value) = bearer(token);
    let response = server
        .post("/api/v1/designs")
        .add_header(name, value)
        .json(&json!({ "name": "Webshop", "description": "test design" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    Ok(response.json::<Value>()["id"].as_i64().expect("design id"))
}

#[tokio::test]
async fn test_design_schema_save_and_reload() -> Result<()> {
    let (server, _db) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;
    let design_id = create_design(&server, &token).await?;

    // Whole-document save
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/designs/{}/schema", design_id))
        .add_header(name, value)
        .json(&two_table_document())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Export reproduces the saved document, including defaults filled in
    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/designs/{}/export", design_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let exported: Value = response.json();
    assert_eq!(exported["tables"].as_array().expect("tables").len(), 2);
    assert_eq!(
        exported["relationships"].as_array().expect("relationships").len(),
        1
    );
    // The second table carried no position; the default placement applies
    assert_eq!(exported["tables"][1]["position"]["x"], 100.0);
    assert_eq!(exported["tables"][1]["position"]["y"], 100.0);
    assert_eq!(exported["relationships"][0]["relationship_type"], "N:1");

    Ok(())
}

#[tokio::test]
async fn test_design_schema_rejects_invariant_violations() -> Result<()> {
    let (server, _db) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;
    let design_id = create_design(&server, &token).await?;

    // Self-referencing relationship
    let mut document = two_table_document();
    document["relationships"][0]["target_table_id"] = json!("table-orders");
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/designs/{}/schema", design_id))
        .add_header(name, value)
        .json(&document)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    // Duplicate ordered pair
    let mut document = two_table_document();
    let duplicate = document["relationships"][0].clone();
    document["relationships"]
        .as_array_mut()
        .expect("array")
        .push(duplicate);
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/designs/{}/schema", design_id))
        .add_header(name, value)
        .json(&document)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    // Relationship to a table that is not part of the design
    let mut document = two_table_document();
    document["relationships"][0]["target_table_id"] = json!("table-missing");
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/designs/{}/schema", design_id))
        .add_header(name, value)
        .json(&document)
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    // None of the rejected saves touched the stored schema
    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/designs/{}/export", design_id))
        .add_header(name, value)
        .await;
    let exported: Value = response.json();
    assert!(exported["tables"].as_array().expect("tables").is_empty());

    Ok(())
}

#[tokio::test]
async fn test_import_malformed_document_leaves_schema_unchanged() -> Result<()> {
    let (server, _db) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;
    let design_id = create_design(&server, &token).await?;

    // Prime the design with a known schema
    let (name, value) = bearer(&token);
    server
        .put(&format!("/api/v1/designs/{}/schema", design_id))
        .add_header(name, value)
        .json(&two_table_document())
        .await;

    // 'tables' missing entirely
    let (name, value) = bearer(&token);
    let response = server
        .post(&format!("/api/v1/designs/{}/import", design_id))
        .add_header(name, value)
        .json(&json!({ "relationships": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/designs/{}/export", design_id))
        .add_header(name, value)
        .await;
    let exported: Value = response.json();
    assert_eq!(exported["tables"].as_array().expect("tables").len(), 2);

    // A well-formed import replaces the schema wholesale
    let (name, value) = bearer(&token);
    let response = server
        .post(&format!("/api/v1/designs/{}/import", design_id))
        .add_header(name, value)
        .json(&json!({ "tables": [], "relationships": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/designs/{}/export", design_id))
        .add_header(name, value)
        .await;
    let exported: Value = response.json();
    assert!(exported["tables"].as_array().expect("tables").is_empty());

    Ok(())
}

#[tokio::test]
async fn test_generate_sql_endpoint() -> Result<()> {
    let (server, _db) = setup_test_server().await?;
    let token = login(&server, "test@example.com", "secret").await?;
    let design_id = create_design(&server, &token).await?;

    let (name, value) = bearer(&token);
    server
        .put(&format!("/api/v1/designs/{}/schema", design_id))
        .add_header(name, value)
        .json(&two_table_document())
        .await;

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/designs/{}/sql", design_id))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let sql = body["sql"].as_str().expect("sql text");
    assert!(sql.contains("CREATE TABLE users (\n  id INT NOT NULL PRIMARY KEY\n);"));
    assert!(sql.contains(
        "ALTER TABLE orders ADD CONSTRAINT fk_orders_users FOREIGN KEY (id) REFERENCES users(id);"
    ));

    Ok(())
}
