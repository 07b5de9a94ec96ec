//! Database functionality tests
//!
//! Tests for database migrations, entity operations, and data integrity

use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set,
};
use tempfile::NamedTempFile;

use taskdeck::auth::AuthService;
use taskdeck::database::entities::{designs, projects, sessions, todos, users};
use taskdeck::database::seed_data;
use taskdeck::database::setup_database;

/// Create a test database connection with migrations
async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, temp_file))
}

async fn create_test_user(db: &DatabaseConnection) -> Result<users::Model> {
    let user = AuthService::new(db.clone())
        .create_user("Test User", "test@example.com", "secret")
        .await?;
    Ok(user)
}

#[tokio::test]
async fn test_database_migrations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    // Verify all tables exist by attempting to query them
    let all_users = users::Entity::find().all(&db).await?;
    assert_eq!(all_users.len(), 0);

    let all_sessions = sessions::Entity::find().all(&db).await?;
    assert_eq!(all_sessions.len(), 0);

    let all_projects = projects::Entity::find().all(&db).await?;
    assert_eq!(all_projects.len(), 0);

    let all_todos = todos::Entity::find().all(&db).await?;
    assert_eq!(all_todos.len(), 0);

    let all_designs = designs::Entity::find().all(&db).await?;
    assert_eq!(all_designs.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_todo_crud_operations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = create_test_user(&db).await?;

    let now = Utc::now();
    let project = projects::ActiveModel {
        name: Set("Test Project".to_string()),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    // Create
    let todo = todos::ActiveModel {
        title: Set("Write migration".to_string()),
        description: Set(Some("sea-orm migration for the new table".to_string())),
        priority: Set("high".to_string()),
        status: Set(todos::DEFAULT_STATUS.to_string()),
        project_id: Set(project.id),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    assert_eq!(todo.status, "pending");

    // Update
    let mut active: todos::ActiveModel = todo.clone().into();
    active.status = Set("done".to_string());
    let updated = active.update(&db).await?;
    assert_eq!(updated.status, "done");

    // Filtered read
    let done = todos::Entity::find()
        .filter(todos::Column::Status.eq("done"))
        .all(&db)
        .await?;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, todo.id);

    // Delete
    updated.delete(&db).await?;
    let remaining = todos::Entity::find().all(&db).await?;
    assert_eq!(remaining.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_deleting_user_cascades_to_owned_rows() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = create_test_user(&db).await?;
    AuthService::new(db.clone())
        .login("test@example.com", "secret")
        .await?;

    let now = Utc::now();
    let project = projects::ActiveModel {
        name: Set("Doomed".to_string()),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    todos::ActiveModel {
        title: Set("Orphan-to-be".to_string()),
        description: Set(None),
        priority: Set("low".to_string()),
        status: Set(todos::DEFAULT_STATUS.to_string()),
        project_id: Set(project.id),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    designs::ActiveModel {
        name: Set("Doomed Design".to_string()),
        description: Set(None),
        tables: Set("[]".to_string()),
        relationships: Set("[]".to_string()),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    user.delete(&db).await?;

    assert_eq!(sessions::Entity::find().all(&db).await?.len(), 0);
    assert_eq!(projects::Entity::find().all(&db).await?.len(), 0);
    assert_eq!(todos::Entity::find().all(&db).await?.len(), 0);
    assert_eq!(designs::Entity::find().all(&db).await?.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_design_document_parsing() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = create_test_user(&db).await?;

    let now = Utc::now();
    let design = designs::ActiveModel {
        name: Set("Parsed".to_string()),
        description: Set(None),
        tables: Set(r#"[{"id":"table-a","name":"accounts"}]"#.to_string()),
        relationships: Set("[]".to_string()),
        user_id: Set(user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let document = design.document()?;
    assert_eq!(document.tables.len(), 1);
    assert_eq!(document.tables[0].name, "accounts");
    // Missing position falls back to the default placement
    assert_eq!(document.tables[0].position.x, 100.0);

    // Corrupt stored JSON surfaces as an error rather than an empty schema
    let mut active: designs::ActiveModel = design.into();
    active.tables = Set("not json".to_string());
    let corrupt = active.update(&db).await?;
    assert!(corrupt.document().is_err());

    Ok(())
}

#[tokio::test]
async fn test_seed_data_is_idempotent() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    seed_data::create_example_data(&db).await?;
    seed_data::create_example_data(&db).await?;

    let demo_users = users::Entity::find()
        .filter(users::Column::Email.eq(seed_data::EXAMPLE_EMAIL))
        .all(&db)
        .await?;
    assert_eq!(demo_users.len(), 1);

    let seeded_projects = projects::Entity::find().all(&db).await?;
    assert_eq!(seeded_projects.len(), 1);

    let seeded_designs = designs::Entity::find().all(&db).await?;
    assert_eq!(seeded_designs.len(), 1);
    let document = seeded_designs[0].document()?;
    assert!(!document.tables.is_empty());
    assert_eq!(document.relationships.len(), 1);

    Ok(())
}
