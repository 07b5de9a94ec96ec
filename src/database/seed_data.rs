use anyhow::Result;
use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::auth::AuthService;
use crate::database::entities::{designs, projects, todos, users};
use crate::schema::{Column as SchemaColumn, ColumnType, SchemaGraph, TablePatch};

pub const EXAMPLE_EMAIL: &str = "demo@taskdeck.dev";

pub async fn create_example_data(db: &DatabaseConnection) -> Result<()> {
    // First check if the example user already exists
    let existing_user = users::Entity::find()
        .filter(users::Column::Email.eq(EXAMPLE_EMAIL))
        .one(db)
        .await?;

    if existing_user.is_some() {
        info!("Example user already exists, skipping seed data creation");
        return Ok(());
    }

    info!("Creating example user and data");

    let user = AuthService::new(db.clone())
        .create_user("Demo User", EXAMPLE_EMAIL, "password")
        .await?;

    let project_id = create_example_project(db, user.id).await?;
    create_example_todos(db, user.id, project_id).await?;
    create_example_design(db, user.id).await?;

    info!("Successfully created example data for user {}", user.id);
    Ok(())
}

async fn create_example_project(db: &DatabaseConnection, user_id: i32) -> Result<i32> {
    let now = Utc::now();
    let project = projects::ActiveModel {
        name: Set("Website Redesign".to_string()),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = projects::Entity::insert(project).exec(db).await?;
    info!("Created example project with ID: {}", result.last_insert_id);
    Ok(result.last_insert_id)
}

async fn create_example_todos(
    db: &DatabaseConnection,
    user_id: i32,
    project_id: i32,
) -> Result<()> {
    let todos_data = vec![
        ("Collect requirements", "high", "done"),
        ("Draft wireframes", "medium", "in_progress"),
        ("Review color palette", "low", "pending"),
        ("Migrate legacy pages", "high", "pending"),
    ];

    let now = Utc::now();
    let mut todo_models = Vec::new();
    for (title, priority, status) in todos_data {
        todo_models.push(todos::ActiveModel {
            title: Set(title.to_string()),
            description: Set(None),
            priority: Set(priority.to_string()),
            status: Set(status.to_string()),
            project_id: Set(project_id),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });
    }

    todos::Entity::insert_many(todo_models).exec(db).await?;
    Ok(())
}

async fn create_example_design(db: &DatabaseConnection, user_id: i32) -> Result<()> {
    let mut graph = SchemaGraph::new();
    let users_table = graph.add_table("users").id.clone();
    let orders_table = graph.add_table("orders").id.clone();

    graph.update_table(
        &orders_table,
        TablePatch {
            columns: Some(vec![
                SchemaColumn {
                    name: "id".to_string(),
                    ty: ColumnType::Int,
                    nullable: false,
                    primary: true,
                },
                SchemaColumn {
                    name: "total".to_string(),
                    ty: ColumnType::Decimal,
                    nullable: false,
                    primary: false,
                },
                SchemaColumn {
                    name: "note".to_string(),
                    ty: ColumnType::Text,
                    nullable: true,
                    primary: false,
                },
            ]),
            ..TablePatch::default()
        },
    )?;
    graph.connect(&orders_table, &users_table)?;

    let document = graph.to_document();
    let now = Utc::now();
    let design = designs::ActiveModel {
        name: Set("Webshop".to_string()),
        description: Set(Some("Example schema for a small webshop".to_string())),
        tables: Set(serde_json::to_string(&document.tables)?),
        relationships: Set(serde_json::to_string(&document.relationships)?),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = designs::Entity::insert(design).exec(db).await?;
    info!("Created example design with ID: {}", result.last_insert_id);
    Ok(())
}
