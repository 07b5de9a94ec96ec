pub mod auth;
pub mod designs;
pub mod health;
pub mod projects;
pub mod todos;
