pub mod auth;
pub mod errors;
pub mod schema;

pub mod database;
pub mod server;
pub mod services;
