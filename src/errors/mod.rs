//! Domain-specific error types for taskdeck
//!
//! Structured error types for the two domains with non-trivial failure
//! semantics: the schema graph model and authentication.
//!
//! # Error Categories
//!
//! - **SchemaError**: schema designer operations (tables, relationships,
//!   document import/export, persistence)
//! - **AuthError**: authentication and session handling

pub mod auth;
pub mod schema;

pub use auth::AuthError;
pub use schema::SchemaError;

/// Result type alias for schema graph operations
pub type SchemaResult<T> = Result<T, SchemaError>;
