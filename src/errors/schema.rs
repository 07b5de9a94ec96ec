//! Schema designer error types
//!
//! Structured error types for the schema graph model: table and
//! relationship management, document import/export, and persistence.
//!
//! Every structural rejection is a local, non-fatal condition. The graph
//! that produced the error is left unchanged so the caller can retry.

use thiserror::Error;

/// Schema designer errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Design not found by ID
    #[error("Design {0} not found")]
    DesignNotFound(i32),

    /// Table not found by identifier
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// Relationship not found by identifier
    #[error("Relationship '{0}' not found")]
    RelationshipNotFound(String),

    /// Relationship from a table to itself
    #[error("Table '{0}' cannot be related to itself")]
    SelfReference(String),

    /// Relationship already exists for the ordered (source, target) pair
    #[error("Relationship {source_table} -> {target} already exists")]
    DuplicateRelationship {
        /// Source table identifier
        source_table: String,
        /// Target table identifier
        target: String,
    },

    /// Relationship references a table absent from the design
    #[error("Relationship '{relationship}' references unknown table '{table}'")]
    UnknownTableReference {
        /// Relationship identifier
        relationship: String,
        /// Missing table identifier
        table: String,
    },

    /// Document could not be parsed or is missing required fields
    #[error("Invalid schema document: {0}")]
    InvalidDocument(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}
