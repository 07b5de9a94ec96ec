//! Schema designer core: the in-memory graph of tables and relationships
//! for one open database design.
//!
//! The graph is a pure data model. It owns no UI behavior and no
//! persistence; mutations go through [`SchemaGraph`] methods which enforce
//! the structural invariants (no self-referencing relationships, no
//! duplicate relationships for an ordered table pair, no relationship to a
//! table that is not part of the design) before anything reaches the store.

pub mod graph;
pub mod model;
pub mod sql;

pub use graph::SchemaGraph;
pub use model::{
    Column, ColumnType, EdgeData, ExportDocument, Position, RelationType, Relationship,
    SchemaDocument, TableNode, TablePatch,
};
