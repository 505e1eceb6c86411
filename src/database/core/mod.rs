//! Core database infrastructure
//!
//! - `DatabaseConn`: SQLite connection handle, explicitly opened and closed
//! - `SchemaInspector`: column metadata for a table
//! - `SchemaMutator`: applies one forward-only DDL statement

mod connection;
mod schema;

pub use connection::DatabaseConn;
pub use schema::{ColumnDescriptor, ColumnSet, SchemaInspector, SchemaMutator};
