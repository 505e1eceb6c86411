//! Schema inspection and mutation
//!
//! [`SchemaInspector`] reads the live column metadata of a table through
//! SQLite's `pragma_table_info`. [`SchemaMutator`] applies a single
//! forward-only DDL statement. The mutator is not idempotent on its own:
//! callers gate it behind an inspector check (see [`crate::migrations`]).

use serde::Serialize;
use tracing::info;

use crate::database::core::DatabaseConn;
use crate::error::{MigrateError, Result};

/// One column of a table, as reported by `pragma_table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub cid: i64,
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// Membership test over an introspection result
pub trait ColumnSet {
    /// Case-sensitive match on the column name
    fn contains_column(&self, name: &str) -> bool;
}

impl ColumnSet for [ColumnDescriptor] {
    fn contains_column(&self, name: &str) -> bool {
        self.iter().any(|c| c.name == name)
    }
}

/// Read-only view over the schema of the connected database
pub struct SchemaInspector<'a> {
    db: &'a DatabaseConn,
}

impl<'a> SchemaInspector<'a> {
    pub fn new(db: &'a DatabaseConn) -> Self {
        Self { db }
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        self.db.table_exists(table)
    }

    /// Get the ordered column descriptors of `table`
    ///
    /// A table that does not exist is reported as [`MigrateError::MissingTable`]
    /// rather than as an empty column list.
    pub fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        if !self.table_exists(table)? {
            return Err(MigrateError::MissingTable(table.to_string()));
        }

        let wrap = |e: rusqlite::Error| MigrateError::Inspect {
            table: table.to_string(),
            source: e,
        };

        let mut stmt = self
            .db
            .conn
            .prepare(
                r#"SELECT cid, name, type, "notnull", dflt_value, pk
                   FROM pragma_table_info(?1) ORDER BY cid"#,
            )
            .map_err(wrap)?;

        let rows = stmt
            .query_map([table], |row| {
                Ok(ColumnDescriptor {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default_value: row.get(4)?,
                    primary_key: row.get::<_, i64>(5)? != 0,
                })
            })
            .map_err(wrap)?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(wrap)
    }

    /// Check whether `table` currently has a column named `column`
    pub fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        Ok(self.columns(table)?.contains_column(column))
    }
}

/// Applies forward-only DDL statements
pub struct SchemaMutator<'a> {
    db: &'a DatabaseConn,
}

impl<'a> SchemaMutator<'a> {
    pub fn new(db: &'a DatabaseConn) -> Self {
        Self { db }
    }

    /// Execute one DDL statement on behalf of the migration `name`
    pub fn apply(&self, name: &str, ddl: &str) -> Result<()> {
        self.db.execute(ddl).map_err(|e| MigrateError::Mutation {
            migration: name.to_string(),
            source: e,
        })?;
        info!("applied {}", name);
        Ok(())
    }
}
