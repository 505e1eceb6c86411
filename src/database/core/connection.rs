//! Database connection management
//!
//! `DatabaseConn` is the handle every migration operation borrows. It is
//! opened once per process, passed by reference into each operation, and
//! released either through [`DatabaseConn::close`] or when it is dropped.

use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::error::{MigrateError, Result};

/// How long a statement waits on a database locked by another process
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Core database connection wrapper
///
/// Opening never creates the database file: a migration run against a path
/// that does not exist is a connection error, not a fresh empty database.
pub struct DatabaseConn {
    pub conn: Connection,
    path: String,
}

impl DatabaseConn {
    /// Open an existing database file for reading and writing
    pub fn open(path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn =
            Connection::open_with_flags(path, flags).map_err(|e| MigrateError::Connection {
                path: path.to_string(),
                source: e,
            })?;

        let db = DatabaseConn {
            conn,
            path: path.to_string(),
        };
        db.configure()?;
        info!("connected to {}", db.path);
        Ok(db)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| MigrateError::Connection {
            path: ":memory:".to_string(),
            source: e,
        })?;

        let db = DatabaseConn {
            conn,
            path: ":memory:".to_string(),
        };
        db.configure()?;
        Ok(db)
    }

    fn configure(&self) -> Result<()> {
        let wrap = |e: rusqlite::Error| MigrateError::Connection {
            path: self.path.clone(),
            source: e,
        };

        self.conn.busy_timeout(BUSY_TIMEOUT).map_err(wrap)?;

        self.conn
            .execute("PRAGMA foreign_keys=ON", [])
            .map_err(wrap)?;

        Ok(())
    }

    /// Path the connection was opened with (`:memory:` for in-memory databases)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> rusqlite::Result<usize> {
        debug!("executing: {}", sql.trim());
        self.conn.execute(sql, [])
    }

    /// Check if a table exists in the database
    ///
    /// Table names resolve case-insensitively, as they do in SQL statements.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1 COLLATE NOCASE",
                [table_name],
                |row| row.get(0),
            )
            .map_err(|e| MigrateError::Inspect {
                table: table_name.to_string(),
                source: e,
            })?;
        Ok(count > 0)
    }

    /// Release the connection, reporting any error SQLite raises on close
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, e)| MigrateError::Disconnect(e))?;
        info!("disconnected from {}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(db.table_exists("Test_Table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_open_missing_file_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");

        let err = DatabaseConn::open(path.to_str().unwrap())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(!path.exists());
    }

    #[test]
    fn test_open_and_close_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE seed (id INTEGER PRIMARY KEY)")
            .unwrap();

        let db = DatabaseConn::open(path.to_str().unwrap()).unwrap();
        assert_eq!(db.path(), path.to_str().unwrap());
        assert!(db.close().is_ok());
    }
}
