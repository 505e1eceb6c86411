//! Error types
//!
//! Every failure the library can report is a [`MigrateError`]. Each variant
//! belongs to one [`ErrorKind`] so callers can tell a connection problem from
//! a failed DDL statement or a filesystem error without matching on messages.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`MigrateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The database could not be reached, or the inspected table is missing
    Connection,
    /// A DDL statement failed to execute
    Mutation,
    /// The database file exists but could not be removed
    Delete,
    /// A permission change failed
    Permission,
    /// Any other filesystem failure (e.g. directory creation)
    Filesystem,
    /// The requested configuration or migration selection is invalid
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Connection => write!(f, "connection"),
            ErrorKind::Mutation => write!(f, "mutation"),
            ErrorKind::Delete => write!(f, "delete"),
            ErrorKind::Permission => write!(f, "permission"),
            ErrorKind::Filesystem => write!(f, "filesystem"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("failed to open database at '{path}'")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to close database")]
    Disconnect(#[source] rusqlite::Error),

    #[error("table '{0}' does not exist")]
    MissingTable(String),

    #[error("failed to inspect table '{table}'")]
    Inspect {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("migration '{migration}' failed")]
    Mutation {
        migration: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("unknown migration '{0}'")]
    UnknownMigration(String),

    #[error("failed to delete '{}'", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to set permissions on '{}'", .path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory '{}'", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MigrateError {
    /// The message followed by each underlying cause, `: `-separated
    pub fn detail(&self) -> String {
        anyhow::Chain::new(self)
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(": ")
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrateError::Connection { .. }
            | MigrateError::Disconnect(_)
            | MigrateError::MissingTable(_)
            | MigrateError::Inspect { .. } => ErrorKind::Connection,
            MigrateError::Mutation { .. } => ErrorKind::Mutation,
            MigrateError::Delete { .. } => ErrorKind::Delete,
            MigrateError::Permission { .. } => ErrorKind::Permission,
            MigrateError::CreateDir { .. } => ErrorKind::Filesystem,
            MigrateError::UnknownMigration(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_is_connection_error() {
        let err = MigrateError::MissingTable("Product".to_string());
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(err.to_string(), "table 'Product' does not exist");
    }

    #[test]
    fn test_delete_error_message() {
        let err = MigrateError::Delete {
            path: PathBuf::from("/data/app.db"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.kind(), ErrorKind::Delete);
        assert!(err.to_string().starts_with("failed to delete '/data/app.db'"));
    }

    #[test]
    fn test_cause_is_reported_once() {
        let err = MigrateError::Delete {
            path: PathBuf::from("/data/app.db"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "read-only file system"),
        };
        assert_eq!(err.to_string(), "failed to delete '/data/app.db'");
        assert_eq!(
            err.detail(),
            "failed to delete '/data/app.db': read-only file system"
        );

        let logged = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(logged.matches("read-only file system").count(), 1);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Mutation.to_string(), "mutation");
        assert_eq!(ErrorKind::Permission.to_string(), "permission");
    }
}
