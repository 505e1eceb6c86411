#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! pos-migrate - schema migrations and data-directory maintenance
//!
//! Brings the point-of-sale SQLite database up to the current schema. Every
//! migration re-inspects the live schema before acting, so running the tool
//! repeatedly is safe: once a change is in place, later runs issue no DDL.
//!
//! # Architecture
//!
//! - **[`database`]**: the `DatabaseConn` handle, `SchemaInspector` and
//!   `SchemaMutator`
//! - **[`migrations`]**: the built-in `{check, statement}` table and the
//!   runner that gates each statement behind its check
//! - **[`maintenance`]**: data-directory creation, permission relaxing and
//!   database reset (filesystem only)
//! - **[`config`]**: configuration file, `POS_MIGRATE_*` and `DATABASE_URL`
//! - **[`error`]**: `MigrateError` and its `ErrorKind` taxonomy
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pos_migrate::{migrations, DatabaseConn, MigrateConfig};
//!
//! let config = MigrateConfig::new(&None)?;
//! let db = DatabaseConn::open(&config.sqlite_path())?;
//!
//! for report in migrations::run_all(&db, migrations::MIGRATIONS)? {
//!     println!("{}: {}", report.name, report.outcome);
//! }
//!
//! db.close()?;
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod maintenance;
pub mod migrations;
pub mod output;

pub use config::{format_size, MigrateConfig};
pub use database::{ColumnDescriptor, ColumnSet, DatabaseConn, SchemaInspector, SchemaMutator};
pub use error::{ErrorKind, MigrateError};
pub use maintenance::{DirOutcome, PermissionOutcome, ResetOutcome};
pub use migrations::{
    Migration, MigrationOutcome, MigrationPlan, MigrationReport, RunSummary, MIGRATIONS,
};
pub use output::OutputFormat;
