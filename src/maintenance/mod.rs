//! Filesystem maintenance
//!
//! Neither operation touches the database through SQLite:
//! - `directory`: make sure the data directory exists and the database file
//!   is writable by the service user
//! - `reset`: delete the database file (and its SQLite sidecar files)

mod directory;
mod reset;

pub use directory::{
    ensure_dir, relax_file_permissions, DirOutcome, PermissionOutcome, DATABASE_FILE_MODE,
    DATA_DIR_MODE,
};
pub use reset::{reset_database, ResetOutcome};
