use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{MigrateError, Result};

/// Files SQLite keeps next to the main database file
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetOutcome {
    Deleted,
    /// There was no database file to delete
    Absent,
}

/// Delete the database file at `path`
///
/// All data is lost. Leftover journal/WAL files are removed as well so a
/// database created later at the same path does not replay stale pages.
pub fn reset_database(path: &Path) -> Result<ResetOutcome> {
    let outcome = if remove_if_present(path)? {
        info!("deleted database {}", path.display());
        ResetOutcome::Deleted
    } else {
        info!("no database at {}, nothing to reset", path.display());
        ResetOutcome::Absent
    };

    for suffix in SIDECAR_SUFFIXES {
        let sidecar = sidecar_path(path, suffix);
        if remove_if_present(&sidecar)? {
            info!("deleted {}", sidecar.display());
        }
    }

    Ok(outcome)
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MigrateError::Delete {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
