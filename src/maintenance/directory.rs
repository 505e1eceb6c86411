use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{MigrateError, Result};

/// Mode for a newly created data directory (before umask)
pub const DATA_DIR_MODE: u32 = 0o777;

/// Mode the database file is relaxed to
pub const DATABASE_FILE_MODE: u32 = 0o666;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirOutcome {
    Created,
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status", content = "reason")]
pub enum PermissionOutcome {
    Updated,
    /// No file at the path; nothing to change
    Missing,
    /// The change was refused; the reason was logged
    Failed(String),
}

/// Create `path` and any missing ancestors
///
/// An existing directory is left alone, including its permissions.
pub fn ensure_dir(path: &Path) -> Result<DirOutcome> {
    if path.is_dir() {
        info!("directory {} already exists", path.display());
        return Ok(DirOutcome::AlreadyPresent);
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DATA_DIR_MODE);
    }

    builder
        .create(path)
        .map_err(|e| MigrateError::CreateDir {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("created directory {}", path.display());
    Ok(DirOutcome::Created)
}

/// Best-effort permission change on `path`
///
/// The process may not own the file, so a refusal is logged as a warning
/// and reported as [`PermissionOutcome::Failed`] instead of an error.
pub fn relax_file_permissions(path: &Path, mode: u32) -> PermissionOutcome {
    if !path.exists() {
        info!("{} does not exist, skipping permission update", path.display());
        return PermissionOutcome::Missing;
    }

    match set_mode(path, mode) {
        Ok(()) => {
            info!("set permissions of {} to {:o}", path.display(), mode);
            PermissionOutcome::Updated
        }
        Err(e) => {
            let reason = e.detail();
            warn!("{}", reason);
            PermissionOutcome::Failed(reason)
        }
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| {
        MigrateError::Permission {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) -> Result<()> {
    let wrap = |e: std::io::Error| MigrateError::Permission {
        path: path.to_path_buf(),
        source: e,
    };

    let mut permissions = fs::metadata(path).map_err(wrap)?.permissions();
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions).map_err(wrap)
}
