use anyhow::Result;
use clap::Args;
use pos_migrate::maintenance::{
    ensure_dir, relax_file_permissions, DirOutcome, PermissionOutcome, DATABASE_FILE_MODE,
};
use pos_migrate::{MigrateConfig, OutputFormat};
use serde::Serialize;
use std::path::Path;

use super::{now_rfc3339, print_json};

/// Arguments for the EnsureDirs command
#[derive(Args)]
pub struct EnsureDirsArgs {
    /// Only create the directory, leave database file permissions alone
    #[clap(long)]
    pub skip_permissions: bool,
}

#[derive(Debug, Serialize)]
struct EnsureDirsOutput {
    directory: String,
    directory_result: DirOutcome,
    database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<PermissionOutcome>,
    finished_at: String,
}

/// Create the data directory, then relax the database file mode
///
/// A refused permission change is reported but does not fail the command.
pub fn run(config: &MigrateConfig, args: EnsureDirsArgs, output_format: OutputFormat) -> Result<()> {
    let directory = config.database_dir();
    let database = config.sqlite_path();

    let directory_result = ensure_dir(Path::new(&directory))?;
    let permissions = match args.skip_permissions {
        true => None,
        false => Some(relax_file_permissions(
            Path::new(&database),
            DATABASE_FILE_MODE,
        )),
    };

    if output_format.is_json() {
        let output = EnsureDirsOutput {
            directory,
            directory_result,
            database,
            permissions,
            finished_at: now_rfc3339(),
        };
        print_json(&output, output_format);
        return Ok(());
    }

    let dir_str = match directory_result {
        DirOutcome::Created => "created",
        DirOutcome::AlreadyPresent => "already exists",
    };
    println!("✓ {}: {}", directory, dir_str);

    match permissions {
        None => {}
        Some(PermissionOutcome::Updated) => {
            println!("✓ {}: mode set to {:o}", database, DATABASE_FILE_MODE)
        }
        Some(PermissionOutcome::Missing) => println!("- {}: not created yet", database),
        Some(PermissionOutcome::Failed(reason)) => {
            println!("! {}: permissions unchanged ({})", database, reason)
        }
    }

    Ok(())
}
