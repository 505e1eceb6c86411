use anyhow::Result;
use clap::Args;
use pos_migrate::maintenance::{reset_database, ResetOutcome};
use pos_migrate::{MigrateConfig, OutputFormat};
use std::path::Path;

use super::{now_rfc3339, print_json};

/// Arguments for the ResetDb command
#[derive(Args)]
pub struct ResetDbArgs {
    /// Delete this file instead of the configured database
    #[clap(long, value_name = "PATH")]
    pub path: Option<String>,
}

pub fn run(config: &MigrateConfig, args: ResetDbArgs, output_format: OutputFormat) -> Result<()> {
    let database = args.path.unwrap_or_else(|| config.sqlite_path());

    let outcome = reset_database(Path::new(&database))?;

    if output_format.is_json() {
        let output = serde_json::json!({
            "database": database,
            "result": outcome,
            "finished_at": now_rfc3339(),
        });
        print_json(&output, output_format);
    } else {
        match outcome {
            ResetOutcome::Deleted => println!("✓ {}: deleted", database),
            ResetOutcome::Absent => println!("- {}: no database file", database),
        }
    }

    Ok(())
}
