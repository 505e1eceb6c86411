use anyhow::Result;
use pos_migrate::migrations::{self, MIGRATIONS};
use pos_migrate::{format_size, DatabaseConn, MigrateConfig, MigrateError, OutputFormat};
use serde::Serialize;
use tabled::Tabled;

use super::{now_rfc3339, print_json, print_table};

#[derive(Debug, Serialize, Tabled)]
struct StatusRow {
    name: &'static str,
    table: &'static str,
    description: &'static str,
    state: String,
}

#[derive(Debug, Serialize)]
struct StatusOutput<'a> {
    database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    migrations: &'a [StatusRow],
    checked_at: String,
}

pub fn run(config: &MigrateConfig, output_format: OutputFormat) -> Result<()> {
    let sqlite_path = config.sqlite_path();
    let db = DatabaseConn::open(&sqlite_path)?;

    let rows = inspect_all(&db);
    db.close()?;
    let rows = rows?;

    let size_bytes = std::fs::metadata(&sqlite_path).ok().map(|m| m.len());

    match output_format {
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let output = StatusOutput {
                database: sqlite_path,
                size_bytes,
                migrations: &rows,
                checked_at: now_rfc3339(),
            };
            print_json(&output, output_format);
        }
        OutputFormat::JsonLine => {
            for row in &rows {
                print_json(row, output_format);
            }
        }
        OutputFormat::Psv => {
            println!("name|table|description|state");
            for row in &rows {
                println!(
                    "{}|{}|{}|{}",
                    row.name, row.table, row.description, row.state
                );
            }
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            println!("Database: {}", sqlite_path);
            if let Some(size) = size_bytes {
                println!("Size:     {}", format_size(size));
            }
            println!();
            print_table(&rows, output_format);
        }
    }

    Ok(())
}

/// Plan every migration; a table the migration targets may not exist yet
fn inspect_all(db: &DatabaseConn) -> Result<Vec<StatusRow>, MigrateError> {
    MIGRATIONS
        .iter()
        .map(|m| {
            let state = match migrations::plan(db, m) {
                Ok(plan) => plan.to_string(),
                Err(MigrateError::MissingTable(table)) => format!("table {} missing", table),
                Err(e) => return Err(e),
            };
            Ok(StatusRow {
                name: m.name,
                table: m.check.table(),
                description: m.description,
                state,
            })
        })
        .collect()
}
