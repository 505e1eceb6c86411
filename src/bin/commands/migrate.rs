use anyhow::Result;
use clap::Args;
use pos_migrate::migrations::{self, Migration};
use pos_migrate::{DatabaseConn, MigrateConfig, MigrateError, OutputFormat, RunSummary};
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use super::{now_rfc3339, print_json, print_table};

/// Arguments for the Migrate command
#[derive(Args)]
pub struct MigrateArgs {
    /// Migrations to run, in the given order (default: all)
    #[clap(value_name = "NAME")]
    pub names: Vec<String>,

    /// Inspect the schema and report what would run, without changing it
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct MigrateRow {
    name: &'static str,
    table: &'static str,
    result: String,
}

#[derive(Debug, Serialize)]
struct MigrateOutput<'a> {
    database: String,
    dry_run: bool,
    results: &'a [MigrateRow],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    finished_at: String,
}

pub fn run(config: &MigrateConfig, args: MigrateArgs, output_format: OutputFormat) -> Result<()> {
    let MigrateArgs { names, dry_run } = args;

    let selected = migrations::select(&names)?;
    let db = DatabaseConn::open(&config.sqlite_path())?;
    let database = db.path().to_string();

    let (rows, failure) = match dry_run {
        true => plan_rows(&db, &selected),
        false => run_rows(&db, &selected),
    };

    // disconnect before reporting, on success and failure alike
    if let Err(e) = db.close() {
        if failure.is_none() {
            return Err(e.into());
        }
        warn!("{}", e.detail());
    }

    print_results(&database, &rows, dry_run, failure.as_ref(), output_format);

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn failed_row(m: &Migration, e: &MigrateError) -> MigrateRow {
    MigrateRow {
        name: m.name,
        table: m.check.table(),
        result: format!("failed ({})", e.kind()),
    }
}

fn run_rows(
    db: &DatabaseConn,
    selected: &[&'static Migration],
) -> (Vec<MigrateRow>, Option<MigrateError>) {
    let RunSummary { reports, failure } = migrations::run_all(db, selected.iter().copied());

    let mut rows: Vec<MigrateRow> = reports
        .into_iter()
        .map(|r| MigrateRow {
            name: r.name,
            table: r.table,
            result: r.outcome.to_string(),
        })
        .collect();

    let failure = failure.map(|(name, e)| {
        if let Some(m) = migrations::find(name) {
            rows.push(failed_row(m, &e));
        }
        e
    });

    (rows, failure)
}

/// Inspect each migration until the first failure, changing nothing
fn plan_rows(
    db: &DatabaseConn,
    selected: &[&'static Migration],
) -> (Vec<MigrateRow>, Option<MigrateError>) {
    let mut rows = Vec::with_capacity(selected.len());

    for m in selected {
        match migrations::plan(db, m) {
            Ok(plan) => rows.push(MigrateRow {
                name: m.name,
                table: m.check.table(),
                result: plan.to_string(),
            }),
            Err(e) => {
                rows.push(failed_row(m, &e));
                return (rows, Some(e));
            }
        }
    }

    (rows, None)
}

fn print_results(
    database: &str,
    rows: &[MigrateRow],
    dry_run: bool,
    failure: Option<&MigrateError>,
    output_format: OutputFormat,
) {
    match output_format {
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let output = MigrateOutput {
                database: database.to_string(),
                dry_run,
                results: rows,
                error: failure.map(MigrateError::detail),
                finished_at: now_rfc3339(),
            };
            print_json(&output, output_format);
        }
        OutputFormat::JsonLine => {
            for row in rows {
                print_json(row, output_format);
            }
        }
        OutputFormat::Psv => {
            println!("name|table|result");
            for row in rows {
                println!("{}|{}|{}", row.name, row.table, row.result);
            }
        }
        OutputFormat::Table | OutputFormat::Markdown => print_table(rows, output_format),
    }
}
