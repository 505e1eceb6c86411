use anyhow::Result;
use pos_migrate::migrations::{Check, MIGRATIONS};
use pos_migrate::OutputFormat;
use serde::Serialize;
use tabled::Tabled;

use super::{print_json, print_table};

#[derive(Debug, Serialize, Tabled)]
struct ListRow {
    name: &'static str,
    check: String,
    statement: &'static str,
}

pub fn run(output_format: OutputFormat) -> Result<()> {
    match output_format {
        OutputFormat::Json | OutputFormat::JsonPretty => print_json(&MIGRATIONS, output_format),
        OutputFormat::JsonLine => {
            for m in MIGRATIONS {
                print_json(m, output_format);
            }
        }
        _ => {
            let rows: Vec<ListRow> = MIGRATIONS
                .iter()
                .map(|m| ListRow {
                    name: m.name,
                    check: describe_check(&m.check),
                    statement: m.statement,
                })
                .collect();

            if output_format == OutputFormat::Psv {
                println!("name|check|statement");
                for row in &rows {
                    println!("{}|{}|{}", row.name, row.check, row.statement);
                }
            } else {
                print_table(&rows, output_format);
            }
        }
    }

    Ok(())
}

fn describe_check(check: &Check) -> String {
    match check {
        Check::ColumnMissing { table, column } => format!("column {}.{} missing", table, column),
        Check::CreateIfNotExists { table } => format!("create {} if not exists", table),
    }
}
