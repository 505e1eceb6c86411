pub mod config;
pub mod ensure_dirs;
pub mod list;
pub mod migrate;
pub mod reset_db;
pub mod status;

use pos_migrate::OutputFormat;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Print `rows` as a rounded or markdown table
///
/// JSON and PSV output are handled by each command since their shape differs.
pub(crate) fn print_table<T: Tabled>(rows: &[T], output_format: OutputFormat) {
    match output_format {
        OutputFormat::Markdown => println!("{}", Table::new(rows).with(Style::markdown())),
        _ => println!("{}", Table::new(rows).with(Style::rounded())),
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T, output_format: OutputFormat) {
    match output_format.to_json_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
    }
}

/// RFC 3339 timestamp attached to JSON results
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
