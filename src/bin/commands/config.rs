use anyhow::Result;
use pos_migrate::{MigrateConfig, OutputFormat};
use serde::Serialize;

use super::print_json;

#[derive(Debug, Serialize)]
struct ConfigInfo<'a> {
    #[serde(flatten)]
    config: &'a MigrateConfig,
    sqlite_path: String,
    database_dir: String,
    database_exists: bool,
}

pub fn run(config: &MigrateConfig, output_format: OutputFormat) -> Result<()> {
    if output_format.is_json() {
        let sqlite_path = config.sqlite_path();
        let info = ConfigInfo {
            config,
            database_exists: std::path::Path::new(&sqlite_path).exists(),
            sqlite_path,
            database_dir: config.database_dir(),
        };
        print_json(&info, output_format);
    } else {
        println!("{}", config.summary());
    }

    Ok(())
}
