use clap::{Parser, Subcommand};
use pos_migrate::*;
use tracing::{error, Level};

mod commands;

use commands::ensure_dirs::EnsureDirsArgs;
use commands::migrate::MigrateArgs;
use commands::reset_db::ResetDbArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default ./pos-migrate.toml is used when present
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information, including every SQL statement issued
    #[clap(long)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations (all of them unless names are given)
    Migrate(MigrateArgs),

    /// Show which migrations are pending without changing anything
    Status,

    /// List the built-in migrations and their statements
    List,

    /// Create the data directory and relax database file permissions
    EnsureDirs(EnsureDirsArgs),

    /// Delete the database file. All data is lost.
    ResetDb(ResetDbArgs),

    /// Show the resolved configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match MigrateConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    let output_format = cli.format;
    let result = match cli.command {
        Commands::Migrate(args) => commands::migrate::run(&config, args, output_format),
        Commands::Status => commands::status::run(&config, output_format),
        Commands::List => commands::list::run(output_format),
        Commands::EnsureDirs(args) => commands::ensure_dirs::run(&config, args, output_format),
        Commands::ResetDb(args) => commands::reset_db::run(&config, args, output_format),
        Commands::Config => commands::config::run(&config, output_format),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
