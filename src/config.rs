use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default directory holding the database file
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default database file name inside the data directory
pub const DEFAULT_DATABASE_FILE: &str = "app.db";

/// Name of the optional configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "pos-migrate.toml";

#[derive(Debug, Clone, Serialize)]
pub struct MigrateConfig {
    /// Directory that holds the database file
    pub data_dir: String,

    /// Database file name, relative to `data_dir`
    pub database_file: String,

    /// Connection string from `DATABASE_URL`, overriding the two fields above
    pub database_url: Option<String>,
}

const EMPTY_CONFIG: &str = r#"### pos-migrate configuration file

### directory holding the database file
# data_dir = "./data"

### database file name inside data_dir
# database_file = "app.db"

### DATABASE_URL (environment or .env) takes precedence over both settings
"#;

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            database_url: None,
        }
    }
}

impl MigrateConfig {
    /// Resolve the configuration
    ///
    /// Sources, lowest precedence first: built-in defaults, the TOML file
    /// (`path`, else `./pos-migrate.toml`, else the user config directory),
    /// `POS_MIGRATE_*` environment variables, and finally `DATABASE_URL`
    /// (which may come from a `.env` file).
    pub fn new(path: &Option<String>) -> Result<MigrateConfig> {
        // a missing .env is normal
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder();

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                if let Some(found) = Self::default_config_file() {
                    let path_str = found
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?
                        .to_owned();
                    builder = builder.add_source(config::File::with_name(path_str.as_str()));
                }
            }
        }

        // E.g., `POS_MIGRATE_DATA_DIR=/srv/pos/data pos-migrate migrate`
        builder = builder.add_source(config::Environment::with_prefix("POS_MIGRATE"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Ok(Self::from_map(&config, std::env::var("DATABASE_URL").ok()))
    }

    fn from_map(config: &HashMap<String, String>, database_url: Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            data_dir: config
                .get("data_dir")
                .cloned()
                .unwrap_or(defaults.data_dir),
            database_file: config
                .get("database_file")
                .cloned()
                .unwrap_or(defaults.database_file),
            database_url: database_url.filter(|u| !u.trim().is_empty()),
        }
    }

    /// First existing file among `./pos-migrate.toml` and
    /// `<config dir>/pos-migrate/config.toml`
    fn default_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|d| d.join("pos-migrate").join("config.toml"))
            .filter(|p| p.exists())
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        if let Some(url) = &self.database_url {
            return path_from_url(url);
        }
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/{}", data_dir, self.database_file)
    }

    /// Directory that must exist before the database can be created
    ///
    /// With a `DATABASE_URL` this is the parent of the database file.
    pub fn database_dir(&self) -> String {
        match &self.database_url {
            None => self.data_dir.clone(),
            Some(_) => {
                let sqlite_path = self.sqlite_path();
                Path::new(&sqlite_path)
                    .parent()
                    .map(|p| p.to_string_lossy().to_string())
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| ".".to_string())
            }
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Data Directory:     {}", self.data_dir),
            format!("Database File:      {}", self.database_file),
        ];
        if let Some(url) = &self.database_url {
            lines.push(format!("DATABASE_URL:       {}", url));
        }
        lines.push(format!("SQLite Path:        {}", self.sqlite_path()));

        let exists = Path::new(&self.sqlite_path()).exists();
        lines.push(format!(
            "Database Status:    {}",
            if exists { "exists" } else { "not created" }
        ));

        lines.join("\n")
    }
}

/// Strip the scheme and query from a SQLite connection string
///
/// Accepts `file:<path>`, `sqlite://<path>`, `sqlite:<path>`, or a bare path.
pub fn path_from_url(url: &str) -> String {
    let url = url.trim();
    let path = url
        .strip_prefix("file:")
        .or_else(|| url.strip_prefix("sqlite://"))
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    match path.split_once('?') {
        Some((p, _)) => p.to_string(),
        None => path.to_string(),
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MigrateConfig::default();
        assert_eq!(config.sqlite_path(), "./data/app.db");
        assert_eq!(config.database_dir(), "./data");
    }

    #[test]
    fn test_paths() {
        let config = MigrateConfig {
            data_dir: "/srv/pos/data/".to_string(),
            database_file: "store.db".to_string(),
            database_url: None,
        };

        assert_eq!(config.sqlite_path(), "/srv/pos/data/store.db");
        assert_eq!(config.database_dir(), "/srv/pos/data/");
    }

    #[test]
    fn test_from_map() {
        let mut map = HashMap::new();
        map.insert("data_dir".to_string(), "/var/lib/pos".to_string());

        let config = MigrateConfig::from_map(&map, None);
        assert_eq!(config.sqlite_path(), "/var/lib/pos/app.db");

        let config = MigrateConfig::from_map(&map, Some("file:./prisma/dev.db".to_string()));
        assert_eq!(config.sqlite_path(), "./prisma/dev.db");
        assert_eq!(config.database_dir(), "./prisma");

        let config = MigrateConfig::from_map(&map, Some("  ".to_string()));
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_path_from_url() {
        assert_eq!(path_from_url("file:./dev.db"), "./dev.db");
        assert_eq!(path_from_url("sqlite:///tmp/app.db"), "/tmp/app.db");
        assert_eq!(path_from_url("sqlite:app.db?mode=rwc"), "app.db");
        assert_eq!(path_from_url("/data/app.db"), "/data/app.db");
    }

    #[test]
    fn test_database_dir_for_bare_file_url() {
        let config = MigrateConfig {
            database_url: Some("file:dev.db".to_string()),
            ..Default::default()
        };
        assert_eq!(config.database_dir(), ".");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
    }
}
