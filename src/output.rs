//! Output formatting shared by all commands

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unified output format for all commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON (single line per object)
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line, for streaming)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Every format, in the order `--help` lists them
    pub const ALL: [OutputFormat; 6] = [
        Self::Table,
        Self::Markdown,
        Self::Json,
        Self::JsonPretty,
        Self::JsonLine,
        Self::Psv,
    ];

    /// Name accepted by `--format`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::JsonPretty => "json-pretty",
            Self::JsonLine => "json-line",
            Self::Psv => "psv",
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Serialize `value` according to this format
    ///
    /// Non-JSON formats fall back to compact JSON; table rendering is the
    /// caller's job.
    pub fn to_json_string<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        match self {
            Self::JsonPretty => serde_json::to_string_pretty(value),
            _ => serde_json::to_string(value),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
                format!(
                    "unknown output format '{}', expected one of: {}",
                    s,
                    names.join(", ")
                )
            })
    }
}
