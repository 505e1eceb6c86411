//! Built-in schema migrations
//!
//! Each migration is one `{check, statement}` pair. A column migration is
//! gated by an explicit inspector lookup because SQLite has no
//! `ADD COLUMN IF NOT EXISTS`; a table migration is gated on the table and
//! also carries its own `IF NOT EXISTS` clause. There is no migration ledger: every run
//! re-reads the live schema, so a migration that already took effect is a
//! no-op the next time.

mod runner;

pub use runner::{
    plan, run, run_all, MigrationOutcome, MigrationPlan, MigrationReport, RunSummary,
};

use serde::Serialize;

use crate::error::{MigrateError, Result};

/// How a migration decides whether it still needs to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Check {
    /// Run only if `table` has no column named `column`
    ColumnMissing {
        table: &'static str,
        column: &'static str,
    },
    /// Run only if `table` does not exist; the statement is a
    /// `CREATE TABLE IF NOT EXISTS`
    CreateIfNotExists { table: &'static str },
}

impl Check {
    pub fn table(&self) -> &'static str {
        match *self {
            Check::ColumnMissing { table, .. } => table,
            Check::CreateIfNotExists { table } => table,
        }
    }
}

/// A single forward-only schema change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Migration {
    pub name: &'static str,
    pub description: &'static str,
    pub check: Check,
    pub statement: &'static str,
}

/// All migrations, in the order `migrate` applies them
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create-counter",
        description: "Create the Counter table",
        check: Check::CreateIfNotExists { table: "Counter" },
        statement: "CREATE TABLE IF NOT EXISTS Counter (id TEXT PRIMARY KEY, value INTEGER NOT NULL)",
    },
    Migration {
        name: "product-damaged-quantity",
        description: "Add damagedQuantity to Product",
        check: Check::ColumnMissing {
            table: "Product",
            column: "damagedQuantity",
        },
        statement: "ALTER TABLE Product ADD COLUMN damagedQuantity INTEGER DEFAULT 0",
    },
    Migration {
        name: "product-purchase-price",
        description: "Add purchasePrice to Product",
        check: Check::ColumnMissing {
            table: "Product",
            column: "purchasePrice",
        },
        statement: "ALTER TABLE Product ADD COLUMN purchasePrice INTEGER DEFAULT 0",
    },
    Migration {
        name: "sale-discount",
        description: "Add discount to Sale",
        check: Check::ColumnMissing {
            table: "Sale",
            column: "discount",
        },
        statement: "ALTER TABLE Sale ADD COLUMN discount DECIMAL(10,2) NOT NULL DEFAULT 0.00",
    },
];

/// Look up a built-in migration by name
pub fn find(name: &str) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.name == name)
}

/// Resolve the migrations named on the command line
///
/// An empty selection means every migration, in table order. Named
/// migrations keep the order they were given in.
pub fn select(names: &[String]) -> Result<Vec<&'static Migration>> {
    if names.is_empty() {
        return Ok(MIGRATIONS.iter().collect());
    }

    names
        .iter()
        .map(|n| find(n).ok_or_else(|| MigrateError::UnknownMigration(n.clone())))
        .collect()
}
