use serde::Serialize;
use tracing::info;

use super::{Check, Migration};
use crate::database::{DatabaseConn, SchemaInspector, SchemaMutator};
use crate::error::{MigrateError, Result};

/// What `run` did for one migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationOutcome {
    /// The statement was executed
    Applied,
    /// The schema already had the change; no statement was executed
    AlreadyPresent,
}

impl std::fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationOutcome::Applied => write!(f, "applied"),
            MigrationOutcome::AlreadyPresent => write!(f, "already exists"),
        }
    }
}

/// What `run` would do for one migration, without doing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationPlan {
    Pending,
    AlreadyPresent,
}

impl std::fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationPlan::Pending => write!(f, "pending"),
            MigrationPlan::AlreadyPresent => write!(f, "already exists"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub name: &'static str,
    pub table: &'static str,
    pub outcome: MigrationOutcome,
}

/// Everything [`run_all`] got through before it stopped
#[derive(Debug)]
pub struct RunSummary {
    /// Completed migrations, in the order they ran
    pub reports: Vec<MigrationReport>,
    /// The migration that failed and its error; `None` when all of them ran
    pub failure: Option<(&'static str, MigrateError)>,
}

/// Apply `migration` unless the schema already has it
///
/// Column migrations consult the inspector first and issue no DDL when the
/// column is present. Table migrations check for the table the same way, and
/// their `IF NOT EXISTS` clause covers a table created in between.
pub fn run(db: &DatabaseConn, migration: &Migration) -> Result<MigrationOutcome> {
    let inspector = SchemaInspector::new(db);

    match migration.check {
        Check::ColumnMissing { table, column } => {
            if inspector.has_column(table, column)? {
                info!(
                    "{}: column {}.{} already exists, skipping",
                    migration.name, table, column
                );
                return Ok(MigrationOutcome::AlreadyPresent);
            }
            SchemaMutator::new(db).apply(migration.name, migration.statement)?;
            info!("{}: added column {}.{}", migration.name, table, column);
        }
        Check::CreateIfNotExists { table } => {
            if inspector.table_exists(table)? {
                info!("{}: table {} already exists, skipping", migration.name, table);
                return Ok(MigrationOutcome::AlreadyPresent);
            }
            SchemaMutator::new(db).apply(migration.name, migration.statement)?;
            info!("{}: created table {}", migration.name, table);
        }
    }

    Ok(MigrationOutcome::Applied)
}

/// Inspect whether `migration` still needs to run
pub fn plan(db: &DatabaseConn, migration: &Migration) -> Result<MigrationPlan> {
    let inspector = SchemaInspector::new(db);

    let present = match migration.check {
        Check::ColumnMissing { table, column } => inspector.has_column(table, column)?,
        Check::CreateIfNotExists { table } => inspector.table_exists(table)?,
    };

    Ok(if present {
        MigrationPlan::AlreadyPresent
    } else {
        MigrationPlan::Pending
    })
}

/// Run each migration in order, stopping at the first failure
///
/// Migrations that completed before the failure keep their reports; nothing
/// is rolled back.
pub fn run_all<'a, I>(db: &DatabaseConn, migrations: I) -> RunSummary
where
    I: IntoIterator<Item = &'a Migration>,
{
    let mut reports = Vec::new();

    for m in migrations {
        match run(db, m) {
            Ok(outcome) => reports.push(MigrationReport {
                name: m.name,
                table: m.check.table(),
                outcome,
            }),
            Err(e) => {
                return RunSummary {
                    reports,
                    failure: Some((m.name, e)),
                }
            }
        }
    }

    RunSummary {
        reports,
        failure: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ColumnDescriptor;
    use crate::error::ErrorKind;
    use crate::migrations::{find, MIGRATIONS};

    fn create_store_db() -> DatabaseConn {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE Product (id TEXT PRIMARY KEY, name TEXT NOT NULL)")
            .unwrap();
        db.execute("CREATE TABLE Sale (id TEXT PRIMARY KEY, total INTEGER NOT NULL)")
            .unwrap();
        db
    }

    fn columns(db: &DatabaseConn, table: &str) -> Vec<ColumnDescriptor> {
        SchemaInspector::new(db).columns(table).unwrap()
    }

    #[test]
    fn test_run_twice_is_idempotent() {
        let db = create_store_db();

        for m in MIGRATIONS {
            run(&db, m).unwrap();
        }
        let product = columns(&db, "Product");
        let sale = columns(&db, "Sale");
        let counter = columns(&db, "Counter");

        for m in MIGRATIONS {
            assert_eq!(run(&db, m).unwrap(), MigrationOutcome::AlreadyPresent);
        }
        assert_eq!(columns(&db, "Product"), product);
        assert_eq!(columns(&db, "Sale"), sale);
        assert_eq!(columns(&db, "Counter"), counter);
    }

    #[test]
    fn test_purchase_price_backfills_existing_rows() {
        let db = create_store_db();
        db.execute("INSERT INTO Product (id, name) VALUES ('p1', 'Soap'), ('p2', 'Rice')")
            .unwrap();

        let m = find("product-purchase-price").unwrap();
        assert_eq!(run(&db, m).unwrap(), MigrationOutcome::Applied);

        let column = columns(&db, "Product")
            .into_iter()
            .find(|c| c.name == "purchasePrice")
            .unwrap();
        assert_eq!(column.declared_type, "INTEGER");
        assert_eq!(column.default_value, Some("0".to_string()));

        let mut stmt = db
            .conn
            .prepare("SELECT purchasePrice FROM Product ORDER BY id")
            .unwrap();
        let prices: Vec<i64> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(prices, vec![0, 0]);
    }

    #[test]
    fn test_existing_discount_issues_no_ddl() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE Sale (id TEXT PRIMARY KEY, discount REAL)")
            .unwrap();
        let before = columns(&db, "Sale");

        let m = find("sale-discount").unwrap();
        assert_eq!(run(&db, m).unwrap(), MigrationOutcome::AlreadyPresent);

        // the pre-existing REAL column is left untouched
        assert_eq!(columns(&db, "Sale"), before);
    }

    #[test]
    fn test_discount_is_not_null_with_default() {
        let db = create_store_db();
        db.execute("INSERT INTO Sale (id, total) VALUES ('s1', 100)")
            .unwrap();

        run(&db, find("sale-discount").unwrap()).unwrap();

        let column = columns(&db, "Sale")
            .into_iter()
            .find(|c| c.name == "discount")
            .unwrap();
        assert!(column.not_null);
        assert_eq!(column.declared_type, "DECIMAL(10,2)");
        assert_eq!(column.default_value, Some("0.00".to_string()));
    }

    #[test]
    fn test_missing_table_fails_without_mutation() {
        let db = DatabaseConn::open_in_memory().unwrap();

        let err = run(&db, find("product-damaged-quantity").unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(!db.table_exists("Product").unwrap());
    }

    #[test]
    fn test_create_counter_on_existing_table() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let m = find("create-counter").unwrap();

        assert_eq!(plan(&db, m).unwrap(), MigrationPlan::Pending);
        assert_eq!(run(&db, m).unwrap(), MigrationOutcome::Applied);
        db.execute("INSERT INTO Counter (id, value) VALUES ('invoice', 7)")
            .unwrap();
        assert_eq!(run(&db, m).unwrap(), MigrationOutcome::AlreadyPresent);

        assert_eq!(plan(&db, m).unwrap(), MigrationPlan::AlreadyPresent);
        let value: i64 = db
            .conn
            .query_row("SELECT value FROM Counter WHERE id = 'invoice'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let db = create_store_db();
        let before = columns(&db, "Product");

        let m = find("product-damaged-quantity").unwrap();
        assert_eq!(plan(&db, m).unwrap(), MigrationPlan::Pending);
        assert_eq!(columns(&db, "Product"), before);
    }

    #[test]
    fn test_run_all_stops_at_first_error() {
        // no Sale table, so sale-discount fails after the Product migrations
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE Product (id TEXT PRIMARY KEY)").unwrap();

        let summary = run_all(&db, MIGRATIONS);
        let done: Vec<&str> = summary.reports.iter().map(|r| r.name).collect();
        assert_eq!(
            done,
            vec![
                "create-counter",
                "product-damaged-quantity",
                "product-purchase-price"
            ]
        );
        let (failed, err) = summary.failure.unwrap();
        assert_eq!(failed, "sale-discount");
        assert!(matches!(err, MigrateError::MissingTable(ref t) if t == "Sale"));
        assert!(SchemaInspector::new(&db)
            .has_column("Product", "purchasePrice")
            .unwrap());

        db.execute("CREATE TABLE Sale (id TEXT PRIMARY KEY)").unwrap();
        let summary = run_all(&db, MIGRATIONS);
        assert!(summary.failure.is_none());
        let outcomes: Vec<MigrationOutcome> =
            summary.reports.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                MigrationOutcome::AlreadyPresent,
                MigrationOutcome::AlreadyPresent,
                MigrationOutcome::AlreadyPresent,
                MigrationOutcome::Applied,
            ]
        );
    }

    #[test]
    fn test_table_name_resolves_regardless_of_case() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE product (id TEXT PRIMARY KEY)").unwrap();
        db.execute("INSERT INTO product (id) VALUES ('p1')").unwrap();

        let m = find("product-purchase-price").unwrap();
        assert_eq!(plan(&db, m).unwrap(), MigrationPlan::Pending);
        assert_eq!(run(&db, m).unwrap(), MigrationOutcome::Applied);
        assert_eq!(run(&db, m).unwrap(), MigrationOutcome::AlreadyPresent);

        let price: i64 = db
            .conn
            .query_row("SELECT purchasePrice FROM product", [], |r| r.get(0))
            .unwrap();
        assert_eq!(price, 0);
    }
}
