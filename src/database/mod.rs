//! Database module
//!
//! ```text
//! database/
//! └── core/           # Foundation
//!     ├── connection  # SQLite DatabaseConn handle
//!     └── schema      # SchemaInspector and SchemaMutator
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pos_migrate::database::{DatabaseConn, SchemaInspector};
//!
//! let db = DatabaseConn::open("./data/app.db")?;
//! let has_discount = SchemaInspector::new(&db).has_column("Sale", "discount")?;
//! db.close()?;
//! ```

pub mod core;

pub use self::core::{ColumnDescriptor, ColumnSet, DatabaseConn, SchemaInspector, SchemaMutator};
