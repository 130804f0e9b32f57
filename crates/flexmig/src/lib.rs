//! Timestamped, reversible schema migrations for MySQL.
//!
//! `flexmig` applies migration units stored as TOML or JSON files named
//! `<YYYYmmddHHMMSS>_<name>.<toml|json>`, where:
//! - Column types use the portable `type[limit]` grammar of `flexmig-core`
//! - Applied units are recorded in a `migrations` ledger table
//! - Only the most recently applied unit can be rolled back
//!
//! # Architecture
//!
//! - **Discovery** - Scans the migrations directory of each search root
//! - **Driver** - Renders operations through a dialect and executes them
//! - **Ledger** - Records which units have been applied
//! - **Runner** - Diffs discovered units against the ledger and applies them
//!
//! # Example
//!
//! ```rust,ignore
//! use flexmig::prelude::*;
//!
//! let config = MigratorConfig::new("migrations").root(".");
//! let connection = MySqlSchemaConnection::connect(&url).await?;
//! let ledger = MySqlLedger::connect(&url).await?;
//! let driver = SchemaDriver::new(connection, MySqlDialect::new());
//!
//! let mut runner = MigrationRunner::new(config, driver, ledger)?;
//! for outcome in runner.migrate().await? {
//!     println!("{outcome}");
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create an empty migration
//! flexmig generate create_users
//!
//! # Apply pending migrations
//! flexmig migrate
//!
//! # Show migration status
//! flexmig status
//!
//! # Roll back the last migration
//! flexmig rollback
//! ```

pub mod config;
pub mod connection;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod ledger;
pub mod report;
pub mod runner;
pub mod stub;
pub mod unit;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::MigratorConfig;
    pub use crate::connection::{MySqlSchemaConnection, SchemaConnection};
    pub use crate::discovery::{discover, resolve, Candidate};
    pub use crate::driver::SchemaDriver;
    pub use crate::error::{MigrateError, Result};
    pub use crate::ledger::{Ledger, LedgerEntry, MySqlLedger};
    pub use crate::report::{MigrationReport, Outcome, OutcomeStatus};
    pub use crate::runner::{Direction, MigrationRunner, UnitStatus};
    pub use crate::unit::{MigrationUnit, UnitFormat};
    pub use flexmig_core::prelude::*;
}
