//! Migration ledger.
//!
//! This module manages the `migrations` table that records which migration
//! units have been applied to the database.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::warn;

use crate::error::{MigrateError, Result};

/// SQL to create the ledger table (MySQL).
pub const CREATE_LEDGER_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS `migrations` (
    `hash` CHAR(14) NOT NULL,
    `name` VARCHAR(255) NOT NULL,
    `created_at` DATE NOT NULL,
    `updated_at` DATE NOT NULL,
    UNIQUE KEY `migrations_hash` (`hash`)
) ENGINE=InnoDB
";

/// A record of an applied migration unit.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerEntry {
    /// 14-digit migration hash.
    pub hash: String,
    /// Migration name.
    pub name: String,
    /// When the unit was applied.
    pub created_at: NaiveDate,
    /// When the entry was last touched.
    pub updated_at: NaiveDate,
}

impl LedgerEntry {
    /// Creates an entry dated `on`.
    #[must_use]
    pub fn new(hash: impl Into<String>, name: impl Into<String>, on: NaiveDate) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
            created_at: on,
            updated_at: on,
        }
    }

    /// Ordering key used to pick the most recent entry.
    fn recency(&self) -> (NaiveDate, &str) {
        (self.created_at, self.hash.as_str())
    }
}

/// Store of applied migration units, keyed by hash.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Returns every entry, oldest first.
    async fn entries(&self) -> Result<Vec<LedgerEntry>>;

    /// Records a unit as applied. Recording a hash twice is an error.
    async fn record(&mut self, hash: &str, name: &str, on: NaiveDate) -> Result<()>;

    /// Removes the entry for a hash, failing with
    /// [`MigrateError::NotInLedger`] when there is none.
    async fn remove(&mut self, hash: &str) -> Result<()>;

    /// Returns the entry with the greatest `(created_at, hash)`.
    async fn latest(&self) -> Result<Option<LedgerEntry>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .max_by(|a, b| a.recency().cmp(&b.recency())))
    }

    /// Returns the set of applied hashes.
    async fn applied_hashes(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .map(|entry| entry.hash)
            .collect())
    }
}

/// Ledger stored in the `migrations` table of a MySQL database.
#[derive(Debug, Clone)]
pub struct MySqlLedger {
    pool: MySqlPool,
}

impl MySqlLedger {
    /// Creates a ledger on an existing pool.
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Connects a small pool of its own, separate from the DDL connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the ledger table if needed.
    ///
    /// Failures are logged and tolerated: the table may already exist under
    /// an account without `CREATE` rights.
    pub async fn ensure_table(&self) {
        if let Err(err) = sqlx::query(CREATE_LEDGER_TABLE_SQL)
            .execute(&self.pool)
            .await
        {
            warn!(error = %err, "Could not create the migrations table");
        }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl Ledger for MySqlLedger {
    async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            "SELECT hash, name, created_at, updated_at FROM migrations ORDER BY hash",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn record(&mut self, hash: &str, name: &str, on: NaiveDate) -> Result<()> {
        sqlx::query(
            "INSERT INTO migrations (hash, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(hash)
        .bind(name)
        .bind(on)
        .bind(on)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&mut self, hash: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM migrations WHERE hash = ?")
            .bind(hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MigrateError::NotInLedger(hash.to_string()));
        }
        Ok(())
    }

    async fn latest(&self) -> Result<Option<LedgerEntry>> {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            "SELECT hash, name, created_at, updated_at FROM migrations \
             ORDER BY created_at DESC, hash DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }
}
