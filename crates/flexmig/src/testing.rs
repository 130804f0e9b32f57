//! In-memory connection and ledger used by unit tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use flexmig_core::compiler::NativeColumn;

use crate::connection::SchemaConnection;
use crate::error::{MigrateError, Result};
use crate::ledger::{Ledger, LedgerEntry};

/// Records executed statements; fails any statement containing `fail_on`.
#[derive(Debug, Default)]
pub(crate) struct FakeConnection {
    pub statements: Vec<String>,
    pub columns: HashMap<(String, String), Vec<NativeColumn>>,
    pub fail_on: Option<String>,
}

impl FakeConnection {
    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_on: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    pub fn with_column(mut self, table: &str, column: &str, native: NativeColumn) -> Self {
        self.columns
            .entry((table.to_string(), column.to_string()))
            .or_default()
            .push(native);
        self
    }

    /// Executed statements without the session bookkeeping.
    pub fn ddl(&self) -> Vec<&str> {
        self.statements
            .iter()
            .map(String::as_str)
            .filter(|sql| !matches!(*sql, "START TRANSACTION" | "COMMIT" | "ROLLBACK"))
            .collect()
    }
}

#[async_trait]
impl SchemaConnection for FakeConnection {
    async fn execute(&mut self, sql: &str) -> Result<u64> {
        if let Some(pattern) = &self.fail_on {
            if sql.contains(pattern.as_str()) {
                return Err(MigrateError::Database(sqlx::Error::Protocol(format!(
                    "forced failure: {sql}"
                ))));
            }
        }
        self.statements.push(sql.to_string());
        Ok(0)
    }

    async fn describe_column(&mut self, table: &str, column: &str) -> Result<Vec<NativeColumn>> {
        Ok(self
            .columns
            .get(&(table.to_string(), column.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Ledger kept in a vector; writes for the `fail_on` hash fail.
#[derive(Debug, Default)]
pub(crate) struct MemoryLedger {
    pub entries: Vec<LedgerEntry>,
    pub fail_on: Option<String>,
}

impl MemoryLedger {
    pub fn failing_on(hash: &str) -> Self {
        Self {
            fail_on: Some(hash.to_string()),
            ..Self::default()
        }
    }

    fn check_write(&self, hash: &str) -> Result<()> {
        if self.fail_on.as_deref() == Some(hash) {
            return Err(MigrateError::Database(sqlx::Error::Protocol(format!(
                "ledger unavailable for {hash}"
            ))));
        }
        Ok(())
    }

    pub fn with_entry(mut self, hash: &str, name: &str, on: NaiveDate) -> Self {
        self.entries.push(LedgerEntry::new(hash, name, on));
        self
    }

    pub fn hashes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.hash.as_str()).collect()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.entries.clone())
    }

    async fn record(&mut self, hash: &str, name: &str, on: NaiveDate) -> Result<()> {
        self.check_write(hash)?;
        if self.entries.iter().any(|e| e.hash == hash) {
            return Err(MigrateError::Database(sqlx::Error::Protocol(format!(
                "duplicate entry for {hash}"
            ))));
        }
        self.entries.push(LedgerEntry::new(hash, name, on));
        Ok(())
    }

    async fn remove(&mut self, hash: &str) -> Result<()> {
        self.check_write(hash)?;
        let idx = self
            .entries
            .iter()
            .position(|e| e.hash == hash)
            .ok_or_else(|| MigrateError::NotInLedger(hash.to_string()))?;
        self.entries.remove(idx);
        Ok(())
    }
}

pub(crate) fn native(column_type: &str, nullable: bool) -> NativeColumn {
    NativeColumn {
        column_type: column_type.to_string(),
        nullable,
        default: None,
        extra: String::new(),
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Writes a migration file into `dir`, creating it.
pub(crate) fn write_unit(dir: &Path, file_name: &str, contents: &str) {
    std::fs::create_dir_all(dir).expect("create migrations dir");
    std::fs::write(dir.join(file_name), contents).expect("write migration file");
}
