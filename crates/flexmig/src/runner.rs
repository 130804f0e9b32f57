//! Migration runner.
//!
//! This module discovers migration units, diffs them against the ledger,
//! applies the pending ones in order and rolls back the most recent one.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime};
use flexmig_core::dialect::{DdlDialect, MySqlDialect};
use flexmig_core::operation::SchemaOperation;
use tracing::{info, warn};

use crate::config::MigratorConfig;
use crate::connection::SchemaConnection;
use crate::discovery::{self, Candidate};
use crate::driver::SchemaDriver;
use crate::error::{MigrateError, Result};
use crate::ledger::{Ledger, LedgerEntry};
use crate::report::{MigrationReport, Outcome};
use crate::stub;
use crate::unit::MigrationUnit;

/// Message reported by a rollback against an empty ledger.
pub const NOTHING_TO_ROLL_BACK: &str = "There's no migration to roll back";

/// Which half of a unit to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply the unit.
    Up,
    /// Revert the unit.
    Down,
}

impl Direction {
    fn operations(self, unit: &MigrationUnit) -> &[SchemaOperation] {
        match self {
            Self::Up => &unit.up,
            Self::Down => &unit.down,
        }
    }
}

/// State of one migration as seen by [`MigrationRunner::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    /// 14-digit hash.
    pub hash: String,
    /// Migration name.
    pub name: String,
    /// Date the unit was applied, if it was.
    pub applied_on: Option<NaiveDate>,
    /// File the unit was found in; `None` for a ledger entry without file.
    pub path: Option<PathBuf>,
}

impl UnitStatus {
    /// Returns whether the unit is recorded in the ledger.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.applied_on.is_some()
    }
}

/// Applies and reverts migration units.
pub struct MigrationRunner<C: SchemaConnection, L: Ledger, D: DdlDialect = MySqlDialect> {
    config: MigratorConfig,
    driver: SchemaDriver<C, D>,
    ledger: L,
}

impl<C: SchemaConnection, L: Ledger, D: DdlDialect> MigrationRunner<C, L, D> {
    /// Creates a runner, validating the configuration.
    pub fn new(config: MigratorConfig, driver: SchemaDriver<C, D>, ledger: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            driver,
            ledger,
        })
    }

    /// Enables dry-run mode: statements are printed, the ledger is untouched.
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.driver = self.driver.dry_run(enabled);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Returns the driver.
    #[must_use]
    pub const fn driver(&self) -> &SchemaDriver<C, D> {
        &self.driver
    }

    /// Returns the ledger.
    #[must_use]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Discovers every migration file.
    pub fn discover(&self) -> Result<Vec<Candidate>> {
        discovery::discover(&self.config)
    }

    async fn pending(&self) -> Result<Vec<Candidate>> {
        let applied = self.ledger.applied_hashes().await?;
        // File names start with the hash, so discovery order is hash order.
        Ok(self
            .discover()?
            .into_iter()
            .filter(|c| !applied.contains(&c.hash))
            .collect())
    }

    /// Lists pending migrations as `(hash, name)` pairs, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .pending()
            .await?
            .into_iter()
            .map(|c| (c.hash, c.name))
            .collect())
    }

    fn load(&self, hash: &str, name: &str) -> Result<MigrationUnit> {
        let path = discovery::resolve(&self.config, hash, name)?;
        MigrationUnit::load(&path)
    }

    async fn run_unit(&mut self, hash: &str, name: &str, direction: Direction) -> Result<()> {
        let unit = self.load(hash, name)?;
        self.driver.run_all(direction.operations(&unit)).await
    }

    /// Applies every pending migration in order.
    ///
    /// The first failing unit stops the batch: later units are not attempted
    /// and earlier ones stay applied. A unit whose ledger entry cannot be
    /// written counts as failed. The report holds one outcome per attempted
    /// unit.
    pub async fn migrate(&mut self) -> Result<MigrationReport> {
        let pending = self.pending().await?;
        if pending.is_empty() {
            info!("No pending migrations");
            return Ok(MigrationReport::new());
        }

        self.driver.begin().await?;
        let result = self.apply(&pending).await;
        self.finish(result).await
    }

    async fn apply(&mut self, pending: &[Candidate]) -> Result<MigrationReport> {
        let mut report = MigrationReport::new();

        for candidate in pending {
            let (hash, name) = (candidate.hash.as_str(), candidate.name.as_str());
            let message = format!("Executing migration: '{name}' with hash: {hash}");
            info!(hash = %hash, name = %name, "Applying migration");

            if let Err(err) = self.apply_unit(hash, name).await {
                warn!(hash = %hash, name = %name, error = %err, "Migration failed");
                report.push(Outcome::failure(hash, format!("{message}\n{err}")));
                break;
            }
            info!(hash = %hash, name = %name, "Migration applied successfully");
            report.push(Outcome::success(hash, message));
        }

        Ok(report)
    }

    async fn apply_unit(&mut self, hash: &str, name: &str) -> Result<()> {
        self.run_unit(hash, name, Direction::Up).await?;
        if !self.driver.is_dry_run() {
            self.ledger.record(hash, name, today()).await?;
        }
        Ok(())
    }

    async fn revert_unit(&mut self, hash: &str, name: &str) -> Result<()> {
        self.run_unit(hash, name, Direction::Down).await?;
        if !self.driver.is_dry_run() {
            self.ledger.remove(hash).await?;
        }
        Ok(())
    }

    /// Reverts the most recently applied migration.
    ///
    /// On failure the ledger entry is kept so the rollback can be retried. A
    /// ledger entry that cannot be removed is reported as a failure.
    pub async fn rollback(&mut self) -> Result<MigrationReport> {
        let Some(entry) = self.ledger.latest().await? else {
            info!("No migration to roll back");
            let mut report = MigrationReport::new();
            report.push(Outcome::noop(NOTHING_TO_ROLL_BACK));
            return Ok(report);
        };

        self.driver.begin().await?;
        let result = self.revert(&entry).await;
        self.finish(result).await
    }

    async fn revert(&mut self, entry: &LedgerEntry) -> Result<MigrationReport> {
        let (hash, name) = (entry.hash.as_str(), entry.name.as_str());
        let mut report = MigrationReport::new();
        info!(hash = %hash, name = %name, "Rolling back migration");

        if let Err(err) = self.revert_unit(hash, name).await {
            warn!(hash = %hash, name = %name, error = %err, "Rollback failed");
            report.push(Outcome::failure(hash, err.to_string()));
            return Ok(report);
        }
        info!(hash = %hash, name = %name, "Migration rolled back successfully");
        report.push(Outcome::success(
            hash,
            format!("Migration '{name}' with hash: {hash} was successfully rolled back"),
        ));
        Ok(report)
    }

    /// Commits the session when a report was produced, aborts it otherwise.
    async fn finish(&mut self, result: Result<MigrationReport>) -> Result<MigrationReport> {
        match result {
            Ok(report) => {
                self.driver.commit().await?;
                Ok(report)
            }
            Err(err) => {
                if let Err(abort_err) = self.driver.abort().await {
                    warn!(error = %abort_err, "Failed to roll back the session");
                }
                Err(err)
            }
        }
    }

    /// Every discovered migration with its ledger state, plus ledger entries
    /// whose file is gone, ordered by hash.
    pub async fn status(&self) -> Result<Vec<UnitStatus>> {
        let mut applied: BTreeMap<String, LedgerEntry> = self
            .ledger
            .entries()
            .await?
            .into_iter()
            .map(|e| (e.hash.clone(), e))
            .collect();

        let mut statuses: Vec<UnitStatus> = self
            .discover()?
            .into_iter()
            .map(|c| UnitStatus {
                applied_on: applied.remove(&c.hash).map(|e| e.created_at),
                hash: c.hash,
                name: c.name,
                path: Some(c.path),
            })
            .collect();

        statuses.extend(applied.into_values().map(|e| UnitStatus {
            hash: e.hash,
            name: e.name,
            applied_on: Some(e.created_at),
            path: None,
        }));
        statuses.sort_by_key(|s| s.hash.clone());
        Ok(statuses)
    }

    /// Renders the statements of one migration without executing them.
    pub async fn plan(&mut self, hash: &str, direction: Direction) -> Result<Vec<String>> {
        let candidate = self
            .discover()?
            .into_iter()
            .find(|c| c.hash == hash)
            .ok_or_else(|| MigrateError::MigrationNotFound {
                hash: hash.to_string(),
                name: "*".to_string(),
            })?;
        let unit = self.load(&candidate.hash, &candidate.name)?;

        let mut statements = Vec::new();
        for operation in direction.operations(&unit) {
            statements.push(self.driver.render(operation).await?);
        }
        Ok(statements)
    }

    /// Writes an empty migration into the highest-priority root and returns
    /// its identifier.
    pub fn generate_stub(&self, name: &str) -> Result<String> {
        stub::generate_stub(&self.config, name, now())
    }
}

/// Local wall-clock time; stub hashes and ledger dates both use it.
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn today() -> NaiveDate {
    now().date()
}
