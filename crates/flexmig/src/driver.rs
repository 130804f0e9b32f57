//! Schema driver.
//!
//! This module renders schema operations through a dialect and executes them
//! on a connection, owning the session the statements run in.

use flexmig_core::column::ColumnSpec;
use flexmig_core::dialect::{DdlDialect, MySqlDialect};
use flexmig_core::operation::{SchemaOperation, TableSpec};
use tracing::debug;

use crate::connection::SchemaConnection;
use crate::error::{MigrateError, Result};

/// Executes schema operations against a database.
pub struct SchemaDriver<C: SchemaConnection, D: DdlDialect = MySqlDialect> {
    connection: C,
    dialect: D,
    dry_run: bool,
    in_session: bool,
}

impl<C: SchemaConnection, D: DdlDialect> SchemaDriver<C, D> {
    /// Creates a new driver.
    pub fn new(connection: C, dialect: D) -> Self {
        Self {
            connection,
            dialect,
            dry_run: false,
            in_session: false,
        }
    }

    /// Enables dry-run mode (SQL is printed but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns whether statements are printed instead of executed.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Returns the connection.
    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.connection
    }

    /// Returns the connection mutably.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Consumes the driver, returning its connection.
    pub fn into_connection(self) -> C {
        self.connection
    }

    /// Returns whether a session is open.
    #[must_use]
    pub const fn in_session(&self) -> bool {
        self.in_session
    }

    /// Opens the session transaction.
    ///
    /// DDL statements commit implicitly in MySQL, so the session only keeps
    /// data statements together.
    pub async fn begin(&mut self) -> Result<()> {
        if !self.dry_run {
            self.connection.execute("START TRANSACTION").await?;
        }
        self.in_session = true;
        Ok(())
    }

    /// Commits the session transaction.
    pub async fn commit(&mut self) -> Result<()> {
        self.end("COMMIT").await
    }

    /// Rolls back the session transaction.
    pub async fn abort(&mut self) -> Result<()> {
        self.end("ROLLBACK").await
    }

    async fn end(&mut self, statement: &str) -> Result<()> {
        if !self.in_session {
            return Ok(());
        }
        self.in_session = false;
        if !self.dry_run {
            self.connection.execute(statement).await?;
        }
        Ok(())
    }

    /// Introspects a column and reverse-compiles it.
    ///
    /// Exactly one column must match, otherwise
    /// [`MigrateError::ColumnNotFound`] is returned.
    pub async fn get_column(&mut self, table: &str, column: &str) -> Result<ColumnSpec> {
        let mut natives = self.connection.describe_column(table, column).await?;
        if natives.len() != 1 {
            return Err(MigrateError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
                matches: natives.len(),
            });
        }
        let native = natives.remove(0);
        Ok(self.dialect.compiler().uncompile(column, &native)?)
    }

    /// Renders an operation into its statement.
    ///
    /// A column rename without a definition introspects the existing column.
    pub async fn render(&mut self, operation: &SchemaOperation) -> Result<String> {
        if let SchemaOperation::RenameColumn {
            table,
            from,
            to,
            column: None,
        } = operation
        {
            let existing = self.get_column(table, from).await?;
            return Ok(self
                .dialect
                .rename_column(table, from, &existing.renamed(to.as_str()))?);
        }
        Ok(self.dialect.generate_sql(operation)?)
    }

    /// Renders and executes one operation.
    pub async fn run(&mut self, operation: &SchemaOperation) -> Result<()> {
        let sql = self.render(operation).await?;
        debug!(sql = %sql, "Executing SQL");

        if self.dry_run {
            println!("{sql};");
        } else {
            self.connection.execute(&sql).await?;
        }
        Ok(())
    }

    /// Runs operations in order, stopping at the first failure.
    pub async fn run_all(&mut self, operations: &[SchemaOperation]) -> Result<()> {
        for operation in operations {
            self.run(operation).await?;
        }
        Ok(())
    }

    /// Creates a table.
    pub async fn create_table(&mut self, table: TableSpec) -> Result<()> {
        self.run(&SchemaOperation::create_table(table)).await
    }

    /// Drops a table.
    pub async fn drop_table(&mut self, table: &str) -> Result<()> {
        self.run(&SchemaOperation::drop_table(table)).await
    }

    /// Renames a table.
    pub async fn rename_table(&mut self, from: &str, to: &str) -> Result<()> {
        self.run(&SchemaOperation::rename_table(from, to)).await
    }

    /// Adds a column.
    pub async fn add_column(&mut self, table: &str, column: ColumnSpec) -> Result<()> {
        self.run(&SchemaOperation::add_column(table, column)).await
    }

    /// Renames a column, introspecting its definition when none is given.
    pub async fn rename_column(
        &mut self,
        table: &str,
        from: &str,
        to: &str,
        column: Option<ColumnSpec>,
    ) -> Result<()> {
        let operation = match column {
            Some(column) => SchemaOperation::rename_column_as(table, from, column.renamed(to)),
            None => SchemaOperation::rename_column(table, from, to),
        };
        self.run(&operation).await
    }

    /// Redefines a column in place.
    pub async fn change_column(&mut self, table: &str, column: ColumnSpec) -> Result<()> {
        self.run(&SchemaOperation::change_column(table, column)).await
    }

    /// Drops a column.
    pub async fn remove_column(&mut self, table: &str, column: &str) -> Result<()> {
        self.run(&SchemaOperation::remove_column(table, column)).await
    }

    /// Adds an index of the given type (`normal`, `unique`, `primary` or `spatial`).
    pub async fn add_index(
        &mut self,
        table: &str,
        name: &str,
        columns: &[&str],
        index_type: &str,
    ) -> Result<()> {
        self.run(&SchemaOperation::add_index(
            table,
            name,
            columns.iter().map(ToString::to_string).collect(),
            index_type,
        ))
        .await
    }

    /// Drops an index.
    pub async fn remove_index(&mut self, table: &str, name: &str) -> Result<()> {
        self.run(&SchemaOperation::remove_index(table, name)).await
    }
}
