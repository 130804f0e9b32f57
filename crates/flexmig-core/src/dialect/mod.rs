//! Dialect-specific DDL rendering.
//!
//! A dialect renders each [`SchemaOperation`] into exactly one statement.
//! Rendering is pure: nothing here talks to a database.

pub mod mysql;

pub use mysql::MySqlDialect;

use crate::column::ColumnSpec;
use crate::compiler::TypeCompiler;
use crate::error::{Result, TypeCompileError};
use crate::operation::{IndexKind, SchemaOperation, TableSpec};

/// Trait for dialect-specific DDL generation.
pub trait DdlDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the type compiler used for column definitions.
    fn compiler(&self) -> &TypeCompiler;

    /// `CREATE TABLE` for the given table.
    fn create_table(&self, table: &TableSpec) -> Result<String>;

    /// `DROP TABLE`.
    fn drop_table(&self, table: &str) -> String;

    /// Table rename.
    fn rename_table(&self, from: &str, to: &str) -> String;

    /// Adds a column; positional directives are honoured.
    fn add_column(&self, table: &str, column: &ColumnSpec) -> Result<String>;

    /// Renames `from` to the name of `column`, redefining it.
    fn rename_column(&self, table: &str, from: &str, column: &ColumnSpec) -> Result<String>;

    /// Redefines a column in place; positional directives are ignored.
    fn change_column(&self, table: &str, column: &ColumnSpec) -> Result<String>;

    /// Drops a column.
    fn remove_column(&self, table: &str, column: &str) -> String;

    /// Adds an index.
    fn add_index(&self, table: &str, name: &str, columns: &[String], kind: IndexKind) -> String;

    /// Drops an index.
    fn remove_index(&self, table: &str, name: &str) -> String;

    /// Generates the statement for an operation.
    ///
    /// A [`SchemaOperation::RenameColumn`] without a definition cannot be
    /// rendered without introspection and yields
    /// [`TypeCompileError::MissingArgument`].
    fn generate_sql(&self, operation: &SchemaOperation) -> Result<String> {
        match operation {
            SchemaOperation::CreateTable(table) => self.create_table(table),
            SchemaOperation::DropTable { table } => Ok(self.drop_table(table)),
            SchemaOperation::RenameTable { from, to } => Ok(self.rename_table(from, to)),
            SchemaOperation::AddColumn { table, column } => self.add_column(table, column),
            SchemaOperation::ChangeColumn { table, column } => self.change_column(table, column),
            SchemaOperation::RenameColumn {
                table,
                from,
                to,
                column,
            } => {
                let column = column.as_ref().ok_or_else(|| {
                    TypeCompileError::MissingArgument(format!(
                        "definition for renamed column {table}.{from}"
                    ))
                })?;
                self.rename_column(table, from, &column.renamed(to.as_str()))
            }
            SchemaOperation::RemoveColumn { table, column } => {
                Ok(self.remove_column(table, column))
            }
            SchemaOperation::AddIndex {
                table,
                name,
                columns,
                index_type,
            } => Ok(self.add_index(table, name, columns, index_type.parse()?)),
            SchemaOperation::RemoveIndex { table, name } => Ok(self.remove_index(table, name)),
            SchemaOperation::Execute { sql } => Ok(sql.clone()),
        }
    }
}
