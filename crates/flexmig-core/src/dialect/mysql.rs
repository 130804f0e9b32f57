//! MySQL dialect.
//!
//! Identifiers are quoted with backticks, literals with single quotes and
//! backslash escapes.

use crate::column::ColumnSpec;
use crate::compiler::TypeCompiler;
use crate::error::Result;
use crate::operation::{IndexKind, TableSpec};

use super::DdlDialect;

/// Quotes an identifier with backticks, doubling embedded backticks.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quotes a string literal, escaping backslashes and single quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| quote_identifier(name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// MySQL DDL dialect.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect {
    compiler: TypeCompiler,
}

impl MySqlDialect {
    /// Creates a MySQL dialect with the default type compiler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a MySQL dialect using the given type compiler.
    #[must_use]
    pub const fn with_compiler(compiler: TypeCompiler) -> Self {
        Self { compiler }
    }
}

impl DdlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn compiler(&self) -> &TypeCompiler {
        &self.compiler
    }

    fn create_table(&self, table: &TableSpec) -> Result<String> {
        let (columns, primary_key) = table.resolved_columns();

        let mut definitions = columns
            .iter()
            .map(|column| self.compiler.compile(column, false))
            .collect::<Result<Vec<_>>>()?;

        if !primary_key.is_empty() {
            definitions.push(format!("PRIMARY KEY ({})", quote_list(&primary_key)));
        }

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({}) ENGINE={}",
            quote_identifier(&table.name),
            definitions.join(", "),
            table.engine
        ))
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_identifier(table))
    }

    fn rename_table(&self, from: &str, to: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            quote_identifier(from),
            quote_identifier(to)
        )
    }

    fn add_column(&self, table: &str, column: &ColumnSpec) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote_identifier(table),
            self.compiler.compile(column, true)?
        ))
    }

    fn rename_column(&self, table: &str, from: &str, column: &ColumnSpec) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} CHANGE {} {}",
            quote_identifier(table),
            quote_identifier(from),
            self.compiler.compile(column, true)?
        ))
    }

    fn change_column(&self, table: &str, column: &ColumnSpec) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} MODIFY {}",
            quote_identifier(table),
            self.compiler.compile(column, false)?
        ))
    }

    fn remove_column(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            quote_identifier(table),
            quote_identifier(column)
        )
    }

    fn add_index(&self, table: &str, name: &str, columns: &[String], kind: IndexKind) -> String {
        format!(
            "ALTER TABLE {} ADD {} {} ({})",
            quote_identifier(table),
            kind.as_sql(),
            quote_identifier(name),
            quote_list(columns)
        )
    }

    fn remove_index(&self, table: &str, name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP INDEX {}",
            quote_identifier(table),
            quote_identifier(name)
        )
    }
}
