//! Schema operations.
//!
//! A migration unit's `up` and `down` sequences are lists of
//! [`SchemaOperation`]s. In migration files each operation is a table tagged
//! by `op`:
//!
//! ```toml
//! [[up]]
//! op = "add_column"
//! table = "users"
//! column = { name = "email", type = "string[120]", null = false, after = "name" }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::column::{ColumnModifier, ColumnSpec};
use crate::error::TypeCompileError;
use crate::types::TypeKind;

/// Storage engine used when a table does not name one.
pub const DEFAULT_ENGINE: &str = "InnoDB";

/// Primary key of a new table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawPrimaryKey")]
pub enum PrimaryKey {
    /// Prepend an unsigned auto-increment `id` column and use it.
    #[default]
    Implicit,
    /// No primary key clause.
    None,
    /// The given column(s).
    Columns(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrimaryKey {
    Flag(bool),
    One(String),
    Many(Vec<String>),
}

impl From<RawPrimaryKey> for PrimaryKey {
    fn from(raw: RawPrimaryKey) -> Self {
        match raw {
            RawPrimaryKey::Flag(true) => Self::Implicit,
            RawPrimaryKey::Flag(false) => Self::None,
            RawPrimaryKey::One(column) => Self::Columns(vec![column]),
            RawPrimaryKey::Many(columns) if columns.is_empty() => Self::None,
            RawPrimaryKey::Many(columns) => Self::Columns(columns),
        }
    }
}

fn default_engine() -> String {
    DEFAULT_ENGINE.to_string()
}

/// Specification of a table to create.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableSpec {
    /// Table name.
    #[serde(rename = "table")]
    pub name: String,
    /// Column definitions, in order.
    pub columns: Vec<ColumnSpec>,
    /// Primary key.
    #[serde(default)]
    pub primary_key: PrimaryKey,
    /// Storage engine.
    #[serde(default = "default_engine")]
    pub engine: String,
}

impl TableSpec {
    /// Creates a table spec with an implicit `id` primary key.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: PrimaryKey::Implicit,
            engine: default_engine(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key(mut self, primary_key: PrimaryKey) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Sets the storage engine.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Returns the columns to create and the primary key column names.
    ///
    /// An implicit key prepends `id` (integer, unsigned, not null), or moves
    /// a declared `id` column to the front in its place. A single integer
    /// key column is made auto-increment.
    #[must_use]
    pub fn resolved_columns(&self) -> (Vec<ColumnSpec>, Vec<String>) {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        let key = match &self.primary_key {
            PrimaryKey::Implicit => {
                let id = self.columns.iter().find(|c| c.name() == "id").cloned();
                columns.push(id.unwrap_or_else(|| {
                    ColumnSpec::new("id", TypeKind::Integer)
                        .unsigned()
                        .not_null()
                }));
                vec!["id".to_string()]
            }
            PrimaryKey::None => Vec::new(),
            PrimaryKey::Columns(names) => names.clone(),
        };
        let implicit_id = matches!(self.primary_key, PrimaryKey::Implicit);
        columns.extend(
            self.columns
                .iter()
                .filter(|c| !(implicit_id && c.name() == "id"))
                .cloned(),
        );

        if let [single] = key.as_slice() {
            for column in &mut columns {
                if column.name() == single && column.is_integer() {
                    *column = column.clone().modifier(ColumnModifier::Auto(true));
                }
            }
        }

        (columns, key)
    }
}

/// Kind of index added by [`SchemaOperation::AddIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Plain index.
    Normal,
    /// Unique key.
    Unique,
    /// Primary key.
    Primary,
    /// Spatial index.
    Spatial,
}

impl IndexKind {
    /// Returns the SQL keyword(s) for this index kind.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Normal => "INDEX",
            Self::Unique => "UNIQUE KEY",
            Self::Primary => "PRIMARY KEY",
            Self::Spatial => "SPATIAL INDEX",
        }
    }
}

impl FromStr for IndexKind {
    type Err = TypeCompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "unique" => Ok(Self::Unique),
            "primary" => Ok(Self::Primary),
            "spatial" => Ok(Self::Spatial),
            other => Err(TypeCompileError::BadIndexType(other.to_string())),
        }
    }
}

fn default_index_type() -> String {
    "normal".to_string()
}

/// A single declarative schema change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SchemaOperation {
    /// Create a table (if it does not exist).
    CreateTable(TableSpec),

    /// Drop a table (if it exists).
    DropTable {
        /// Table name.
        table: String,
    },

    /// Rename a table.
    RenameTable {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },

    /// Add a column.
    AddColumn {
        /// Table name.
        table: String,
        /// Column definition.
        column: ColumnSpec,
    },

    /// Redefine a column in place.
    ChangeColumn {
        /// Table name.
        table: String,
        /// New column definition.
        column: ColumnSpec,
    },

    /// Rename a column, optionally redefining it.
    RenameColumn {
        /// Table name.
        table: String,
        /// Current column name.
        from: String,
        /// New column name.
        to: String,
        /// Definition under the new name; introspected when absent.
        #[serde(default)]
        column: Option<ColumnSpec>,
    },

    /// Drop a column.
    RemoveColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Add an index.
    AddIndex {
        /// Table name.
        table: String,
        /// Index name.
        name: String,
        /// Indexed columns.
        columns: Vec<String>,
        /// `normal`, `unique`, `primary` or `spatial`.
        #[serde(rename = "type", default = "default_index_type")]
        index_type: String,
    },

    /// Drop an index.
    RemoveIndex {
        /// Table name.
        table: String,
        /// Index name.
        name: String,
    },

    /// Run a raw SQL statement.
    Execute {
        /// The statement.
        sql: String,
    },
}

impl SchemaOperation {
    /// Creates a CreateTable operation.
    #[must_use]
    pub const fn create_table(table: TableSpec) -> Self {
        Self::CreateTable(table)
    }

    /// Creates a DropTable operation.
    #[must_use]
    pub fn drop_table(table: impl Into<String>) -> Self {
        Self::DropTable {
            table: table.into(),
        }
    }

    /// Creates a RenameTable operation.
    #[must_use]
    pub fn rename_table(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::RenameTable {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates an AddColumn operation.
    #[must_use]
    pub fn add_column(table: impl Into<String>, column: ColumnSpec) -> Self {
        Self::AddColumn {
            table: table.into(),
            column,
        }
    }

    /// Creates a ChangeColumn operation.
    #[must_use]
    pub fn change_column(table: impl Into<String>, column: ColumnSpec) -> Self {
        Self::ChangeColumn {
            table: table.into(),
            column,
        }
    }

    /// Creates a RenameColumn operation whose definition is introspected.
    #[must_use]
    pub fn rename_column(
        table: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::RenameColumn {
            table: table.into(),
            from: from.into(),
            to: to.into(),
            column: None,
        }
    }

    /// Creates a RenameColumn operation with an explicit definition.
    #[must_use]
    pub fn rename_column_as(
        table: impl Into<String>,
        from: impl Into<String>,
        column: ColumnSpec,
    ) -> Self {
        Self::RenameColumn {
            table: table.into(),
            from: from.into(),
            to: column.name().to_string(),
            column: Some(column),
        }
    }

    /// Creates a RemoveColumn operation.
    #[must_use]
    pub fn remove_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::RemoveColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates an AddIndex operation.
    #[must_use]
    pub fn add_index(
        table: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<String>,
        index_type: impl Into<String>,
    ) -> Self {
        Self::AddIndex {
            table: table.into(),
            name: name.into(),
            columns,
            index_type: index_type.into(),
        }
    }

    /// Creates a RemoveIndex operation.
    #[must_use]
    pub fn remove_index(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::RemoveIndex {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Creates an Execute operation.
    #[must_use]
    pub fn execute(sql: impl Into<String>) -> Self {
        Self::Execute { sql: sql.into() }
    }
}

impl fmt::Display for SchemaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable(table) => write!(f, "create table {}", table.name),
            Self::DropTable { table } => write!(f, "drop table {table}"),
            Self::RenameTable { from, to } => write!(f, "rename table {from} to {to}"),
            Self::AddColumn { table, column } => {
                write!(f, "add column {table}.{}", column.name())
            }
            Self::ChangeColumn { table, column } => {
                write!(f, "change column {table}.{}", column.name())
            }
            Self::RenameColumn { table, from, to, .. } => {
                write!(f, "rename column {table}.{from} to {to}")
            }
            Self::RemoveColumn { table, column } => write!(f, "remove column {table}.{column}"),
            Self::AddIndex { table, name, .. } => write!(f, "add index {name} on {table}"),
            Self::RemoveIndex { table, name } => write!(f, "remove index {name} on {table}"),
            Self::Execute { .. } => f.write_str("execute sql"),
        }
    }
}
