//! Abstract column types and DDL compilation for `flexmig`.
//!
//! This crate is pure: it parses the portable `type[limit]` grammar, compiles
//! column specifications to MySQL column definitions, recovers specifications
//! from introspected metadata, and renders schema operations to statements.
//! Executing those statements is the job of the `flexmig` crate.
//!
//! # Example
//!
//! ```rust
//! use flexmig_core::prelude::*;
//!
//! let table = TableSpec::new("posts")
//!     .column(ColumnSpec::parse("title", "string[200]").unwrap().not_null())
//!     .column(ColumnSpec::parse("body", "text").unwrap());
//!
//! let sql = MySqlDialect::new().create_table(&table).unwrap();
//! assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `posts` (`id` int UNSIGNED"));
//! ```

pub mod column;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod operation;
pub mod types;

pub use error::{Result, TypeCompileError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::column::{
        ColumnModifier, ColumnModifierSet, ColumnSpec, DefaultValue, ModifierValue, Position,
    };
    pub use crate::compiler::{NativeColumn, TypeCompiler, DEFAULT_CHARACTER_SET};
    pub use crate::dialect::{DdlDialect, MySqlDialect};
    pub use crate::error::TypeCompileError;
    pub use crate::operation::{IndexKind, PrimaryKey, SchemaOperation, TableSpec, DEFAULT_ENGINE};
    pub use crate::types::{AbstractType, TypeKind};
}
