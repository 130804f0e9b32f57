//! Error types for the migration system.

use std::path::PathBuf;

use flexmig_core::TypeCompileError;

/// Errors that can occur during migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Bad or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A column or index specification could not be compiled.
    #[error("Type compile error: {0}")]
    TypeCompile(#[from] TypeCompileError),

    /// Introspection did not find exactly one matching column.
    #[error("Column '{column}' not found in table '{table}' ({matches} matches)")]
    ColumnNotFound {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Number of columns the introspection returned.
        matches: usize,
    },

    /// No migration file exists for the hash and name.
    #[error("Migration not found: {hash}_{name}")]
    MigrationNotFound {
        /// Migration hash.
        hash: String,
        /// Migration name.
        name: String,
    },

    /// More than one migration file exists for the hash and name.
    #[error("Ambiguous migration {hash}_{name}: {} candidate files", .paths.len())]
    AmbiguousMigration {
        /// Migration hash.
        hash: String,
        /// Migration name.
        name: String,
        /// Every matching file.
        paths: Vec<PathBuf>,
    },

    /// A migration file lacks its `up` or `down` operations.
    #[error("Migration '{unit}' has no {operation} operations")]
    MissingOperation {
        /// Migration identifier.
        unit: String,
        /// `up` or `down`.
        operation: &'static str,
    },

    /// Failed to parse a migration file.
    #[error("Failed to parse migration file '{path}': {message}")]
    Parse {
        /// Path to the migration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A migration name or filename does not follow `<14 digits>_<word>`.
    #[error("Invalid migration name: {0}")]
    InvalidName(String),

    /// Migration file already exists.
    #[error("Migration file already exists: {0}")]
    StubExists(PathBuf),

    /// The ledger has no entry for the hash.
    #[error("Migration {0} is not recorded in the ledger")]
    NotInLedger(String),

    /// Database error during migration execution.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading/writing migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
