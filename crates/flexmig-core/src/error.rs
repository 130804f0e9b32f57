//! Errors raised while parsing abstract types and compiling DDL.

/// Errors that can occur while turning column and index specifications into SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeCompileError {
    /// A required part of a definition is missing (type, column name, ...).
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// The abstract type, or its limit, is not part of the vocabulary.
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// A modifier key outside the fixed modifier vocabulary.
    #[error("Unsupported column modifier '{0}'")]
    UnsupportedModifier(String),

    /// A known modifier key carrying a value of the wrong shape.
    #[error("Invalid value for column modifier '{key}': expected {expected}")]
    InvalidModifierValue {
        /// The modifier key.
        key: String,
        /// Description of the accepted value.
        expected: &'static str,
    },

    /// The `type[limit]` syntax could not be parsed.
    #[error("Malformed type '{0}'")]
    MalformedType(String),

    /// An index type other than normal, unique, primary or spatial.
    #[error("Bad index type '{0}'")]
    BadIndexType(String),
}

/// Result type for type compilation.
pub type Result<T> = std::result::Result<T, TypeCompileError>;
