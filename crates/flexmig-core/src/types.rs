//! Abstract column types.
//!
//! An abstract type is written `kind` or `kind[limit]`, for example
//! `integer[big]`, `string[100]` or `decimal[10,2]`. A comma inside the limit
//! may be escaped as `\,`; the escape is removed when the type is parsed.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TypeCompileError};

/// The fixed vocabulary of abstract column kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    /// Integer, limited to `small`, `normal` or `big`.
    Integer,
    /// Variable-length string, limit is the maximum length.
    String,
    /// Unbounded text.
    Text,
    /// Boolean stored as a tiny unsigned integer.
    Boolean,
    /// Fixed-point number, limit is `precision,scale`.
    Decimal,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// Fixed-length binary.
    Binary,
    /// Date and time.
    DateTime,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Timestamp.
    Timestamp,
    /// Enumeration, limit is the quoted value list.
    Enum,
    /// Set, limit is the quoted value list.
    Set,
}

impl TypeKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Integer,
        Self::String,
        Self::Text,
        Self::Boolean,
        Self::Decimal,
        Self::Float,
        Self::Double,
        Self::Binary,
        Self::DateTime,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Enum,
        Self::Set,
    ];

    /// Returns the grammar name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Double => "double",
            Self::Binary => "binary",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Enum => "enum",
            Self::Set => "set",
        }
    }

    /// Limit substituted when a type is written without one.
    #[must_use]
    pub const fn default_limit(self) -> Option<&'static str> {
        match self {
            Self::Integer => Some("normal"),
            Self::String => Some("255"),
            Self::Binary | Self::Boolean => Some("1"),
            Self::Decimal => Some("10,0"),
            _ => None,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeKind {
    type Err = TypeCompileError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeCompileError::UnknownType(s.to_string()))
    }
}

/// A parsed abstract type: a kind plus an optional limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbstractType {
    kind: TypeKind,
    limit: Option<String>,
}

impl AbstractType {
    /// Creates a type without a limit.
    #[must_use]
    pub const fn new(kind: TypeKind) -> Self {
        Self { kind, limit: None }
    }

    /// Creates a type with an explicit limit. An empty limit counts as none.
    #[must_use]
    pub fn with_limit(kind: TypeKind, limit: impl Into<String>) -> Self {
        let limit = limit.into();
        Self {
            kind,
            limit: (!limit.is_empty()).then_some(limit),
        }
    }

    /// Parses the `kind[limit]` grammar.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TypeCompileError::MissingArgument("column type".to_string()));
        }

        let Some(open) = input.find('[') else {
            if input.contains(']') {
                return Err(TypeCompileError::MalformedType(input.to_string()));
            }
            return Ok(Self::new(input.parse()?));
        };

        let inner = input[open + 1..]
            .strip_suffix(']')
            .filter(|inner| !inner.is_empty() && open > 0)
            .ok_or_else(|| TypeCompileError::MalformedType(input.to_string()))?;

        let kind = input[..open].parse()?;
        Ok(Self::with_limit(kind, inner.replace("\\,", ",")))
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the limit as written, if any.
    #[must_use]
    pub fn limit(&self) -> Option<&str> {
        self.limit.as_deref()
    }

    /// Returns the limit, falling back to the kind's default limit.
    #[must_use]
    pub fn normalized_limit(&self) -> Option<&str> {
        self.limit().or_else(|| self.kind.default_limit())
    }
}

impl From<TypeKind> for AbstractType {
    fn from(kind: TypeKind) -> Self {
        Self::new(kind)
    }
}

impl FromStr for AbstractType {
    type Err = TypeCompileError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.limit {
            Some(limit) => write!(f, "{}[{}]", self.kind, limit),
            None => write!(f, "{}", self.kind),
        }
    }
}
