//! Column specifications and their modifiers.
//!
//! A column is a name, an [`AbstractType`] and a [`ColumnModifierSet`]. The
//! modifier vocabulary is closed: `null`, `default`, `auto`, `unsigned`,
//! `comment`, `character_set`, `after` and `first`. Any other key is rejected
//! when the set is built.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Result, TypeCompileError};
use crate::types::{AbstractType, TypeKind};

/// Default value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default, rendered as `1` or `0`.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default, escaped and quoted on rendering.
    String(String),
    /// Raw SQL expression (e.g. `CURRENT_TIMESTAMP`), rendered verbatim.
    Expression(String),
}

/// Where an added or renamed column is placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// First column of the table.
    First,
    /// Directly after the named column.
    After(String),
}

/// A single, typed column modifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnModifier {
    /// Whether the column accepts NULL.
    Null(bool),
    /// Default value.
    Default(DefaultValue),
    /// Auto-increment.
    Auto(bool),
    /// Unsigned numeric column.
    Unsigned(bool),
    /// Column comment.
    Comment(String),
    /// Character set (and optional collation) for text columns.
    CharacterSet(String),
    /// Positional directive, only honoured by add/rename statements.
    Position(Position),
}

impl ColumnModifier {
    /// Returns the key this modifier is written under.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Null(_) => "null",
            Self::Default(_) => "default",
            Self::Auto(_) => "auto",
            Self::Unsigned(_) => "unsigned",
            Self::Comment(_) => "comment",
            Self::CharacterSet(_) => "character_set",
            Self::Position(Position::First) => "first",
            Self::Position(Position::After(_)) => "after",
        }
    }

    /// Builds a modifier from a textual key and an untyped value.
    pub fn from_key(key: &str, value: ModifierValue) -> Result<Self> {
        let invalid = |expected| TypeCompileError::InvalidModifierValue {
            key: key.to_string(),
            expected,
        };

        match key {
            "null" => value.as_bool().map(Self::Null).ok_or_else(|| invalid("a boolean")),
            "auto" => value.as_bool().map(Self::Auto).ok_or_else(|| invalid("a boolean")),
            "unsigned" => value
                .as_bool()
                .map(Self::Unsigned)
                .ok_or_else(|| invalid("a boolean")),
            "default" => value
                .into_default()
                .map(Self::Default)
                .ok_or_else(|| invalid("a finite value")),
            "comment" => value
                .into_text()
                .map(Self::Comment)
                .ok_or_else(|| invalid("a string")),
            "character_set" => value
                .into_text()
                .map(Self::CharacterSet)
                .ok_or_else(|| invalid("a string")),
            "after" => value
                .into_text()
                .map(|column| Self::Position(Position::After(column)))
                .ok_or_else(|| invalid("a column name")),
            "first" => match value {
                ModifierValue::Bool(true) => Ok(Self::Position(Position::First)),
                _ => Err(invalid("true")),
            },
            other => Err(TypeCompileError::UnsupportedModifier(other.to_string())),
        }
    }
}

/// An untyped modifier value, as read from a migration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModifierValue {
    /// `true` / `false`.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Text(String),
    /// `{ expr = "CURRENT_TIMESTAMP" }`, a raw SQL expression.
    Expression {
        /// The SQL expression.
        expr: String,
    },
}

impl ModifierValue {
    const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    fn into_default(self) -> Option<DefaultValue> {
        Some(match self {
            Self::Bool(b) => DefaultValue::Boolean(b),
            Self::Integer(i) => DefaultValue::Integer(i),
            Self::Float(f) if f.is_finite() => DefaultValue::Float(f),
            Self::Float(_) => return None,
            Self::Text(s) => DefaultValue::String(s),
            Self::Expression { expr } => DefaultValue::Expression(expr),
        })
    }
}

/// The modifiers of one column, at most one per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnModifierSet {
    null: Option<bool>,
    default: Option<DefaultValue>,
    auto: Option<bool>,
    unsigned: Option<bool>,
    comment: Option<String>,
    character_set: Option<String>,
    position: Option<Position>,
}

impl ColumnModifierSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from textual key/value pairs, rejecting unknown keys.
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ModifierValue)>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |set, (key, value)| {
                Ok(set.with(ColumnModifier::from_key(key.as_ref(), value)?))
            })
    }

    /// Adds a modifier, replacing any earlier one with the same key.
    #[must_use]
    pub fn with(mut self, modifier: ColumnModifier) -> Self {
        self.insert(modifier);
        self
    }

    /// Adds a modifier in place, replacing any earlier one with the same key.
    pub fn insert(&mut self, modifier: ColumnModifier) {
        match modifier {
            ColumnModifier::Null(b) => self.null = Some(b),
            ColumnModifier::Default(v) => self.default = Some(v),
            ColumnModifier::Auto(b) => self.auto = Some(b),
            ColumnModifier::Unsigned(b) => self.unsigned = Some(b),
            ColumnModifier::Comment(c) => self.comment = Some(c),
            ColumnModifier::CharacterSet(c) => self.character_set = Some(c),
            ColumnModifier::Position(p) => self.position = Some(p),
        }
    }

    /// Whether the column accepts NULL (the default).
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.null.unwrap_or(true)
    }

    /// Default value, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Whether the column auto-increments.
    #[must_use]
    pub fn auto(&self) -> bool {
        self.auto.unwrap_or(false)
    }

    /// Whether the column is unsigned.
    #[must_use]
    pub fn unsigned(&self) -> bool {
        self.unsigned.unwrap_or(false)
    }

    /// Column comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Explicit character set, if any.
    #[must_use]
    pub fn character_set(&self) -> Option<&str> {
        self.character_set.as_deref()
    }

    /// Positional directive, if any.
    #[must_use]
    pub const fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }
}

/// Full specification of a column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawColumn")]
pub struct ColumnSpec {
    name: String,
    column_type: AbstractType,
    modifiers: ColumnModifierSet,
}

impl ColumnSpec {
    /// Creates a column with no modifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<AbstractType>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            modifiers: ColumnModifierSet::new(),
        }
    }

    /// Creates a column from the textual type grammar.
    pub fn parse(name: impl Into<String>, column_type: &str) -> Result<Self> {
        Ok(Self::new(name, AbstractType::parse(column_type)?))
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the abstract type.
    #[must_use]
    pub const fn column_type(&self) -> &AbstractType {
        &self.column_type
    }

    /// Returns the modifiers.
    #[must_use]
    pub const fn modifiers(&self) -> &ColumnModifierSet {
        &self.modifiers
    }

    /// Returns a copy of this column under another name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Adds a modifier.
    #[must_use]
    pub fn modifier(mut self, modifier: ColumnModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    /// Replaces all modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: ColumnModifierSet) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(self) -> Self {
        self.modifier(ColumnModifier::Null(false))
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(self, value: DefaultValue) -> Self {
        self.modifier(ColumnModifier::Default(value))
    }

    /// Sets the column to auto-increment.
    #[must_use]
    pub fn auto_increment(self) -> Self {
        self.modifier(ColumnModifier::Auto(true))
    }

    /// Sets the column as unsigned.
    #[must_use]
    pub fn unsigned(self) -> Self {
        self.modifier(ColumnModifier::Unsigned(true))
    }

    /// Sets the column comment.
    #[must_use]
    pub fn comment(self, comment: impl Into<String>) -> Self {
        self.modifier(ColumnModifier::Comment(comment.into()))
    }

    /// Sets the character set.
    #[must_use]
    pub fn character_set(self, charset: impl Into<String>) -> Self {
        self.modifier(ColumnModifier::CharacterSet(charset.into()))
    }

    /// Places the column first.
    #[must_use]
    pub fn first(self) -> Self {
        self.modifier(ColumnModifier::Position(Position::First))
    }

    /// Places the column after another one.
    #[must_use]
    pub fn after(self, column: impl Into<String>) -> Self {
        self.modifier(ColumnModifier::Position(Position::After(column.into())))
    }

    /// Whether this column has the `integer` kind.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.column_type.kind() == TypeKind::Integer
    }
}

/// Column as written in a migration file: `{ name, type, <modifiers>... }`.
#[derive(Deserialize)]
struct RawColumn {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    column_type: String,
    #[serde(flatten)]
    modifiers: BTreeMap<String, ModifierValue>,
}

impl TryFrom<RawColumn> for ColumnSpec {
    type Error = TypeCompileError;

    fn try_from(raw: RawColumn) -> Result<Self> {
        Ok(Self::parse(raw.name, &raw.column_type)?
            .with_modifiers(ColumnModifierSet::from_pairs(raw.modifiers)?))
    }
}
