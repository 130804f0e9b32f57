//! Abstract type compiler.
//!
//! Forward compilation turns a [`ColumnSpec`] into a MySQL column definition.
//! Reverse compilation turns introspected column metadata back into a
//! [`ColumnSpec`]. The reverse direction is a lossy inverse: kind and limit
//! survive a round trip, formatting and character set do not.

use crate::column::{ColumnModifier, ColumnModifierSet, ColumnSpec, DefaultValue, Position};
use crate::dialect::mysql::{quote_identifier, quote_literal};
use crate::error::{Result, TypeCompileError};
use crate::types::{AbstractType, TypeKind};

/// Character set applied to text columns that do not name their own.
pub const DEFAULT_CHARACTER_SET: &str = "utf8 COLLATE utf8_general_ci";

/// Column metadata as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeColumn {
    /// Native type, e.g. `int unsigned` or `varchar(64)`.
    pub column_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default value, if any.
    pub default: Option<String>,
    /// Extra flags, e.g. `auto_increment`.
    pub extra: String,
}

/// Compiles abstract column types to native column definitions and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCompiler {
    default_charset: Option<String>,
}

impl Default for TypeCompiler {
    fn default() -> Self {
        Self {
            default_charset: Some(DEFAULT_CHARACTER_SET.to_string()),
        }
    }
}

impl TypeCompiler {
    /// Creates a compiler using [`DEFAULT_CHARACTER_SET`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the default character set; `None` omits the clause for
    /// columns without an explicit `character_set`.
    #[must_use]
    pub fn with_default_charset(mut self, charset: Option<String>) -> Self {
        self.default_charset = charset;
        self
    }

    /// Returns the default character set.
    #[must_use]
    pub fn default_charset(&self) -> Option<&str> {
        self.default_charset.as_deref()
    }

    /// Maps an abstract type to its native fragment.
    pub fn native_type(&self, column_type: &AbstractType) -> Result<String> {
        let kind = column_type.kind();
        let limit = column_type.normalized_limit().unwrap_or_default();

        match kind {
            TypeKind::Integer => match limit {
                "big" => Ok("bigint".to_string()),
                "normal" => Ok("int".to_string()),
                "small" => Ok("smallint".to_string()),
                _ => Err(TypeCompileError::UnknownType(column_type.to_string())),
            },
            TypeKind::String => Ok(format!("varchar({limit})")),
            TypeKind::Boolean => Ok("tinyint(1) unsigned".to_string()),
            _ if limit.is_empty() => Ok(kind.as_str().to_string()),
            _ => Ok(format!("{} ({limit})", kind.as_str())),
        }
    }

    /// Compiles a full column definition.
    ///
    /// The positional directive (`FIRST` / `AFTER`) is only rendered when
    /// `allow_order` is set.
    pub fn compile(&self, column: &ColumnSpec, allow_order: bool) -> Result<String> {
        if column.name().is_empty() {
            return Err(TypeCompileError::MissingArgument("column name".to_string()));
        }

        let native = self.native_type(column.column_type())?;
        let modifiers = column.modifiers();
        let mut parts = vec![quote_identifier(column.name()), native.clone()];

        if is_textual(&native) {
            if let Some(charset) = modifiers.character_set().or(self.default_charset()) {
                parts.push(format!("CHARACTER SET {charset}"));
            }
        }

        if modifiers.unsigned() && !native.to_ascii_uppercase().contains("UNSIGNED") {
            parts.push("UNSIGNED".to_string());
        }

        if let Some(default) = modifiers.default_value() {
            parts.push(format!("DEFAULT {}", render_default(default)));
        }

        parts.push(if modifiers.nullable() { "NULL" } else { "NOT NULL" }.to_string());

        if modifiers.auto() {
            parts.push("AUTO_INCREMENT".to_string());
        }

        if let Some(comment) = modifiers.comment() {
            parts.push(format!("COMMENT {}", quote_literal(comment)));
        }

        if allow_order {
            match modifiers.position() {
                Some(Position::First) => parts.push("FIRST".to_string()),
                Some(Position::After(other)) => {
                    parts.push(format!("AFTER {}", quote_identifier(other)));
                }
                None => {}
            }
        }

        Ok(parts.join(" "))
    }

    /// Recovers a column specification from introspected metadata.
    pub fn uncompile(&self, name: impl Into<String>, native: &NativeColumn) -> Result<ColumnSpec> {
        let mut modifiers = ColumnModifierSet::new();
        let mut column_type = native.column_type.trim();

        if let Some(stripped) = strip_suffix_ignore_case(column_type, " zerofill") {
            column_type = stripped.trim_end();
        }
        if let Some(stripped) = strip_suffix_ignore_case(column_type, " unsigned") {
            modifiers.insert(ColumnModifier::Unsigned(true));
            column_type = stripped.trim_end();
        }

        let (base, args) = split_native(column_type);
        let abstract_type = match base.to_ascii_lowercase().as_str() {
            "bigint" => AbstractType::with_limit(TypeKind::Integer, "big"),
            "smallint" => AbstractType::with_limit(TypeKind::Integer, "small"),
            "int" => AbstractType::new(TypeKind::Integer),
            "varchar" => AbstractType::with_limit(TypeKind::String, args.unwrap_or_default()),
            "tinyint" => AbstractType::new(TypeKind::Boolean),
            other => AbstractType::with_limit(other.parse()?, args.unwrap_or_default()),
        };

        if !native.nullable {
            modifiers.insert(ColumnModifier::Null(false));
        }

        if let Some(default) = &native.default {
            modifiers.insert(ColumnModifier::Default(introspected_default(default)));
        }

        if native.extra.to_ascii_lowercase().contains("auto_increment") {
            modifiers.insert(ColumnModifier::Auto(true));
        }

        Ok(ColumnSpec::new(name, abstract_type).with_modifiers(modifiers))
    }
}

fn is_textual(native: &str) -> bool {
    native == "text" || native.starts_with("text ") || native.contains("varchar")
}

fn render_default(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => "NULL".to_string(),
        DefaultValue::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        DefaultValue::Integer(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::String(s) => quote_literal(s),
        DefaultValue::Expression(expr) => expr.clone(),
    }
}

fn introspected_default(default: &str) -> DefaultValue {
    if default.to_ascii_uppercase().starts_with("CURRENT_TIMESTAMP") {
        DefaultValue::Expression(default.to_string())
    } else {
        DefaultValue::String(default.to_string())
    }
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    let tail = value.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &value[..split])
}

/// Splits `name(args)` into its parts; `args` is `None` without parentheses.
fn split_native(native: &str) -> (&str, Option<&str>) {
    match native.find('(') {
        Some(open) => {
            let base = native[..open].trim();
            let args = native[open + 1..]
                .strip_suffix(')')
                .filter(|args| !args.is_empty());
            (base, args)
        }
        None => (native, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(column: &ColumnSpec) -> String {
        TypeCompiler::new().compile(column, false).unwrap()
    }

    fn native(column_type: &str) -> NativeColumn {
        NativeColumn {
            column_type: column_type.to_string(),
            nullable: true,
            default: None,
            extra: String::new(),
        }
    }

    #[test]
    fn test_native_fragments() {
        let compiler = TypeCompiler::new();
        let native = |grammar: &str| {
            compiler
                .native_type(&AbstractType::parse(grammar).unwrap())
                .unwrap()
        };

        assert_eq!(native("integer"), "int");
        assert_eq!(native("integer[big]"), "bigint");
        assert_eq!(native("integer[small]"), "smallint");
        assert_eq!(native("string"), "varchar(255)");
        assert_eq!(native("string[64]"), "varchar(64)");
        assert_eq!(native("boolean"), "tinyint(1) unsigned");
        assert_eq!(native("decimal"), "decimal (10,0)");
        assert_eq!(native("binary"), "binary (1)");
        assert_eq!(native("text"), "text");
        assert_eq!(native("enum['a','b']"), "enum ('a','b')");
    }

    #[test]
    fn test_unknown_integer_limit() {
        let err = TypeCompiler::new()
            .native_type(&AbstractType::with_limit(TypeKind::Integer, "huge"))
            .unwrap_err();
        assert_eq!(err, TypeCompileError::UnknownType("integer[huge]".to_string()));
    }

    #[test]
    fn test_plain_column() {
        let col = ColumnSpec::new("count", TypeKind::Integer);
        assert_eq!(compile(&col), "`count` int NULL");
    }

    #[test]
    fn test_full_rendering_order() {
        let col = ColumnSpec::parse("slug", "string[80]")
            .unwrap()
            .after("title")
            .comment("URL slug")
            .not_null()
            .default(DefaultValue::String("it's".to_string()))
            .character_set("latin1");

        assert_eq!(
            TypeCompiler::new().compile(&col, true).unwrap(),
            "`slug` varchar(80) CHARACTER SET latin1 DEFAULT 'it\\'s' NOT NULL \
             COMMENT 'URL slug' AFTER `title`"
        );
    }

    #[test]
    fn test_default_charset_on_text_only() {
        assert_eq!(
            compile(&ColumnSpec::new("body", TypeKind::Text)),
            "`body` text CHARACTER SET utf8 COLLATE utf8_general_ci NULL"
        );
        assert_eq!(
            compile(&ColumnSpec::new("when", TypeKind::Date)),
            "`when` date NULL"
        );

        let compiler = TypeCompiler::new().with_default_charset(None);
        assert_eq!(
            compiler
                .compile(&ColumnSpec::new("name", TypeKind::String), false)
                .unwrap(),
            "`name` varchar(255) NULL"
        );
    }

    #[test]
    fn test_unsigned_not_repeated() {
        let col = ColumnSpec::new("flag", TypeKind::Boolean).unsigned();
        assert_eq!(compile(&col), "`flag` tinyint(1) unsigned NULL");

        let col = ColumnSpec::parse("id", "integer[big]")
            .unwrap()
            .unsigned()
            .not_null()
            .auto_increment();
        assert_eq!(compile(&col), "`id` bigint UNSIGNED NOT NULL AUTO_INCREMENT");
    }

    #[test]
    fn test_default_values() {
        let render = |value| compile(&ColumnSpec::new("v", TypeKind::Integer).default(value));

        assert_eq!(render(DefaultValue::Boolean(true)), "`v` int DEFAULT 1 NULL");
        assert_eq!(render(DefaultValue::Boolean(false)), "`v` int DEFAULT 0 NULL");
        assert_eq!(render(DefaultValue::Integer(-4)), "`v` int DEFAULT -4 NULL");
        assert_eq!(
            render(DefaultValue::Expression("CURRENT_TIMESTAMP".to_string())),
            "`v` int DEFAULT CURRENT_TIMESTAMP NULL"
        );
    }

    #[test]
    fn test_position_needs_allow_order() {
        let col = ColumnSpec::new("a", TypeKind::Integer).first();
        let compiler = TypeCompiler::new();

        assert_eq!(compiler.compile(&col, false).unwrap(), "`a` int NULL");
        assert_eq!(compiler.compile(&col, true).unwrap(), "`a` int NULL FIRST");
    }

    #[test]
    fn test_missing_name() {
        let err = TypeCompiler::new()
            .compile(&ColumnSpec::new("", TypeKind::Text), false)
            .unwrap_err();
        assert!(matches!(err, TypeCompileError::MissingArgument(_)));
    }

    #[test]
    fn test_uncompile_integer_family() {
        let compiler = TypeCompiler::new();

        let col = compiler.uncompile("id", &native("bigint(20) unsigned")).unwrap();
        assert_eq!(col.column_type(), &AbstractType::with_limit(TypeKind::Integer, "big"));
        assert!(col.modifiers().unsigned());

        let col = compiler.uncompile("n", &native("int")).unwrap();
        assert_eq!(col.column_type(), &AbstractType::new(TypeKind::Integer));
        assert!(!col.modifiers().unsigned());

        let col = compiler.uncompile("s", &native("smallint(6)")).unwrap();
        assert_eq!(col.column_type().limit(), Some("small"));

        let col = compiler
            .uncompile("code", &native("int(10) unsigned zerofill"))
            .unwrap();
        assert_eq!(col.column_type(), &AbstractType::new(TypeKind::Integer));
        assert!(col.modifiers().unsigned());
    }

    #[test]
    fn test_uncompile_metadata() {
        let col = TypeCompiler::new()
            .uncompile(
                "id",
                &NativeColumn {
                    column_type: "int unsigned".to_string(),
                    nullable: false,
                    default: None,
                    extra: "auto_increment".to_string(),
                },
            )
            .unwrap();

        assert_eq!(col.name(), "id");
        assert!(!col.modifiers().nullable());
        assert!(col.modifiers().auto());
        assert!(col.modifiers().unsigned());
    }

    #[test]
    fn test_uncompile_defaults() {
        let compiler = TypeCompiler::new();

        let mut meta = native("varchar(32)");
        meta.default = Some("guest".to_string());
        let col = compiler.uncompile("role", &meta).unwrap();
        assert_eq!(col.column_type(), &AbstractType::with_limit(TypeKind::String, "32"));
        assert_eq!(
            col.modifiers().default_value(),
            Some(&DefaultValue::String("guest".to_string()))
        );

        let mut meta = native("timestamp");
        meta.default = Some("CURRENT_TIMESTAMP".to_string());
        let col = compiler.uncompile("at", &meta).unwrap();
        assert_eq!(
            col.modifiers().default_value(),
            Some(&DefaultValue::Expression("CURRENT_TIMESTAMP".to_string()))
        );
    }

    #[test]
    fn test_uncompile_pass_through_and_unknown() {
        let compiler = TypeCompiler::new();

        let col = compiler.uncompile("price", &native("decimal(8,2)")).unwrap();
        assert_eq!(col.column_type(), &AbstractType::with_limit(TypeKind::Decimal, "8,2"));

        let col = compiler.uncompile("on", &native("tinyint(4)")).unwrap();
        assert_eq!(col.column_type(), &AbstractType::new(TypeKind::Boolean));

        let err = compiler.uncompile("doc", &native("json")).unwrap_err();
        assert_eq!(err, TypeCompileError::UnknownType("json".to_string()));
    }
}
