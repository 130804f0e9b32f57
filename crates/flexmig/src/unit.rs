//! Migration units.
//!
//! A unit is one versioned schema change read from a file such as
//! `20240115093000_create_users.toml`:
//!
//! ```toml
//! [[up]]
//! op = "create_table"
//! table = "users"
//! columns = [
//!     { name = "email", type = "string[190]", null = false },
//! ]
//!
//! [[down]]
//! op = "drop_table"
//! table = "users"
//! ```

use std::fs;
use std::path::Path;

use flexmig_core::operation::SchemaOperation;
use serde::Deserialize;

use crate::discovery::parse_stem;
use crate::error::{MigrateError, Result};

/// On-disk format of a unit file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl UnitFormat {
    /// Picks the format from a file extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UnitFile {
    up: Option<Vec<SchemaOperation>>,
    down: Option<Vec<SchemaOperation>>,
}

/// A migration unit with its up and down operations.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationUnit {
    /// 14-digit hash.
    pub hash: String,
    /// Migration name.
    pub name: String,
    /// Operations applied by `migrate`.
    pub up: Vec<SchemaOperation>,
    /// Operations applied by `rollback`.
    pub down: Vec<SchemaOperation>,
}

impl MigrationUnit {
    /// Creates an empty unit.
    #[must_use]
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
            up: Vec::new(),
            down: Vec::new(),
        }
    }

    /// Appends an up operation.
    #[must_use]
    pub fn up(mut self, operation: SchemaOperation) -> Self {
        self.up.push(operation);
        self
    }

    /// Appends a down operation.
    #[must_use]
    pub fn down(mut self, operation: SchemaOperation) -> Self {
        self.down.push(operation);
        self
    }

    /// Returns `<hash>_<name>`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}_{}", self.hash, self.name)
    }

    /// Loads a unit from a file, taking hash and name from the file name.
    pub fn load(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let (hash, name) =
            parse_stem(stem).ok_or_else(|| MigrateError::InvalidName(path.display().to_string()))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(UnitFormat::from_extension)
            .ok_or_else(|| MigrateError::InvalidName(path.display().to_string()))?;

        let contents = fs::read_to_string(path)?;
        Self::parse(hash, name, &contents, format).map_err(|err| match err {
            MigrateError::Parse { message, .. } => MigrateError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parses a unit document.
    ///
    /// Both `up` and `down` must be present; either may be an empty list.
    pub fn parse(hash: &str, name: &str, contents: &str, format: UnitFormat) -> Result<Self> {
        let parse_error = |message: String| MigrateError::Parse {
            path: format!("{hash}_{name}").into(),
            message,
        };
        let file: UnitFile = match format {
            UnitFormat::Toml => toml::from_str(contents).map_err(|e| parse_error(e.to_string()))?,
            UnitFormat::Json => {
                serde_json::from_str(contents).map_err(|e| parse_error(e.to_string()))?
            }
        };

        let id = format!("{hash}_{name}");
        let up = file.up.ok_or_else(|| MigrateError::MissingOperation {
            unit: id.clone(),
            operation: "up",
        })?;
        let down = file.down.ok_or(MigrateError::MissingOperation {
            unit: id,
            operation: "down",
        })?;

        Ok(Self {
            hash: hash.to_string(),
            name: name.to_string(),
            up,
            down,
        })
    }
}

#[cfg(test)]
mod tests {
    use flexmig_core::column::DefaultValue;
    use flexmig_core::operation::PrimaryKey;
    use flexmig_core::types::TypeKind;

    use super::*;

    const USERS_TOML: &str = r#"
[[up]]
op = "create_table"
table = "users"
primary_key = "email"
columns = [
    { name = "email", type = "string[190]", null = false },
    { name = "active", type = "boolean", default = true },
]

[[up]]
op = "add_index"
table = "users"
name = "idx_active"
columns = ["active"]

[[down]]
op = "drop_table"
table = "users"
"#;

    #[test]
    fn test_parse_toml() {
        let unit =
            MigrationUnit::parse("20240115093000", "create_users", USERS_TOML, UnitFormat::Toml)
                .unwrap();

        assert_eq!(unit.id(), "20240115093000_create_users");
        assert_eq!(unit.up.len(), 2);
        assert_eq!(unit.down, vec![SchemaOperation::drop_table("users")]);

        let SchemaOperation::CreateTable(table) = &unit.up[0] else {
            panic!("expected create_table, got {:?}", unit.up[0]);
        };
        assert_eq!(table.name, "users");
        assert_eq!(table.primary_key, PrimaryKey::Columns(vec!["email".to_string()]));
        assert_eq!(table.columns[0].column_type().limit(), Some("190"));
        assert!(!table.columns[0].modifiers().nullable());
        assert_eq!(table.columns[1].column_type().kind(), TypeKind::Boolean);
        assert_eq!(
            table.columns[1].modifiers().default_value(),
            Some(&DefaultValue::Boolean(true))
        );

        let SchemaOperation::AddIndex { index_type, .. } = &unit.up[1] else {
            panic!("expected add_index, got {:?}", unit.up[1]);
        };
        assert_eq!(index_type, "normal");
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "up": [{"op": "rename_column", "table": "users", "from": "login", "to": "username"}],
            "down": [{"op": "execute", "sql": "UPDATE users SET username = NULL"}]
        }"#;

        let unit = MigrationUnit::parse("20240116000000", "rename_login", json, UnitFormat::Json)
            .unwrap();

        assert_eq!(
            unit.up,
            vec![SchemaOperation::rename_column("users", "login", "username")]
        );
        assert_eq!(
            unit.down,
            vec![SchemaOperation::execute("UPDATE users SET username = NULL")]
        );
    }

    #[test]
    fn test_missing_down_is_rejected() {
        let err = MigrationUnit::parse("20240115093000", "only_up", "up = []", UnitFormat::Toml)
            .unwrap_err();

        assert!(matches!(
            err,
            MigrateError::MissingOperation {
                operation: "down",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_operation_lists_are_allowed() {
        let unit = MigrationUnit::parse(
            "20240115093000",
            "noop",
            "up = []\ndown = []",
            UnitFormat::Toml,
        )
        .unwrap();
        assert!(unit.up.is_empty() && unit.down.is_empty());
    }

    #[test]
    fn test_unknown_operation_is_a_parse_error() {
        let err = MigrationUnit::parse(
            "20240115093000",
            "bad",
            r#"{"up": [{"op": "truncate", "table": "x"}], "down": []}"#,
            UnitFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, MigrateError::Parse { .. }));
    }

    #[test]
    fn test_unknown_modifier_is_a_parse_error() {
        let err = MigrationUnit::parse(
            "20240115093000",
            "bad_modifier",
            r#"{"up": [{"op": "add_column", "table": "t",
                        "column": {"name": "c", "type": "text", "colour": "red"}}],
                "down": []}"#,
            UnitFormat::Json,
        )
        .unwrap_err();
        let MigrateError::Parse { message, .. } = err else {
            panic!("expected parse error, got {err:?}");
        };
        assert!(message.contains("colour"), "{message}");
    }

    #[test]
    fn test_load_takes_identity_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240115093000_create_users.toml");
        fs::write(&path, USERS_TOML).unwrap();

        let unit = MigrationUnit::load(&path).unwrap();
        assert_eq!(unit.hash, "20240115093000");
        assert_eq!(unit.name, "create_users");

        let bad = dir.path().join("create_users.toml");
        fs::write(&bad, USERS_TOML).unwrap();
        assert!(matches!(
            MigrationUnit::load(&bad),
            Err(MigrateError::InvalidName(_))
        ));
    }
}
