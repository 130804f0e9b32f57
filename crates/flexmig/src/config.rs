//! Migration search configuration.

use std::path::{Path, PathBuf};

use crate::error::{MigrateError, Result};

/// Default migrations directory, relative to each root.
pub const DEFAULT_PATH: &str = "migrations";

/// Where migration files are searched for.
///
/// Each root contributes `<root>/<path>`. Roots are listed from lowest to
/// highest priority: when two roots hold a migration with the same hash, the
/// later root wins, and new stubs are written to the last root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    /// Search roots, lowest priority first.
    pub roots: Vec<PathBuf>,
    /// Migrations directory relative to each root.
    pub path: PathBuf,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            path: PathBuf::from(DEFAULT_PATH),
        }
    }
}

impl MigratorConfig {
    /// Creates a configuration without roots.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            roots: Vec::new(),
            path: path.into(),
        }
    }

    /// Appends a root with higher priority than the existing ones.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Checks that there is at least one root and a relative path.
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(MigrateError::Config(
                "at least one search root is required".to_string(),
            ));
        }
        if self.path.as_os_str().is_empty() {
            return Err(MigrateError::Config(
                "the migrations path must not be empty".to_string(),
            ));
        }
        if self.path.is_absolute() {
            return Err(MigrateError::Config(format!(
                "the migrations path must be relative to the roots, got {}",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Migration directories, lowest priority first.
    pub fn directories(&self) -> impl DoubleEndedIterator<Item = PathBuf> + '_ {
        self.roots.iter().map(|root| root.join(&self.path))
    }

    /// Directory new migrations are written to.
    #[must_use]
    pub fn primary_directory(&self) -> Option<PathBuf> {
        self.roots.last().map(|root| root.join(&self.path))
    }

    /// Returns the migrations path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MigratorConfig::default();
        config.validate().unwrap();
        assert_eq!(
            config.primary_directory(),
            Some(PathBuf::from("./migrations"))
        );
    }

    #[test]
    fn test_directories_in_priority_order() {
        let config = MigratorConfig::new("db").root("/vendor").root("/app");
        let dirs: Vec<_> = config.directories().collect();

        assert_eq!(dirs, vec![PathBuf::from("/vendor/db"), PathBuf::from("/app/db")]);
        assert_eq!(config.primary_directory(), Some(PathBuf::from("/app/db")));
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        assert!(matches!(
            MigratorConfig::new("migrations").validate(),
            Err(MigrateError::Config(_))
        ));
        assert!(matches!(
            MigratorConfig::new("").root(".").validate(),
            Err(MigrateError::Config(_))
        ));
        assert!(matches!(
            MigratorConfig::new("/abs").root(".").validate(),
            Err(MigrateError::Config(_))
        ));
    }
}
