//! Migration file discovery.
//!
//! Files are named `<14 digits>_<name>.<toml|json>` and live in the
//! migrations directory of each configured root.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::MigratorConfig;
use crate::error::{MigrateError, Result};

/// Extensions recognised as migration files.
pub const EXTENSIONS: [&str; 2] = ["toml", "json"];

static STEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{14})_([A-Za-z0-9_]+)$").expect("valid stem regex"));

/// A migration file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 14-digit hash.
    pub hash: String,
    /// Migration name.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// File name including the extension.
    pub file_name: String,
}

impl Candidate {
    /// `<hash>_<name>`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}_{}", self.hash, self.name)
    }
}

/// Splits a file stem into hash and name.
#[must_use]
pub fn parse_stem(stem: &str) -> Option<(&str, &str)> {
    let captures = STEM_RE.captures(stem)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

/// Returns whether the stem follows `<14 digits>_<word>`.
#[must_use]
pub fn is_migration_stem(stem: &str) -> bool {
    STEM_RE.is_match(stem)
}

fn candidate(path: &Path) -> Option<Candidate> {
    let extension = path.extension()?.to_str()?;
    if !EXTENSIONS.contains(&extension) {
        return None;
    }
    let (hash, name) = parse_stem(path.file_stem()?.to_str()?)?;
    Some(Candidate {
        hash: hash.to_string(),
        name: name.to_string(),
        path: path.to_path_buf(),
        file_name: path.file_name()?.to_str()?.to_string(),
    })
}

/// Lists the migration files of one directory, sorted by lowercase name.
///
/// A missing directory yields no files.
fn scan(dir: &Path) -> Result<Vec<Candidate>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "Skipping missing migrations directory");
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            found.extend(candidate(&path));
        }
    }
    found.sort_by_key(|c| c.file_name.to_lowercase());
    Ok(found)
}

/// Discovers every migration across the configured roots.
///
/// A hash found in several places resolves to the last one seen: later roots
/// override earlier ones and, within a root, later file names win. The result
/// is sorted by file name, case-insensitively.
pub fn discover(config: &MigratorConfig) -> Result<Vec<Candidate>> {
    let mut by_hash = BTreeMap::new();
    for dir in config.directories() {
        for found in scan(&dir)? {
            by_hash.insert(found.hash.clone(), found);
        }
    }

    let mut candidates: Vec<Candidate> = by_hash.into_values().collect();
    candidates.sort_by_key(|c| c.file_name.to_lowercase());
    Ok(candidates)
}

/// Finds the file for one migration.
///
/// Roots are searched from the highest priority down and the first root
/// holding a match wins. Several matching files in that root (say a `.toml`
/// and a `.json`) are ambiguous.
pub fn resolve(config: &MigratorConfig, hash: &str, name: &str) -> Result<PathBuf> {
    let stem = format!("{hash}_{name}");

    for dir in config.directories().rev() {
        let mut matches: Vec<PathBuf> = scan(&dir)?
            .into_iter()
            .filter(|c| c.hash == hash && c.name == name)
            .map(|c| c.path)
            .collect();

        match matches.len() {
            0 => continue,
            1 => return Ok(matches.remove(0)),
            _ => {
                return Err(MigrateError::AmbiguousMigration {
                    hash: hash.to_string(),
                    name: name.to_string(),
                    paths: matches,
                })
            }
        }
    }

    debug!(stem = %stem, "No migration file found");
    Err(MigrateError::MigrationNotFound {
        hash: hash.to_string(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stem() {
        assert_eq!(
            parse_stem("20240101120000_create_users"),
            Some(("20240101120000", "create_users"))
        );
        assert_eq!(parse_stem("2024010112000_short"), None);
        assert_eq!(parse_stem("20240101120000-dash"), None);
        assert_eq!(parse_stem("20240101120000_bad-name"), None);
        assert!(!is_migration_stem("20240101120000_"));
    }

    #[test]
    fn test_candidate_requires_known_extension() {
        assert!(candidate(Path::new("/m/20240101120000_users.toml")).is_some());
        assert!(candidate(Path::new("/m/20240101120000_users.json")).is_some());
        assert!(candidate(Path::new("/m/20240101120000_users.yaml")).is_none());
        assert!(candidate(Path::new("/m/20240101120000_users")).is_none());
    }
}
