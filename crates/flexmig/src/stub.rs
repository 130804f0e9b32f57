//! New migration files.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::info;

use crate::config::MigratorConfig;
use crate::error::{MigrateError, Result};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid name regex"));

/// Timestamp format of migration hashes.
pub const HASH_FORMAT: &str = "%Y%m%d%H%M%S";

fn template(id: &str) -> String {
    format!(
        r#"# Migration {id}
#
# Each entry is one schema operation, for example:
#
# [[up]]
# op = "create_table"
# table = "posts"
# columns = [
#     {{ name = "title", type = "string[200]", null = false }},
#     {{ name = "body", type = "text" }},
# ]
#
# [[down]]
# op = "drop_table"
# table = "posts"

up = []
down = []
"#
    )
}

/// Writes an empty migration named `<timestamp>_<name>.toml` into the
/// highest-priority migrations directory and returns its identifier.
///
/// `now` is wall-clock local time, the same clock ledger dates use.
pub fn generate_stub(config: &MigratorConfig, name: &str, now: NaiveDateTime) -> Result<String> {
    if !NAME_RE.is_match(name) {
        return Err(MigrateError::InvalidName(name.to_string()));
    }
    let dir = config
        .primary_directory()
        .ok_or_else(|| MigrateError::Config("at least one search root is required".to_string()))?;

    let id = format!("{}_{name}", now.format(HASH_FORMAT));
    let path = dir.join(format!("{id}.toml"));

    fs::create_dir_all(&dir)?;
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Err(MigrateError::StubExists(path));
        }
        Err(err) => return Err(err.into()),
    };
    file.write_all(template(&id).as_bytes())?;

    info!(path = %path.display(), "Created migration");
    Ok(id)
}
