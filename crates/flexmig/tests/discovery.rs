//! Discovery and resolution of migration files across search roots.

use std::fs;
use std::path::Path;

use flexmig::prelude::*;
use tempfile::TempDir;

fn write(root: &Path, file_name: &str, contents: &str) {
    let dir = root.join("migrations");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), contents).unwrap();
}

fn empty_unit() -> &'static str {
    "up = []\ndown = []\n"
}

fn names(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.file_name.as_str()).collect()
}

#[test]
fn discovery_is_sorted_by_file_name() {
    let root = TempDir::new().unwrap();
    write(root.path(), "20240301000000_third.toml", empty_unit());
    write(root.path(), "20240101000000_first.json", r#"{"up": [], "down": []}"#);
    write(root.path(), "20240201000000_Second.toml", empty_unit());

    let config = MigratorConfig::new("migrations").root(root.path());
    let found = discover(&config).unwrap();

    assert_eq!(
        names(&found),
        vec![
            "20240101000000_first.json",
            "20240201000000_Second.toml",
            "20240301000000_third.toml",
        ]
    );
    assert_eq!(found[1].hash, "20240201000000");
    assert_eq!(found[1].name, "Second");
}

#[test]
fn discovery_ignores_foreign_files() {
    let root = TempDir::new().unwrap();
    write(root.path(), "20240101000000_users.toml", empty_unit());
    write(root.path(), "README.md", "notes");
    write(root.path(), "20240101000000_users.toml.bak", empty_unit());
    write(root.path(), "2024_users.toml", empty_unit());
    write(root.path(), "20240102000000_users.yaml", empty_unit());
    fs::create_dir_all(root.path().join("migrations/20240103000000_dir.toml")).unwrap();

    let config = MigratorConfig::new("migrations").root(root.path());
    let found = discover(&config).unwrap();

    assert_eq!(names(&found), vec!["20240101000000_users.toml"]);
}

#[test]
fn later_root_wins_for_the_same_hash() {
    let vendor = TempDir::new().unwrap();
    let app = TempDir::new().unwrap();
    write(vendor.path(), "20240101000000_create_users.toml", empty_unit());
    write(vendor.path(), "20240102000000_vendor_only.toml", empty_unit());
    write(app.path(), "20240101000000_create_users.toml", empty_unit());

    let config = MigratorConfig::new("migrations")
        .root(vendor.path())
        .root(app.path());
    let found = discover(&config).unwrap();

    assert_eq!(found.len(), 2);
    assert!(found[0].path.starts_with(app.path()));
    assert!(found[1].path.starts_with(vendor.path()));

    let resolved = resolve(&config, "20240101000000", "create_users").unwrap();
    assert!(resolved.starts_with(app.path()));
}

#[test]
fn missing_directories_are_skipped() {
    let empty = TempDir::new().unwrap();
    let app = TempDir::new().unwrap();
    write(app.path(), "20240101000000_create_users.toml", empty_unit());

    let config = MigratorConfig::new("migrations")
        .root(empty.path())
        .root(app.path());

    assert_eq!(discover(&config).unwrap().len(), 1);
}

#[test]
fn resolve_reports_ambiguity_and_absence() {
    let root = TempDir::new().unwrap();
    write(root.path(), "20240101000000_create_users.toml", empty_unit());
    write(
        root.path(),
        "20240101000000_create_users.json",
        r#"{"up": [], "down": []}"#,
    );
    let config = MigratorConfig::new("migrations").root(root.path());

    match resolve(&config, "20240101000000", "create_users") {
        Err(MigrateError::AmbiguousMigration { paths, .. }) => assert_eq!(paths.len(), 2),
        other => panic!("expected ambiguity, got {other:?}"),
    }

    assert!(matches!(
        resolve(&config, "20240101000000", "create_posts"),
        Err(MigrateError::MigrationNotFound { .. })
    ));
}

#[test]
fn resolved_file_loads_as_a_unit() {
    let root = TempDir::new().unwrap();
    write(
        root.path(),
        "20240101000000_create_users.toml",
        r#"
[[up]]
op = "create_table"
table = "users"
primary_key = false
columns = [{ name = "email", type = "string[190]" }]

[[down]]
op = "drop_table"
table = "users"
"#,
    );
    let config = MigratorConfig::new("migrations").root(root.path());

    let path = resolve(&config, "20240101000000", "create_users").unwrap();
    let unit = MigrationUnit::load(&path).unwrap();
    let sql = MySqlDialect::new().generate_sql(&unit.up[0]).unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `users` (`email` varchar(190) \
         CHARACTER SET utf8 COLLATE utf8_general_ci NULL) ENGINE=InnoDB"
    );
}
