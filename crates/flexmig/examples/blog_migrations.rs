//! Example: Blog Application Migrations
//!
//! Builds the migration units of a small blog in code and prints the MySQL
//! statements they apply and revert. No database is needed.
//!
//! Run with: cargo run --example blog_migrations -p flexmig

use flexmig::prelude::*;

fn create_users() -> Result<MigrationUnit> {
    Ok(MigrationUnit::new("20240115093000", "create_users")
        .up(SchemaOperation::create_table(
            TableSpec::new("users")
                .column(ColumnSpec::parse("username", "string[100]")?.not_null())
                .column(ColumnSpec::parse("email", "string[190]")?.not_null())
                .column(
                    ColumnSpec::new("is_active", TypeKind::Boolean)
                        .not_null()
                        .default(DefaultValue::Boolean(true)),
                )
                .column(
                    ColumnSpec::new("created_at", TypeKind::Timestamp)
                        .not_null()
                        .default(DefaultValue::Expression("CURRENT_TIMESTAMP".to_string())),
                ),
        ))
        .up(SchemaOperation::add_index(
            "users",
            "uniq_users_email",
            vec!["email".to_string()],
            "unique",
        ))
        .down(SchemaOperation::drop_table("users")))
}

fn create_posts() -> Result<MigrationUnit> {
    Ok(MigrationUnit::new("20240116101500", "create_posts")
        .up(SchemaOperation::create_table(
            TableSpec::new("posts")
                .column(ColumnSpec::parse("author_id", "integer")?.unsigned().not_null())
                .column(ColumnSpec::parse("title", "string[200]")?.not_null())
                .column(ColumnSpec::parse("status", "enum['draft','published']")?)
                .column(ColumnSpec::new("body", TypeKind::Text).comment("Markdown source")),
        ))
        .up(SchemaOperation::add_index(
            "posts",
            "idx_posts_author",
            vec!["author_id".to_string()],
            "normal",
        ))
        .down(SchemaOperation::drop_table("posts")))
}

fn rename_login() -> Result<MigrationUnit> {
    let login = ColumnSpec::parse("login", "string[100]")?.not_null();
    Ok(MigrationUnit::new("20240120080000", "rename_username")
        .up(SchemaOperation::rename_column_as(
            "users",
            "username",
            login.clone(),
        ))
        .up(SchemaOperation::add_column(
            "users",
            ColumnSpec::parse("bio", "text")?.after("email"),
        ))
        .down(SchemaOperation::remove_column("users", "bio"))
        .down(SchemaOperation::rename_column_as(
            "users",
            "login",
            login.renamed("username"),
        )))
}

fn print_unit(dialect: &MySqlDialect, unit: &MigrationUnit) -> Result<()> {
    println!("\n-- Migration: {}", unit.id());
    for operation in &unit.up {
        println!("{};", dialect.generate_sql(operation)?);
    }
    println!("-- Rollback:");
    for operation in &unit.down {
        println!("{};", dialect.generate_sql(operation)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    println!("{}", "=".repeat(70));
    println!(" FLEXMIG: Blog Application Example");
    println!("{}", "=".repeat(70));

    let dialect = MySqlDialect::new();
    for unit in [create_users()?, create_posts()?, rename_login()?] {
        print_unit(&dialect, &unit)?;
    }

    println!();
    println!("{}", "-".repeat(70));
    println!("Write units like these as TOML files under migrations/ and run:");
    println!("    flexmig --database-url mysql://localhost/blog migrate");
    Ok(())
}
