//! Database connection used to execute schema statements.
//!
//! The driver only needs two things from the database: run a statement and
//! describe an existing column. [`SchemaConnection`] captures exactly that so
//! the driver and runner can be exercised without a live server.

use async_trait::async_trait;
use flexmig_core::compiler::NativeColumn;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};

use crate::error::Result;

/// Column metadata lookup by exact table and column name.
const DESCRIBE_COLUMN_SQL: &str = r"
SELECT CONVERT(COLUMN_TYPE USING utf8mb4) AS column_type,
       CONVERT(IS_NULLABLE USING utf8mb4) AS is_nullable,
       CONVERT(COLUMN_DEFAULT USING utf8mb4) AS column_default,
       CONVERT(EXTRA USING utf8mb4) AS extra
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?
";

/// A single connection schema statements are executed on.
#[async_trait]
pub trait SchemaConnection: Send {
    /// Executes one statement, returning the number of affected rows.
    async fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Returns the metadata of every column matching `table`.`column`.
    async fn describe_column(&mut self, table: &str, column: &str) -> Result<Vec<NativeColumn>>;
}

/// MySQL connection backed by sqlx.
pub struct MySqlSchemaConnection {
    conn: MySqlConnection,
}

impl MySqlSchemaConnection {
    /// Wraps an open connection.
    #[must_use]
    pub fn new(conn: MySqlConnection) -> Self {
        Self { conn }
    }

    /// Opens a connection to the given database URL.
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(MySqlConnection::connect(url).await?))
    }

    /// Closes the connection.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

fn native_column(row: &MySqlRow) -> std::result::Result<NativeColumn, sqlx::Error> {
    let is_nullable: String = row.try_get("is_nullable")?;
    Ok(NativeColumn {
        column_type: row.try_get("column_type")?,
        nullable: is_nullable.eq_ignore_ascii_case("YES"),
        default: row.try_get("column_default")?,
        extra: row
            .try_get::<Option<String>, _>("extra")?
            .unwrap_or_default(),
    })
}

#[async_trait]
impl SchemaConnection for MySqlSchemaConnection {
    async fn execute(&mut self, sql: &str) -> Result<u64> {
        // No bind arguments: sent over the text protocol, unprepared.
        let result = sqlx::Executor::execute(&mut self.conn, sql).await?;
        Ok(result.rows_affected())
    }

    async fn describe_column(&mut self, table: &str, column: &str) -> Result<Vec<NativeColumn>> {
        let rows = sqlx::query(DESCRIBE_COLUMN_SQL)
            .bind(table)
            .bind(column)
            .fetch_all(&mut self.conn)
            .await?;

        Ok(rows
            .iter()
            .map(native_column)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
