use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::student_repository::StudentRepository;
use crate::storage::traits::Connection;

/// DbConnection manages the SQLite connection pool
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection, creating the database file if needed
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        info!("Connecting to database at {}", url);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {url}"))?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize an isolated in-memory database for tests
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Each in-memory connection is its own database, so keep exactly one
        // connection alive for the lifetime of the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                dni TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                birth_date TEXT NOT NULL,
                medication TEXT NOT NULL,
                conditions TEXT NOT NULL,
                plan_type TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                join_date TEXT NOT NULL,
                payment_due_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Ordering for the student list
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_students_last_name
            ON students(last_name, name);
            "#,
        )
        .execute(pool)
        .await?;

        // The autoincrement id preserves insertion order of check-ins
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                dni TEXT NOT NULL,
                checked_in_at TEXT NOT NULL,
                FOREIGN KEY (dni) REFERENCES students (dni) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_attendance_dni
            ON attendance(dni, id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payments (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id BLOB NOT NULL UNIQUE,
                dni TEXT NOT NULL,
                payment_date TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                FOREIGN KEY (dni) REFERENCES students (dni) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_payments_dni
            ON payments(dni, seq);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type StudentRepository = StudentRepository;

    fn create_student_repository(&self) -> Self::StudentRepository {
        StudentRepository::new(self.clone())
    }
}
