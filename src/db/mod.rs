// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite via sqlx).
//!
//! Provides typed operations for:
//! - Users (registration, lookup by name)
//! - Tokens (hashed bearer credentials)
//! - Workouts and their ordered entries

pub mod tokens;
pub mod users;
pub mod workouts;

use crate::services::TokenError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Storage failures, classified for the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed row does not exist.
    #[error("record not found")]
    NotFound,

    /// A constraint rejected the write (unique, foreign key, check).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The database could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => classify_database_error(db_err),
            sqlx::Error::Io(e) => StoreError::Unavailable(e.to_string()),
            sqlx::Error::Tls(e) => StoreError::Unavailable(e.to_string()),
            sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".into()),
            sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".into()),
            sqlx::Error::WorkerCrashed => StoreError::Unavailable("database worker crashed".into()),
            other => StoreError::Query(other),
        }
    }
}

/// SQLITE_BUSY and SQLITE_LOCKED primary result codes.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

fn classify_database_error(db_err: Box<dyn sqlx::error::DatabaseError>) -> StoreError {
    use sqlx::error::ErrorKind;

    match db_err.kind() {
        ErrorKind::UniqueViolation
        | ErrorKind::ForeignKeyViolation
        | ErrorKind::CheckViolation
        | ErrorKind::NotNullViolation => StoreError::Conflict(db_err.message().to_string()),
        _ => {
            // Extended result codes keep the primary code in the low byte.
            let primary = db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .map(|code| code & 0xff);
            match primary {
                Some(SQLITE_BUSY | SQLITE_LOCKED) => {
                    StoreError::Unavailable(db_err.message().to_string())
                }
                _ => StoreError::Query(sqlx::Error::Database(db_err)),
            }
        }
    }
}

/// Pooled database handle. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (creating if needed) the database at `url` and run migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        tracing::info!(url, max_connections, "Connected to database");
        Ok(db)
    }

    /// Private in-memory database for tests.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection. Call once on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_errors_are_classified() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::ColumnNotFound("x".into())),
            StoreError::Query(_)
        ));
    }

    #[tokio::test]
    async fn test_locked_database_reports_unavailable() {
        use sqlx::{sqlite::SqliteConnection, Connection};
        use std::time::Duration;

        let path = std::env::temp_dir().join(format!("zenith-locked-{}.db", std::process::id()));
        let url = format!("sqlite://{}", path.display());
        let db = Db::connect(&url, 1).await.unwrap();

        let mut holder = db.pool().acquire().await.unwrap();
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *holder)
            .await
            .unwrap();

        let options = SqliteConnectOptions::from_str(&url)
            .unwrap()
            .busy_timeout(Duration::ZERO);
        let mut contender = SqliteConnection::connect_with(&options).await.unwrap();
        let err = sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut contender)
            .await
            .unwrap_err();

        assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));

        contender.close().await.unwrap();
        sqlx::query("ROLLBACK").execute(&mut *holder).await.unwrap();
        drop(holder);
        db.close().await;
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_constraint_violations_are_conflicts() {
        let db = Db::in_memory().await.unwrap();

        let err = sqlx::query("INSERT INTO tokens (hash, user_id, expiry, scope) VALUES (x'00', 42, 0, 'authentication')")
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::Conflict(_)));

        let err = sqlx::query("SELECT * FROM no_such_table")
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_closed_pool_reports_unavailable() {
        let db = Db::in_memory().await.unwrap();
        db.close().await;

        let err = db.get_workout_owner(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
