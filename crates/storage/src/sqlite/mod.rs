use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::repository::Storage;

mod activity_repo;
mod mapping;
mod migrate;
mod progress_repo;
mod selection_repo;
mod session_repo;
mod settings_repo;
mod statistics_repo;

/// Default bound on acquiring a connection and on waiting for a locked database.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL and the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        Self::connect_with_timeout(database_url, DEFAULT_STORAGE_TIMEOUT).await
    }

    /// Connect to `SQLite`, creating the database file if needed.
    ///
    /// `timeout` bounds both pool acquisition and the `SQLite` busy wait, so a
    /// stalled store surfaces as [`crate::StorageError::Timeout`] instead of hanging.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the URL is invalid, the connection cannot
    /// be established, or the connection pragmas fail.
    pub async fn connect_with_timeout(
        database_url: &str,
        timeout: Duration,
    ) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let busy_ms = timeout.as_millis();
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query(&format!("PRAGMA busy_timeout = {busy_ms};"))
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        Self::sqlite_with_timeout(database_url, DEFAULT_STORAGE_TIMEOUT).await
    }

    /// Like [`Storage::sqlite`] with an explicit storage timeout.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite_with_timeout(
        database_url: &str,
        timeout: Duration,
    ) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect_with_timeout(database_url, timeout).await?;
        repo.migrate().await?;
        Ok(Self {
            progress: Arc::new(repo.clone()),
            selections: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            statistics: Arc::new(repo.clone()),
            settings: Arc::new(repo.clone()),
            activity: Arc::new(repo),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }
}
