use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Create a SQLite connection pool. The writer cap keeps one active write
/// transaction at a time under SQLite's locking model.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(3));

    SqlitePoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// Single-connection in-memory pool. A fresh connection would see a
/// fresh empty database, so the pool is pinned to one connection; used by
/// tests and throwaway simulations.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_in_memory() {
        let result = create_memory_pool().await;
        assert!(result.is_ok());

        let pool = result.unwrap();
        // Pool initializes with min_connections (1)
        assert!(pool.size() >= 1);
    }

    #[tokio::test]
    async fn test_create_pool_invalid_url() {
        let result = create_pool("postgres://not-sqlite").await;
        assert!(result.is_err());
    }
}
