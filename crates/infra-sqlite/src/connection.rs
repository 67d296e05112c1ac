// SQLite Connection Pool Setup

use queueless_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const MAX_CONNECTIONS: u32 = 10;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create SQLite connection pool with WAL mode and foreign keys.
///
/// An in-memory database lives and dies with its connection, so it gets a
/// single connection that is never recycled.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, AppError> {
    let in_memory = is_in_memory(database_url);

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("Invalid database url {}: {}", database_url, e)))?
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true)
        .create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    debug!(in_memory = in_memory, "SQLite pool created");
    Ok(pool)
}
