// Migration Runner

use queueless_core::error::AppError;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::map_sqlx_error;

/// Ordered migrations: (version, description, SQL)
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (
        1,
        "Catalog, counters and tokens",
        include_str!("../migrations/001_initial_schema.sql"),
    ),
    (
        2,
        "Users and feedback",
        include_str!("../migrations/002_add_users_feedback.sql"),
    ),
];

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    info!("Running database migrations...");

    // Check if schema_version table exists
    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await
    .map_err(map_sqlx_error)?;

    let current_version: i64 = if table_exists > 0 {
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(map_sqlx_error)?
            .unwrap_or(0)
    } else {
        0
    };

    info!(current_version = current_version, "Current schema version");

    // Apply migrations sequentially
    for (version, description, sql) in MIGRATIONS {
        if current_version < *version {
            info!(version = version, "Applying migration: {}", description);
            apply_migration(pool, sql).await?;
        }
    }

    info!("All migrations applied successfully");
    Ok(())
}

/// Split a migration script into executable statements.
///
/// `--` comment lines are dropped before splitting so a `;` inside a
/// comment never cuts a statement.
fn split_statements(sql: &str) -> Vec<String> {
    let uncommented = sql
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    uncommented
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply a single migration SQL file
async fn apply_migration(pool: &SqlitePool, sql: &str) -> Result<(), AppError> {
    // Execute migration in a transaction
    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;

    for statement in split_statements(sql) {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
    }

    tx.commit().await.map_err(map_sqlx_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tokens")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version, 2);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_semicolon_in_comment_does_not_split_statement() {
        let sql = "-- first; second\nCREATE TABLE a (id INTEGER);\n\n-- trailing; note\nINSERT INTO a VALUES (1);\n";
        assert_eq!(
            split_statements(sql),
            vec![
                "CREATE TABLE a (id INTEGER)".to_string(),
                "INSERT INTO a VALUES (1)".to_string(),
            ]
        );
    }

    #[test]
    fn test_bundled_migrations_split_cleanly() {
        for (_, _, sql) in MIGRATIONS {
            for statement in split_statements(sql) {
                let head = statement.split_whitespace().next().unwrap_or_default();
                assert!(
                    matches!(head, "CREATE" | "INSERT"),
                    "unexpected statement start: {}",
                    statement
                );
            }
        }
    }
}
