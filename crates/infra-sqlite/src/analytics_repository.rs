// SQLite AnalyticsRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use queueless_core::domain::{HourlyBookings, ServiceCount, StatusCount};
use queueless_core::error::{AppError, Result};
use queueless_core::port::AnalyticsRepository;
use sqlx::SqlitePool;

pub struct SqliteAnalyticsRepository {
    pool: SqlitePool,
}

impl SqliteAnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for SqliteAnalyticsRepository {
    async fn bookings_by_hour(&self) -> Result<Vec<HourlyBookings>> {
        // created_at is epoch ms; hours are UTC
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT CAST(strftime('%H', created_at / 1000, 'unixepoch') AS INTEGER) AS hour,
                   COUNT(*) AS bookings
            FROM tokens
            GROUP BY hour
            ORDER BY hour ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(hour, bookings)| {
                let hour = u32::try_from(hour)
                    .map_err(|_| AppError::Database(format!("invalid hour bucket: {}", hour)))?;
                Ok(HourlyBookings { hour, bookings })
            })
            .collect()
    }

    async fn tokens_by_department(&self) -> Result<Vec<ServiceCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT d.name, COUNT(*) AS issued
            FROM tokens t
            JOIN departments d ON d.id = t.department_id
            GROUP BY d.id, d.name
            ORDER BY d.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(service, count)| ServiceCount { service, count })
            .collect())
    }

    async fn tokens_by_status(&self) -> Result<Vec<StatusCount>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM tokens GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(status, count)| {
                let status = status.parse().map_err(|_| {
                    AppError::Database(format!("corrupt token status in store: {}", status))
                })?;
                Ok(StatusCount { status, count })
            })
            .collect()
    }
}
