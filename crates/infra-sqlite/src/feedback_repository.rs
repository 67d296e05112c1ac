// SQLite FeedbackRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use queueless_core::domain::Feedback;
use queueless_core::error::Result;
use queueless_core::port::FeedbackRepository;
use sqlx::SqlitePool;

pub struct SqliteFeedbackRepository {
    pool: SqlitePool,
}

impl SqliteFeedbackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for SqliteFeedbackRepository {
    async fn insert(&self, feedback: &Feedback) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feedback (id, name, email, rating, message, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&feedback.id)
        .bind(&feedback.name)
        .bind(&feedback.email)
        .bind(feedback.rating)
        .bind(&feedback.message)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM feedback")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    #[tokio::test]
    async fn test_insert_and_count() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqliteFeedbackRepository::new(pool);

        repo.insert(&Feedback {
            id: "f-1".to_string(),
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            rating: 4,
            message: "Short wait today".to_string(),
            created_at: 1_000,
        })
        .await
        .unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
