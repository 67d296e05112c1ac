// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use queueless_core::domain::{DepartmentId, Token, TokenNumber};
use queueless_core::error::Result;
use queueless_core::port::{TokenRepositoryTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

/// Token issuing transaction.
///
/// `next_token_number` is a write, so calling it first takes the SQLite
/// write lock before anything is read.
pub struct SqliteTokenTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteTokenTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteTokenTransaction<'_> {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl TokenRepositoryTransaction for SqliteTokenTransaction<'_> {
    async fn next_token_number(&mut self, department_id: DepartmentId) -> Result<TokenNumber> {
        sqlx::query_scalar(
            r#"
            INSERT INTO department_counters (department_id, last_token_number)
            VALUES (?, 1)
            ON CONFLICT(department_id)
            DO UPDATE SET last_token_number = last_token_number + 1
            RETURNING last_token_number
            "#,
        )
        .bind(department_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_waiting(
        &mut self,
        department_id: DepartmentId,
        priority_only: bool,
    ) -> Result<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tokens
            WHERE department_id = ? AND status = 'WAITING' AND (? = 0 OR priority = 1)
            "#,
        )
        .bind(department_id)
        .bind(priority_only)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert(&mut self, token: &Token) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tokens (
                id, department_id, token_number, user_id, priority, status,
                created_at, estimated_serve_at, finished_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&token.id)
        .bind(token.department_id)
        .bind(token.token_number)
        .bind(&token.user_id)
        .bind(token.priority)
        .bind(token.status.as_str())
        .bind(token.created_at)
        .bind(token.estimated_serve_at)
        .bind(token.finished_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{create_pool, run_migrations, SqliteCatalogRepository, SqliteTokenRepository};
    use queueless_core::domain::{DepartmentSpec, Token};
    use queueless_core::port::{CatalogRepository, TokenRepository, TransactionalTokenRepository};

    #[tokio::test]
    async fn test_counter_starts_at_one_and_increments() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let catalog = SqliteCatalogRepository::new(pool.clone());
        let center = catalog.upsert_center("Clinic").await.unwrap();
        let dept = catalog
            .upsert_department(center, &DepartmentSpec::new("General", 5, 10))
            .await
            .unwrap();
        let repo = SqliteTokenRepository::new(pool);

        for expected in 1..=3 {
            let mut tx = repo.begin_transaction().await.unwrap();
            assert_eq!(tx.next_token_number(dept).await.unwrap(), expected);
            tx.commit().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_rollback_discards_counter_and_insert() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let catalog = SqliteCatalogRepository::new(pool.clone());
        let center = catalog.upsert_center("Clinic").await.unwrap();
        let dept = catalog
            .upsert_department(center, &DepartmentSpec::new("General", 5, 10))
            .await
            .unwrap();
        let repo = SqliteTokenRepository::new(pool);

        let mut tx = repo.begin_transaction().await.unwrap();
        let number = tx.next_token_number(dept).await.unwrap();
        tx.insert(&Token::new("t-1", number, dept, false, 0, 0))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert!(repo.find_waiting(dept).await.unwrap().is_empty());

        let mut tx = repo.begin_transaction().await.unwrap();
        assert_eq!(tx.next_token_number(dept).await.unwrap(), 1);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_count_waiting_priority_only() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let catalog = SqliteCatalogRepository::new(pool.clone());
        let center = catalog.upsert_center("Clinic").await.unwrap();
        let dept = catalog
            .upsert_department(center, &DepartmentSpec::new("General", 5, 10))
            .await
            .unwrap();
        let repo = SqliteTokenRepository::new(pool);

        let mut tx = repo.begin_transaction().await.unwrap();
        tx.insert(&Token::new("t-1", 1, dept, false, 0, 0)).await.unwrap();
        tx.insert(&Token::new("t-2", 2, dept, true, 0, 0)).await.unwrap();
        assert_eq!(tx.count_waiting(dept, false).await.unwrap(), 2);
        assert_eq!(tx.count_waiting(dept, true).await.unwrap(), 1);
        tx.commit().await.unwrap();
    }
}
