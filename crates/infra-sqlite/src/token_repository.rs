// SQLite TokenRepository Implementation

use crate::error::map_sqlx_error;
use crate::SqliteTokenTransaction;
use async_trait::async_trait;
use queueless_core::domain::{
    DepartmentId, Token, TokenHistoryEntry, TokenId, TokenNumber, TokenStatus,
};
use queueless_core::error::{AppError, Result};
use queueless_core::port::{
    TokenRepository, TokenRepositoryTransaction, TransactionalTokenRepository,
};
use sqlx::SqlitePool;

const TOKEN_COLUMNS: &str = "id, department_id, token_number, user_id, priority, status, \
                             created_at, estimated_serve_at, finished_at";

pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn find_by_id(&self, id: &TokenId) -> Result<Option<Token>> {
        let row = sqlx::query_as::<_, TokenRow>(&format!(
            "SELECT {} FROM tokens WHERE id = ?",
            TOKEN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(TokenRow::into_token).transpose()
    }

    async fn find_waiting(&self, department_id: DepartmentId) -> Result<Vec<Token>> {
        let rows = sqlx::query_as::<_, TokenRow>(&format!(
            "SELECT {} FROM tokens WHERE department_id = ? AND status = 'WAITING' \
             ORDER BY priority DESC, token_number ASC",
            TOKEN_COLUMNS
        ))
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TokenRow::into_token).collect()
    }

    async fn find_unserved_by_number(
        &self,
        token_number: TokenNumber,
        department_id: Option<DepartmentId>,
    ) -> Result<Vec<Token>> {
        let rows = sqlx::query_as::<_, TokenRow>(&format!(
            "SELECT {} FROM tokens \
             WHERE token_number = ? AND status IN ('WAITING', 'MISSED') \
               AND (? IS NULL OR department_id = ?) \
             ORDER BY department_id ASC",
            TOKEN_COLUMNS
        ))
        .bind(token_number)
        .bind(department_id)
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TokenRow::into_token).collect()
    }

    async fn finish_if_waiting(
        &self,
        id: &TokenId,
        status: TokenStatus,
        finished_at: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tokens
            SET status = ?, finished_at = ?
            WHERE id = ? AND status = 'WAITING'
            "#,
        )
        .bind(status.as_str())
        .bind(finished_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_overdue(&self, cutoff: i64) -> Result<Vec<Token>> {
        let rows = sqlx::query_as::<_, TokenRow>(&format!(
            "SELECT {} FROM tokens WHERE status = 'WAITING' AND estimated_serve_at < ? \
             ORDER BY department_id ASC, token_number ASC",
            TOKEN_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TokenRow::into_token).collect()
    }

    async fn last_finished_at(&self, department_id: DepartmentId) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(finished_at) FROM tokens WHERE department_id = ?")
            .bind(department_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn history_for_user(&self, user_id: &str) -> Result<Vec<TokenHistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT t.id, t.token_number, c.name AS center_name, d.name AS department_name,
                   t.estimated_serve_at, t.status
            FROM tokens t
            JOIN departments d ON d.id = t.department_id
            JOIN centers c ON c.id = d.center_id
            WHERE t.user_id = ?
            ORDER BY t.created_at DESC, t.token_number DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(TokenHistoryEntry {
                    id: row.id,
                    token_number: row.token_number,
                    center_name: row.center_name,
                    department_name: row.department_name,
                    slot_time: row.estimated_serve_at,
                    status: parse_status(&row.status)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TransactionalTokenRepository for SqliteTokenRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn TokenRepositoryTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteTokenTransaction::new(tx)))
    }
}

fn parse_status(raw: &str) -> Result<TokenStatus> {
    raw.parse()
        .map_err(|_| AppError::Database(format!("corrupt token status in store: {}", raw)))
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    id: String,
    department_id: i64,
    token_number: i64,
    user_id: Option<String>,
    priority: bool,
    status: String,
    created_at: i64,
    estimated_serve_at: i64,
    finished_at: Option<i64>,
}

impl TokenRow {
    fn into_token(self) -> Result<Token> {
        Ok(Token {
            status: parse_status(&self.status)?,
            id: self.id,
            token_number: self.token_number,
            department_id: self.department_id,
            user_id: self.user_id,
            priority: self.priority,
            created_at: self.created_at,
            estimated_serve_at: self.estimated_serve_at,
            finished_at: self.finished_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: String,
    token_number: i64,
    center_name: String,
    department_name: String,
    estimated_serve_at: i64,
    status: String,
}
