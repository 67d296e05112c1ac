// SQLite UserRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use queueless_core::domain::User;
use queueless_core::error::{AppError, Result};
use queueless_core::port::UserRepository;
use sqlx::SqlitePool;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    full_name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let role = self
            .role
            .parse()
            .map_err(|_| AppError::Database(format!("corrupt role in store: {}", self.role)))?;
        Ok(User {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, full_name, email, password_hash, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }
}
