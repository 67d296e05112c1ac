// Transaction port for atomic multi-step operations

use crate::domain::{DepartmentId, Token, TokenNumber};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional token operations
#[async_trait]
pub trait TransactionalTokenRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn TokenRepositoryTransaction>>;
}

/// Token issuing operations within a transaction.
///
/// Dropping the transaction without commit discards every step.
#[async_trait]
pub trait TokenRepositoryTransaction: Transaction {
    /// Bump and return the department counter (first number is 1)
    async fn next_token_number(&mut self, department_id: DepartmentId) -> Result<TokenNumber>;

    /// Count WAITING tokens of a department (priority ones only if asked)
    async fn count_waiting(&mut self, department_id: DepartmentId, priority_only: bool)
        -> Result<i64>;

    /// Insert token (within transaction)
    async fn insert(&mut self, token: &Token) -> Result<()>;
}
