// Token Repository Port (Interface)

use crate::domain::{DepartmentId, Token, TokenHistoryEntry, TokenId, TokenNumber, TokenStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for token reads and single-row transitions.
///
/// Issuing new tokens goes through `TransactionalTokenRepository` so that
/// the counter bump and the insert commit together.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Find token by ID
    async fn find_by_id(&self, id: &TokenId) -> Result<Option<Token>>;

    /// All WAITING tokens of a department, from one consistent read
    async fn find_waiting(&self, department_id: DepartmentId) -> Result<Vec<Token>>;

    /// Tokens with this number that are still WAITING or MISSED,
    /// optionally restricted to one department
    async fn find_unserved_by_number(
        &self,
        token_number: TokenNumber,
        department_id: Option<DepartmentId>,
    ) -> Result<Vec<Token>>;

    /// Move a WAITING token to a terminal status.
    ///
    /// Returns false when the token was no longer WAITING (nothing changed).
    async fn finish_if_waiting(
        &self,
        id: &TokenId,
        status: TokenStatus,
        finished_at: i64,
    ) -> Result<bool>;

    /// WAITING tokens whose estimated serve time is before `cutoff`
    async fn find_overdue(&self, cutoff: i64) -> Result<Vec<Token>>;

    /// Latest `finished_at` (served or missed) in a department
    async fn last_finished_at(&self, department_id: DepartmentId) -> Result<Option<i64>>;

    /// Tokens joined by a user, newest first
    async fn history_for_user(&self, user_id: &str) -> Result<Vec<TokenHistoryEntry>>;
}
