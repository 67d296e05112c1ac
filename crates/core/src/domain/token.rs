// Queue Token Domain Model

use super::catalog::DepartmentId;
use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Token ID (UUID v4)
pub type TokenId = String;

/// Per-department ticket number, starting at 1
pub type TokenNumber = i64;

/// User identifier of the joiner, when known
pub type UserId = String;

/// Token lifecycle. SERVED and MISSED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
    Waiting,
    Served,
    Missed,
}

impl TokenStatus {
    pub const ALL: [TokenStatus; 3] = [TokenStatus::Waiting, TokenStatus::Served, TokenStatus::Missed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Waiting => "WAITING",
            TokenStatus::Served => "SERVED",
            TokenStatus::Missed => "MISSED",
        }
    }
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "WAITING" => Ok(TokenStatus::Waiting),
            "SERVED" => Ok(TokenStatus::Served),
            "MISSED" => Ok(TokenStatus::Missed),
            other => Err(DomainError::ValidationError(format!(
                "unknown token status: {}",
                other
            ))),
        }
    }
}

/// Token Entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub token_number: TokenNumber,
    pub department_id: DepartmentId,
    pub user_id: Option<UserId>,
    pub priority: bool,
    pub status: TokenStatus,

    pub created_at: i64,         // epoch ms
    pub estimated_serve_at: i64, // epoch ms
    pub finished_at: Option<i64>,
}

impl Token {
    /// Create a WAITING token
    ///
    /// # Arguments
    ///
    /// * `id` - Unique token ID (injected, not generated)
    /// * `token_number` - Number issued by the department counter
    /// * `department_id` - Owning department
    /// * `priority` - Whether the token jumps ahead of regular tokens
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `estimated_wait_minutes` - Wait estimate at join time
    pub fn new(
        id: impl Into<String>,
        token_number: TokenNumber,
        department_id: DepartmentId,
        priority: bool,
        created_at: i64,
        estimated_wait_minutes: i64,
    ) -> Self {
        Self {
            id: id.into(),
            token_number,
            department_id,
            user_id: None,
            priority,
            status: TokenStatus::Waiting,
            created_at,
            estimated_serve_at: created_at + estimated_wait_minutes * 60_000,
            finished_at: None,
        }
    }

    pub fn with_user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn is_waiting(&self) -> bool {
        self.status == TokenStatus::Waiting
    }

    /// Transition WAITING -> SERVED
    pub fn serve(&mut self, now_millis: i64) -> Result<()> {
        self.finish(TokenStatus::Served, now_millis)
    }

    /// Transition WAITING -> MISSED
    pub fn miss(&mut self, now_millis: i64) -> Result<()> {
        self.finish(TokenStatus::Missed, now_millis)
    }

    fn finish(&mut self, to: TokenStatus, now_millis: i64) -> Result<()> {
        match self.status {
            TokenStatus::Waiting => {
                self.status = to;
                self.finished_at = Some(now_millis);
                Ok(())
            }
            // A served token has left the live queue entirely
            TokenStatus::Served => Err(DomainError::TokenNotFound(self.token_number)),
            TokenStatus::Missed => Err(DomainError::TokenNotWaiting {
                token_number: self.token_number,
                status: self.status,
            }),
        }
    }
}

/// Ordering key of the live queue: priority tokens first, then FIFO by number
fn queue_key(token: &Token) -> (bool, TokenNumber) {
    (!token.priority, token.token_number)
}

/// Build the ordered snapshot of a department queue from its token set.
///
/// Non-WAITING tokens are dropped. The sort is stable, but the key is total
/// since numbers are unique per department.
pub fn queue_snapshot(tokens: impl IntoIterator<Item = Token>) -> Vec<Token> {
    let mut waiting: Vec<Token> = tokens.into_iter().filter(Token::is_waiting).collect();
    waiting.sort_by_key(queue_key);
    waiting
}

/// Number of WAITING tokens that would be ahead of a new joiner.
///
/// A priority joiner only queues behind earlier priority tokens; a regular
/// joiner queues behind everyone.
pub fn waiting_ahead(waiting_total: i64, waiting_priority: i64, priority: bool) -> i64 {
    if priority {
        waiting_priority
    } else {
        waiting_total
    }
}

/// Estimated wait in minutes for `ahead` tokens
pub fn estimate_wait_minutes(ahead: i64, avg_service_time: i64) -> i64 {
    ahead.max(0) * avg_service_time.max(0)
}

/// Token as shown in a user's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHistoryEntry {
    pub id: TokenId,
    pub token_number: TokenNumber,
    pub center_name: String,
    pub department_name: String,
    /// Estimated serve time (epoch ms)
    pub slot_time: i64,
    pub status: TokenStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(number: TokenNumber, priority: bool) -> Token {
        Token::new(format!("t-{}", number), number, 1, priority, 1_000, 0)
    }

    #[test]
    fn test_snapshot_orders_priority_first_then_fifo() {
        let tokens = vec![
            token(3, false),
            token(1, false),
            token(5, true),
            token(2, false),
            token(4, true),
        ];

        let order: Vec<TokenNumber> = queue_snapshot(tokens).iter().map(|t| t.token_number).collect();
        assert_eq!(order, vec![4, 5, 1, 2, 3]);
    }

    #[test]
    fn test_snapshot_drops_finished_tokens() {
        let mut served = token(1, false);
        served.serve(2_000).unwrap();
        let mut missed = token(2, true);
        missed.miss(2_000).unwrap();

        let snapshot = queue_snapshot(vec![served, missed, token(3, false)]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].token_number, 3);
    }

    #[test]
    fn test_wait_estimate() {
        // 3 waiting, 5 minutes each
        assert_eq!(estimate_wait_minutes(waiting_ahead(3, 0, false), 5), 15);
        // Priority joiner only waits behind the priority tokens
        assert_eq!(estimate_wait_minutes(waiting_ahead(3, 1, true), 5), 5);
        assert_eq!(estimate_wait_minutes(0, 5), 0);
    }

    #[test]
    fn test_estimated_serve_at() {
        let t = Token::new("t", 1, 1, false, 60_000, 15);
        assert_eq!(t.estimated_serve_at, 60_000 + 15 * 60_000);
    }

    #[test]
    fn test_serve_transitions() {
        let mut t = token(7, false);
        t.serve(5_000).unwrap();
        assert_eq!(t.status, TokenStatus::Served);
        assert_eq!(t.finished_at, Some(5_000));

        // Serving twice: token is gone from the live queue
        assert_eq!(t.serve(6_000), Err(DomainError::TokenNotFound(7)));
    }

    #[test]
    fn test_serve_missed_token_fails() {
        let mut t = token(8, false);
        t.miss(5_000).unwrap();
        assert!(matches!(
            t.serve(6_000),
            Err(DomainError::TokenNotWaiting {
                token_number: 8,
                status: TokenStatus::Missed
            })
        ));
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in TokenStatus::ALL {
            assert_eq!(status.as_str().parse::<TokenStatus>().unwrap(), status);
        }
        assert!("QUEUED".parse::<TokenStatus>().is_err());
    }
}
