// Join Use Case

use super::locks::DepartmentLocks;
use super::CapacityPolicy;
use crate::domain::{
    estimate_wait_minutes, waiting_ahead, DepartmentId, DomainError, Token, UserId,
};
use crate::error::Result;
use crate::port::{CatalogRepository, IdProvider, TimeProvider, TransactionalTokenRepository};
use tracing::{debug, info};

/// Join request
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub department_id: DepartmentId,
    pub priority: bool,
    /// Set when the caller is authenticated, so the token shows up in history
    pub user_id: Option<UserId>,
}

impl JoinRequest {
    pub fn new(department_id: DepartmentId) -> Self {
        Self {
            department_id,
            priority: false,
            user_id: None,
        }
    }

    pub fn priority(mut self) -> Self {
        self.priority = true;
        self
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Issued token plus the wait estimate computed at join time
#[derive(Debug, Clone)]
pub struct JoinedToken {
    pub token: Token,
    pub estimated_wait_minutes: i64,
}

/// Execute join use case
///
/// The department lock serializes joins per department; the transaction makes
/// the counter bump and the insert commit together. The counter bump is the
/// first statement so the store takes its write lock before any read.
///
/// # Arguments
///
/// * `catalog` - Department lookup
/// * `token_repo` - Transactional token repository
/// * `locks` - Per-department locks
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `policy` - What to do when the queue is at max_slots
/// * `req` - Join request
pub async fn execute(
    catalog: &dyn CatalogRepository,
    token_repo: &dyn TransactionalTokenRepository,
    locks: &DepartmentLocks,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    policy: CapacityPolicy,
    req: JoinRequest,
) -> Result<JoinedToken> {
    let department = catalog
        .find_department(req.department_id)
        .await?
        .ok_or(DomainError::DepartmentNotFound(req.department_id))?;

    let _guard = locks.acquire(department.id).await;
    let mut tx = token_repo.begin_transaction().await?;

    let token_number = tx.next_token_number(department.id).await?;
    let waiting_total = tx.count_waiting(department.id, false).await?;

    if policy == CapacityPolicy::Reject && waiting_total >= department.max_slots {
        tx.rollback().await?;
        debug!(
            department_id = department.id,
            waiting = waiting_total,
            max_slots = department.max_slots,
            "Join rejected: department at capacity"
        );
        return Err(DomainError::CapacityExceeded {
            department_id: department.id,
            max_slots: department.max_slots,
        }
        .into());
    }

    let waiting_priority = if req.priority {
        tx.count_waiting(department.id, true).await?
    } else {
        0
    };
    let ahead = waiting_ahead(waiting_total, waiting_priority, req.priority);
    let estimated_wait_minutes = estimate_wait_minutes(ahead, department.avg_service_time);

    let token = Token::new(
        id_provider.generate_id(),
        token_number,
        department.id,
        req.priority,
        time_provider.now_millis(),
        estimated_wait_minutes,
    )
    .with_user(req.user_id);

    tx.insert(&token).await?;
    tx.commit().await?;

    info!(
        department_id = department.id,
        token_number = token.token_number,
        priority = token.priority,
        ahead = ahead,
        estimated_wait_minutes = estimated_wait_minutes,
        "Token issued"
    );

    Ok(JoinedToken {
        token,
        estimated_wait_minutes,
    })
}
