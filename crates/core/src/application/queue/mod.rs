// Queue Service - join / list / serve / miss orchestration

pub mod join;
pub mod locks;
pub mod transition;

pub use join::{JoinRequest, JoinedToken};
pub use locks::DepartmentLocks;
pub use transition::Transition;

use crate::domain::{
    queue_snapshot, DepartmentId, DomainError, Token, TokenHistoryEntry, TokenNumber,
    TokenStatus,
};
use crate::error::Result;
use crate::port::{
    CatalogRepository, IdProvider, TimeProvider, TokenRepository, TransactionalTokenRepository,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::sweeper::NoShowPolicy;

/// What a join does when the department already has `max_slots` WAITING tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    /// Fail with CapacityExceeded
    #[default]
    Reject,
    /// Accept; the wait estimate keeps growing
    Overflow,
}

/// Queue Service
pub struct QueueService {
    catalog: Arc<dyn CatalogRepository>,
    tx_tokens: Arc<dyn TransactionalTokenRepository>,
    tokens: Arc<dyn TokenRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    locks: DepartmentLocks,
    capacity_policy: CapacityPolicy,
}

impl QueueService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        tx_tokens: Arc<dyn TransactionalTokenRepository>,
        tokens: Arc<dyn TokenRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        capacity_policy: CapacityPolicy,
    ) -> Self {
        Self {
            catalog,
            tx_tokens,
            tokens,
            id_provider,
            time_provider,
            locks: DepartmentLocks::new(),
            capacity_policy,
        }
    }

    pub fn capacity_policy(&self) -> CapacityPolicy {
        self.capacity_policy
    }

    /// Issue a token in a department queue
    pub async fn join(&self, req: JoinRequest) -> Result<JoinedToken> {
        join::execute(
            self.catalog.as_ref(),
            self.tx_tokens.as_ref(),
            &self.locks,
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            self.capacity_policy,
            req,
        )
        .await
    }

    /// Live queue, priority first then FIFO; empty for an idle department
    pub async fn list(&self, department_id: DepartmentId) -> Result<Vec<Token>> {
        self.catalog
            .find_department(department_id)
            .await?
            .ok_or(DomainError::DepartmentNotFound(department_id))?;

        let waiting = self.tokens.find_waiting(department_id).await?;
        Ok(queue_snapshot(waiting))
    }

    /// Serve a WAITING token; the department is resolved from the number
    /// unless a hint is given
    pub async fn serve(
        &self,
        token_number: TokenNumber,
        department_id: Option<DepartmentId>,
    ) -> Result<Token> {
        self.finish(Transition::Serve, token_number, department_id)
            .await
    }

    /// Mark a WAITING token as a no-show
    pub async fn mark_missed(
        &self,
        token_number: TokenNumber,
        department_id: Option<DepartmentId>,
    ) -> Result<Token> {
        self.finish(Transition::Miss, token_number, department_id)
            .await
    }

    async fn finish(
        &self,
        transition: Transition,
        token_number: TokenNumber,
        department_id: Option<DepartmentId>,
    ) -> Result<Token> {
        transition::execute(
            self.catalog.as_ref(),
            self.tokens.as_ref(),
            &self.locks,
            self.time_provider.as_ref(),
            transition,
            token_number,
            department_id,
        )
        .await
    }

    /// Tokens joined by a user, newest first
    pub async fn history(&self, user_id: &str) -> Result<Vec<TokenHistoryEntry>> {
        self.tokens.history_for_user(user_id).await
    }

    /// Mark no-show tokens as MISSED.
    ///
    /// Only the head of a live queue can be a no-show. It counts as called
    /// at the later of its estimated serve time and the moment the token
    /// ahead of it finished; the policy cutoff is applied to that instant.
    /// At most one token per department is marked per sweep. Returns the
    /// number of tokens marked.
    pub async fn sweep_missed(&self, policy: &dyn NoShowPolicy) -> Result<usize> {
        let now = self.time_provider.now_millis();
        let cutoff = policy.cutoff(now);

        let departments: BTreeSet<DepartmentId> = self
            .tokens
            .find_overdue(cutoff)
            .await?
            .into_iter()
            .map(|token| token.department_id)
            .collect();

        let mut marked = 0;
        for department_id in departments {
            let _guard = self.locks.acquire(department_id).await;

            let waiting = self.tokens.find_waiting(department_id).await?;
            let Some(head) = queue_snapshot(waiting).into_iter().next() else {
                continue;
            };

            let called_at = match self.tokens.last_finished_at(department_id).await? {
                Some(finished_at) => head.estimated_serve_at.max(finished_at),
                None => head.estimated_serve_at,
            };
            if called_at >= cutoff {
                debug!(
                    department_id = department_id,
                    token_number = head.token_number,
                    "Queue head still inside its grace window"
                );
                continue;
            }

            if self
                .tokens
                .finish_if_waiting(&head.id, TokenStatus::Missed, now)
                .await?
            {
                marked += 1;
            } else {
                warn!(
                    department_id = department_id,
                    token_number = head.token_number,
                    "Queue head changed before sweep; skipped"
                );
            }
        }

        if marked > 0 {
            info!(marked = marked, cutoff = cutoff, "Marked no-show tokens as MISSED");
        }
        Ok(marked)
    }
}
