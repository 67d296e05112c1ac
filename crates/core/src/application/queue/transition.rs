// Serve / Miss Use Cases

use super::locks::DepartmentLocks;
use crate::domain::{DepartmentId, DomainError, Token, TokenNumber, TokenStatus};
use crate::error::Result;
use crate::port::{CatalogRepository, TimeProvider, TokenRepository};
use tracing::info;

/// Terminal transition requested by an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Serve,
    Miss,
}

impl Transition {
    fn apply(self, token: &mut Token, now_millis: i64) -> crate::domain::error::Result<()> {
        match self {
            Transition::Serve => token.serve(now_millis),
            Transition::Miss => token.miss(now_millis),
        }
    }
}

/// Find the single WAITING token a caller means by `token_number`.
///
/// Numbers are only unique per department, so without a department hint
/// the number must be WAITING in exactly one department.
async fn resolve(
    tokens: &dyn TokenRepository,
    token_number: TokenNumber,
    department_id: Option<DepartmentId>,
) -> Result<Token> {
    let candidates = tokens
        .find_unserved_by_number(token_number, department_id)
        .await?;

    let mut waiting: Vec<Token> = candidates.iter().filter(|t| t.is_waiting()).cloned().collect();

    match waiting.len() {
        1 => Ok(waiting.remove(0)),
        0 if !candidates.is_empty() => Err(DomainError::TokenNotWaiting {
            token_number,
            status: TokenStatus::Missed,
        }
        .into()),
        0 => Err(DomainError::TokenNotFound(token_number).into()),
        n => Err(DomainError::AmbiguousToken {
            token_number,
            departments: n,
        }
        .into()),
    }
}

/// Execute serve/miss use case
///
/// Resolution happens outside the lock; the transition itself is a
/// conditional update under the department lock, so a token that changed in
/// between is re-read and reported with the right error kind.
pub async fn execute(
    catalog: &dyn CatalogRepository,
    tokens: &dyn TokenRepository,
    locks: &DepartmentLocks,
    time_provider: &dyn TimeProvider,
    transition: Transition,
    token_number: TokenNumber,
    department_id: Option<DepartmentId>,
) -> Result<Token> {
    if let Some(department_id) = department_id {
        catalog
            .find_department(department_id)
            .await?
            .ok_or(DomainError::DepartmentNotFound(department_id))?;
    }

    let mut token = resolve(tokens, token_number, department_id).await?;

    let _guard = locks.acquire(token.department_id).await;
    let now = time_provider.now_millis();
    transition.apply(&mut token, now)?;

    let finished = tokens
        .finish_if_waiting(&token.id, token.status, now)
        .await?;

    if !finished {
        // Lost a race with another serve/miss; report what it became
        let current = tokens
            .find_by_id(&token.id)
            .await?
            .ok_or(DomainError::TokenNotFound(token_number))?;
        return Err(match current.status {
            TokenStatus::Missed => DomainError::TokenNotWaiting {
                token_number,
                status: current.status,
            },
            _ => DomainError::TokenNotFound(token_number),
        }
        .into());
    }

    info!(
        department_id = token.department_id,
        token_number = token.token_number,
        status = %token.status,
        "Token finished"
    );

    Ok(token)
}
