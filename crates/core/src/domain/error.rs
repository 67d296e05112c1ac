// Domain Error Types

use super::catalog::DepartmentId;
use super::token::{TokenNumber, TokenStatus};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Department not found: {0}")]
    DepartmentNotFound(DepartmentId),

    #[error("Token not found: {0}")]
    TokenNotFound(TokenNumber),

    #[error("Token {token_number} is not waiting (status {status})")]
    TokenNotWaiting {
        token_number: TokenNumber,
        status: TokenStatus,
    },

    #[error("Department {department_id} is at capacity ({max_slots} waiting)")]
    CapacityExceeded {
        department_id: DepartmentId,
        max_slots: i64,
    },

    #[error("Token {token_number} is waiting in {departments} departments; pass a department id")]
    AmbiguousToken {
        token_number: TokenNumber,
        departments: usize,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Stable machine-readable name, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::DepartmentNotFound(_) => "DepartmentNotFound",
            DomainError::TokenNotFound(_) => "TokenNotFound",
            DomainError::TokenNotWaiting { .. } => "TokenNotWaiting",
            DomainError::CapacityExceeded { .. } => "CapacityExceeded",
            DomainError::AmbiguousToken { .. } => "AmbiguousToken",
            DomainError::ValidationError(_) => "ValidationError",
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
