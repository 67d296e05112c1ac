// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable name, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Domain(e) => e.kind(),
            AppError::Validation(_) => "ValidationError",
            AppError::Unauthorized(_) => "AuthError",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Database(_) => "StoreUnavailable",
            AppError::Config(_) => "ConfigError",
            AppError::Internal(_) => "InternalError",
        }
    }

    /// Infrastructure faults may succeed on retry; domain conflicts never do
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in the infra-sqlite crate
// by converting to AppError::Database(String)
