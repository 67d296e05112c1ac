//! HTTP Error Mapping
//!
//! Maps application errors to status codes and the JSON error body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use queueless_core::domain::DomainError;
use queueless_core::error::AppError;
use serde::Serialize;
use tracing::error;

/// Error returned by every handler
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    /// Join rate limit exhausted
    RateLimited,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::App(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::App(AppError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::App(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::App(AppError::Validation(rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::App(err) => match err {
                AppError::Domain(domain) => match domain {
                    DomainError::DepartmentNotFound(_) | DomainError::TokenNotFound(_) => {
                        StatusCode::NOT_FOUND
                    }
                    DomainError::TokenNotWaiting { .. }
                    | DomainError::CapacityExceeded { .. }
                    | DomainError::AmbiguousToken { .. } => StatusCode::CONFLICT,
                    DomainError::ValidationError(_) => StatusCode::BAD_REQUEST,
                },
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Conflict(_) => StatusCode::CONFLICT,
                AppError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
                AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::RateLimited => ErrorBody {
                error: "RateLimited",
                message: "Rate limit exceeded. Please slow down.".to_string(),
                retryable: true,
            },
            ApiError::App(err) => ErrorBody {
                error: err.kind(),
                message: err.to_string(),
                retryable: err.is_retryable(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = ?self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queueless_core::domain::TokenStatus;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().status()
    }

    #[test]
    fn test_domain_status_codes() {
        assert_eq!(status_of(DomainError::DepartmentNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::TokenNotFound(7)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(DomainError::CapacityExceeded {
                department_id: 1,
                max_slots: 3
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::TokenNotWaiting {
                token_number: 2,
                status: TokenStatus::Missed
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::AmbiguousToken {
                token_number: 1,
                departments: 2
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_app_status_codes() {
        assert_eq!(status_of(AppError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AppError::Database("locked".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_error_body() {
        let body = ApiError::from(DomainError::TokenNotFound(9)).body();
        assert_eq!(body.error, "TokenNotFound");
        assert!(body.message.contains('9'));
        assert!(!body.retryable);

        let body = ApiError::from(AppError::Database("busy".into())).body();
        assert_eq!(body.error, "StoreUnavailable");
        assert!(body.retryable);
    }
}
