//! Bearer-token extractors

use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use queueless_core::application::AuthService;
use queueless_core::domain::Session;
use queueless_core::error::AppError;

fn bearer(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed authorization header".to_string()))?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;
    Ok(Some(token))
}

/// Any signed-in caller; 401 without a valid token
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer(parts)?
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;
        Ok(AuthSession(state.auth.authenticate(token)?))
    }
}

/// Caller with the admin role; 403 for other roles
pub struct AdminSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthSession(session) = AuthSession::from_request_parts(parts, state).await?;
        AuthService::require_admin(&session)?;
        Ok(AdminSession(session))
    }
}

/// Session when a token is supplied. A supplied but invalid token is
/// still a 401.
pub struct OptionalSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer(parts)? {
            Some(token) => Ok(OptionalSession(Some(state.auth.authenticate(token)?))),
            None => Ok(OptionalSession(None)),
        }
    }
}
