//! HTTP Route Handlers
//!
//! Thin translation between wire types and application services.

use crate::error::ApiError;
use crate::session::{AdminSession, AuthSession, OptionalSession};
use crate::state::AppState;
use crate::types::{
    AnalyticsResponse, AuthResponse, CenterDto, DepartmentHint, FeedbackResponse,
    HealthResponse, HistoryEntry, JoinBody, JoinResponse, QueueEntry,
};
use axum::extract::{FromRequest, FromRequestParts, State};
use axum::http::StatusCode;
use axum::Json;
use queueless_core::application::JoinRequest;
use queueless_core::domain::{
    DepartmentId, FeedbackRequest, LoginRequest, RegisterRequest, TokenNumber,
};
use tracing::{info, warn};

/// JSON body whose parse failures come back as a 400 error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters, rejected with the same error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string, rejected with the same error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

type ApiResult<T> = Result<T, ApiError>;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: queueless_core::VERSION.to_string(),
    })
}

/// GET /services
pub async fn list_services(State(state): State<AppState>) -> ApiResult<Json<Vec<CenterDto>>> {
    let centers = state.catalog.list_centers().await?;
    Ok(Json(centers.into_iter().map(CenterDto::from).collect()))
}

/// GET /queue/list/:department_id
pub async fn list_queue(
    State(state): State<AppState>,
    ApiPath(department_id): ApiPath<DepartmentId>,
) -> ApiResult<Json<Vec<QueueEntry>>> {
    let tokens = state.queue.list(department_id).await?;
    Ok(Json(tokens.into_iter().map(QueueEntry::from).collect()))
}

/// POST /queue/join
pub async fn join_queue(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    ApiJson(body): ApiJson<JoinBody>,
) -> ApiResult<Json<JoinResponse>> {
    // Rate limiting check (abuse protection)
    if !state.join_limiter.try_acquire() {
        warn!(department_id = body.department_id, "Join rate limited");
        return Err(ApiError::RateLimited);
    }

    let req = JoinRequest {
        department_id: body.department_id,
        priority: body.priority,
        user_id: session.map(|s| s.user_id),
    };
    let joined = state.queue.join(req).await?;
    Ok(Json(JoinResponse::from(joined)))
}

/// POST /queue/serve/:token_number
pub async fn serve_token(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    ApiPath(token_number): ApiPath<TokenNumber>,
    ApiQuery(hint): ApiQuery<DepartmentHint>,
) -> ApiResult<StatusCode> {
    let token = state.queue.serve(token_number, hint.department_id).await?;
    info!(
        admin = %admin.user_id,
        department_id = token.department_id,
        token_number = token_number,
        "Token served"
    );
    Ok(StatusCode::OK)
}

/// POST /queue/miss/:token_number
pub async fn miss_token(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    ApiPath(token_number): ApiPath<TokenNumber>,
    ApiQuery(hint): ApiQuery<DepartmentHint>,
) -> ApiResult<StatusCode> {
    let token = state
        .queue
        .mark_missed(token_number, hint.department_id)
        .await?;
    info!(
        admin = %admin.user_id,
        department_id = token.department_id,
        token_number = token_number,
        "Token marked missed"
    );
    Ok(StatusCode::OK)
}

/// GET /tokens/history
pub async fn token_history(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let history = state.queue.history(&session.user_id).await?;
    Ok(Json(history.into_iter().map(HistoryEntry::from).collect()))
}

/// POST /feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FeedbackRequest>,
) -> ApiResult<Json<FeedbackResponse>> {
    let id = state.feedback.submit(body).await?;
    Ok(Json(FeedbackResponse { id }))
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let grant = state.auth.register(body).await?;
    Ok(Json(AuthResponse::from(grant)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let grant = state.auth.login(body).await?;
    Ok(Json(AuthResponse::from(grant)))
}

/// GET /admin/analytics
pub async fn analytics(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> ApiResult<Json<AnalyticsResponse>> {
    let report = state.analytics.report().await?;
    Ok(Json(AnalyticsResponse::from(report)))
}
