//! Shared handler state

use crate::rate_limiter::RateLimiter;
use queueless_core::application::{
    AnalyticsService, AuthService, CatalogService, FeedbackService, QueueService,
};
use std::sync::Arc;

/// Services injected into every handler (cheap to clone)
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<QueueService>,
    pub catalog: Arc<CatalogService>,
    pub feedback: Arc<FeedbackService>,
    pub auth: Arc<AuthService>,
    pub analytics: Arc<AnalyticsService>,
    /// Guards POST /queue/join
    pub join_limiter: Arc<RateLimiter>,
}
