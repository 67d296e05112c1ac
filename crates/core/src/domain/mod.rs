// Domain Layer - Pure business logic and entities

pub mod analytics;
pub mod catalog;
pub mod error;
pub mod feedback;
pub mod token;
pub mod user;

// Re-exports
pub use analytics::{AnalyticsReport, HourlyBookings, ServiceCount, StatusCount};
pub use catalog::{Center, CenterId, CenterSpec, Department, DepartmentId, DepartmentSpec};
pub use error::DomainError;
pub use feedback::{Feedback, FeedbackId, FeedbackRequest};
pub use token::{
    estimate_wait_minutes, queue_snapshot, waiting_ahead, Token, TokenHistoryEntry, TokenId,
    TokenNumber, TokenStatus, UserId,
};
pub use user::{AuthGrant, LoginRequest, RegisterRequest, Role, Session, User};
