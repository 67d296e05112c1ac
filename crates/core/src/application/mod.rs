// Application Layer - Use Cases and Business Logic

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod feedback;
pub mod queue;
pub mod sweeper;

// Re-exports
pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use catalog::CatalogService;
pub use feedback::FeedbackService;
pub use queue::{CapacityPolicy, JoinRequest, JoinedToken, QueueService};
pub use sweeper::{
    shutdown_channel, GraceWindowPolicy, MissedTokenSweeper, NoShowPolicy, ShutdownSender,
    ShutdownToken,
};
