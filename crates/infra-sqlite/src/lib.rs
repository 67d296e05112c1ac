// Queueless Infrastructure - SQLite Adapter
// Implements: token, catalog, user, feedback and analytics repositories

mod analytics_repository;
mod catalog_repository;
mod connection;
mod error;
mod feedback_repository;
mod migration;
mod token_repository;
mod transaction;
mod user_repository;

pub use analytics_repository::SqliteAnalyticsRepository;
pub use catalog_repository::SqliteCatalogRepository;
pub use connection::create_pool;
pub use feedback_repository::SqliteFeedbackRepository;
pub use migration::run_migrations;
pub use token_repository::SqliteTokenRepository;
pub use transaction::SqliteTokenTransaction;
pub use user_repository::SqliteUserRepository;

// Note: sqlx::Error conversion goes through error::map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
