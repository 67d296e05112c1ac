// Port Layer - Interfaces for external dependencies

pub mod analytics_repository;
pub mod catalog_repository;
pub mod credentials;
pub mod feedback_repository;
pub mod id_provider; // For deterministic testing
pub mod time_provider;
pub mod token_repository;
pub mod transaction;
pub mod user_repository;

// Re-exports
pub use analytics_repository::AnalyticsRepository;
pub use catalog_repository::CatalogRepository;
pub use credentials::{PasswordHasher, SessionSigner};
pub use feedback_repository::FeedbackRepository;
pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;
pub use token_repository::TokenRepository;
pub use transaction::{TokenRepositoryTransaction, Transaction, TransactionalTokenRepository};
pub use user_repository::UserRepository;
