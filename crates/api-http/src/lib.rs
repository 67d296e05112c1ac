//! Queueless HTTP API
//!
//! REST surface over the queue, catalog, feedback, auth and analytics
//! use cases. JSON bodies are camelCase; errors are `{error, message, retryable}`.

pub mod credentials;
pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod session;
pub mod state;
pub mod types;

pub use credentials::{Argon2PasswordHasher, JwtSessionSigner};
pub use error::ApiError;
pub use rate_limiter::RateLimiter;
pub use server::{build_router, HttpServer, HttpServerConfig};
pub use state::AppState;
