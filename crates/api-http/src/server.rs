//! HTTP Server
//!
//! Builds the axum router and serves it until the shutdown future resolves.

use crate::handler;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use queueless_core::error::AppError;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// All routes, with permissive CORS for the browser client and request tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/services", get(handler::list_services))
        .route("/queue/list/:department_id", get(handler::list_queue))
        .route("/queue/join", post(handler::join_queue))
        .route("/queue/serve/:token_number", post(handler::serve_token))
        .route("/queue/miss/:token_number", post(handler::miss_token))
        .route("/tokens/history", get(handler::token_history))
        .route("/feedback", post(handler::submit_feedback))
        .route("/auth/register", post(handler::register))
        .route("/auth/login", post(handler::login))
        .route("/admin/analytics", get(handler::analytics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind and serve until `shutdown` resolves; in-flight requests finish
    pub async fn serve<F>(self, shutdown: F) -> Result<(), AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            "HTTP server listening"
        );

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::Internal(format!("HTTP server failed: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
