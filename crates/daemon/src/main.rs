//! Queueless - Main Entry Point
//! HTTP API + missed-token sweeper over a SQLite store

mod config;
mod telemetry;

use anyhow::{Context, Result};
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use config::Settings;
use queueless_api_http::{
    AppState, Argon2PasswordHasher, HttpServer, HttpServerConfig, JwtSessionSigner, RateLimiter,
};
use queueless_core::application::{
    shutdown_channel, AnalyticsService, AuthService, CatalogService, FeedbackService,
    GraceWindowPolicy, MissedTokenSweeper, QueueService,
};
use queueless_core::port::id_provider::UuidProvider;
use queueless_core::port::time_provider::SystemTimeProvider;
use queueless_infra_sqlite::{
    create_pool, run_migrations, SqliteAnalyticsRepository, SqliteCatalogRepository,
    SqliteFeedbackRepository, SqliteTokenRepository, SqliteUserRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration, then logging
    let settings = Settings::load()?;
    let telemetry = telemetry::init(&settings.log)?;

    info!("Queueless v{} starting...", VERSION);

    // 2. Initialize database
    let db_url = settings.database_url();
    if let Some(path) = db_url.strip_prefix("sqlite://") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create {}", parent.display()))?;
            }
        }
    }
    info!(db_url = %db_url, "Initializing database...");

    let pool = create_pool(&db_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let token_repo = Arc::new(SqliteTokenRepository::new(pool.clone()));
    let catalog_repo = Arc::new(SqliteCatalogRepository::new(pool.clone()));

    let jwt_secret = match &settings.auth.jwt_secret {
        Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
        _ => {
            warn!("auth.jwt_secret not set; using an ephemeral secret (sessions end on restart)");
            let mut secret = vec![0u8; 32];
            rand::thread_rng().fill_bytes(&mut secret);
            secret
        }
    };

    let catalog = Arc::new(CatalogService::new(catalog_repo.clone()));
    let queue = Arc::new(QueueService::new(
        catalog_repo,
        token_repo.clone(),
        token_repo,
        id_provider.clone(),
        time_provider.clone(),
        settings.queue.capacity_policy,
    ));
    let feedback = Arc::new(FeedbackService::new(
        Arc::new(SqliteFeedbackRepository::new(pool.clone())),
        id_provider.clone(),
        time_provider.clone(),
    ));
    let auth = Arc::new(AuthService::new(
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(JwtSessionSigner::new(&jwt_secret, settings.auth.token_ttl_secs)),
        id_provider,
        time_provider,
    ));
    let analytics = Arc::new(AnalyticsService::new(Arc::new(
        SqliteAnalyticsRepository::new(pool.clone()),
    )));

    // 4. Provision the configured catalog
    let provisioned = catalog
        .provision(&settings.catalog.centers)
        .await
        .map_err(|e| anyhow::anyhow!("Catalog provisioning failed: {}", e))?;
    info!(departments = provisioned, "Service catalog ready");

    // 5. Start missed-token sweeper
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let sweeper = MissedTokenSweeper::new(
        queue.clone(),
        Arc::new(GraceWindowPolicy::new(settings.queue.no_show_grace_minutes)),
        Duration::from_secs(settings.queue.sweep_interval_secs.max(1)),
    );
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown_rx.clone()));

    // 6. Start HTTP server
    let state = AppState {
        queue,
        catalog,
        feedback,
        auth,
        analytics,
        join_limiter: Arc::new(RateLimiter::new(
            settings.rate_limit.burst,
            settings.rate_limit.per_second,
        )),
    };
    let server = HttpServer::new(
        HttpServerConfig {
            host: settings.server.host.clone(),
            port: settings.server.port,
        },
        state,
    );

    let mut server_shutdown = shutdown_rx;
    let mut server_handle =
        tokio::spawn(async move { server.serve(async move { server_shutdown.wait().await }).await });

    info!("System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal (or an early server exit)
    let server_result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            info!("Shutdown signal received. Exiting gracefully...");
            shutdown_tx.shutdown();
            tokio::time::timeout(Duration::from_secs(10), &mut server_handle).await.ok()
        }
        result = &mut server_handle => {
            warn!("HTTP server stopped unexpectedly");
            shutdown_tx.shutdown();
            Some(result)
        }
    };

    // 8. Graceful shutdown
    match server_result {
        Some(Ok(Err(e))) => warn!(error = ?e, "HTTP server exited with error"),
        Some(Err(e)) => warn!(error = ?e, "HTTP server task panicked"),
        None => warn!("HTTP server did not stop within 10s"),
        Some(Ok(Ok(()))) => {}
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), sweeper_handle).await;

    pool.close().await;
    info!("Shutdown complete.");
    telemetry.shutdown();

    Ok(())
}
