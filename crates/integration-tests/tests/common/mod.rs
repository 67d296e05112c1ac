//! Shared wiring: every service over one in-memory SQLite database
#![allow(dead_code)]

use std::sync::Arc;

use queueless_api_http::{AppState, Argon2PasswordHasher, JwtSessionSigner, RateLimiter};
use queueless_core::application::{
    AnalyticsService, AuthService, CapacityPolicy, CatalogService, FeedbackService, QueueService,
};
use queueless_core::domain::{CenterSpec, DepartmentId, DepartmentSpec};
use queueless_core::port::id_provider::{SequentialIdProvider, UuidProvider};
use queueless_core::port::time_provider::ManualTimeProvider;
use queueless_infra_sqlite::{
    create_pool, run_migrations, SqliteAnalyticsRepository, SqliteCatalogRepository,
    SqliteFeedbackRepository, SqliteTokenRepository, SqliteUserRepository,
};
use sqlx::SqlitePool;

/// 2024-05-01T08:00:00Z
pub const START_MILLIS: i64 = 1_714_550_400_000;

pub const JWT_SECRET: &[u8] = b"integration-test-secret";

pub struct Harness {
    pub pool: SqlitePool,
    pub clock: Arc<ManualTimeProvider>,
    pub queue: Arc<QueueService>,
    pub catalog: Arc<CatalogService>,
    pub feedback: Arc<FeedbackService>,
    pub auth: Arc<AuthService>,
    pub analytics: Arc<AnalyticsService>,
}

pub fn test_catalog() -> Vec<CenterSpec> {
    vec![
        CenterSpec {
            name: "City Hospital".to_string(),
            departments: vec![
                DepartmentSpec::new("General Medicine", 50, 5),
                DepartmentSpec::new("Cardiology", 3, 15),
            ],
        },
        CenterSpec {
            name: "Central Bank".to_string(),
            departments: vec![DepartmentSpec::new("Accounts", 10, 8)],
        },
    ]
}

impl Harness {
    pub async fn new(policy: CapacityPolicy) -> Self {
        Self::with_pool("sqlite::memory:", policy).await
    }

    pub async fn with_pool(url: &str, policy: CapacityPolicy) -> Self {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let clock = Arc::new(ManualTimeProvider::new(START_MILLIS));
        let tokens = Arc::new(SqliteTokenRepository::new(pool.clone()));
        let catalog_repo = Arc::new(SqliteCatalogRepository::new(pool.clone()));

        let catalog = Arc::new(CatalogService::new(catalog_repo.clone()));
        catalog.provision(&test_catalog()).await.unwrap();

        let queue = Arc::new(QueueService::new(
            catalog_repo,
            tokens.clone(),
            tokens,
            // Token ids must stay unique across harnesses sharing a file
            Arc::new(UuidProvider),
            clock.clone(),
            policy,
        ));
        let feedback = Arc::new(FeedbackService::new(
            Arc::new(SqliteFeedbackRepository::new(pool.clone())),
            Arc::new(SequentialIdProvider::new("feedback")),
            clock.clone(),
        ));
        let auth = Arc::new(AuthService::new(
            Arc::new(SqliteUserRepository::new(pool.clone())),
            Arc::new(Argon2PasswordHasher::new()),
            Arc::new(JwtSessionSigner::new(JWT_SECRET, 3600)),
            Arc::new(SequentialIdProvider::new("user")),
            clock.clone(),
        ));
        let analytics = Arc::new(AnalyticsService::new(Arc::new(
            SqliteAnalyticsRepository::new(pool.clone()),
        )));

        Self {
            pool,
            clock,
            queue,
            catalog,
            feedback,
            auth,
            analytics,
        }
    }

    /// Department id by name
    pub async fn department(&self, name: &str) -> DepartmentId {
        self.catalog
            .list_centers()
            .await
            .unwrap()
            .into_iter()
            .flat_map(|c| c.departments)
            .find(|d| d.name == name)
            .map(|d| d.id)
            .unwrap_or_else(|| panic!("department {} not provisioned", name))
    }

    pub fn app_state(&self, join_burst: u32) -> AppState {
        AppState {
            queue: self.queue.clone(),
            catalog: self.catalog.clone(),
            feedback: self.feedback.clone(),
            auth: self.auth.clone(),
            analytics: self.analytics.clone(),
            join_limiter: Arc::new(RateLimiter::new(join_burst, 0)),
        }
    }
}
