//! Registration, login, feedback and analytics over the real adapters

mod common;

use common::{Harness, START_MILLIS};
use queueless_core::application::{CapacityPolicy, JoinRequest};
use queueless_core::domain::{FeedbackRequest, LoginRequest, RegisterRequest, Role, TokenStatus};
use queueless_core::error::AppError;
use queueless_core::port::FeedbackRepository;
use queueless_infra_sqlite::SqliteFeedbackRepository;

fn register(email: &str, role: Role) -> RegisterRequest {
    RegisterRequest {
        full_name: "Lakshmi Iyer".to_string(),
        email: email.to_string(),
        password: "hunter2hunter2".to_string(),
        role,
    }
}

fn feedback(email: &str, rating: i32) -> FeedbackRequest {
    FeedbackRequest {
        name: "Lakshmi".to_string(),
        email: email.to_string(),
        rating,
        message: "Quick service".to_string(),
    }
}

#[tokio::test]
async fn test_register_then_login_round_trips_role() {
    let h = Harness::new(CapacityPolicy::Reject).await;

    let grant = h
        .auth
        .register(register("admin@queueless.test", Role::Admin))
        .await
        .unwrap();
    assert_eq!(grant.role, Role::Admin);
    assert!(h.auth.authenticate(&grant.token).unwrap().is_admin());

    let login = h
        .auth
        .login(LoginRequest {
            email: "ADMIN@queueless.test".to_string(),
            password: "hunter2hunter2".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(login.role, Role::Admin);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let h = Harness::new(CapacityPolicy::Reject).await;
    h.auth
        .register(register("user@queueless.test", Role::User))
        .await
        .unwrap();

    let err = h
        .auth
        .login(LoginRequest {
            email: "user@queueless.test".to_string(),
            password: "not the password".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let h = Harness::new(CapacityPolicy::Reject).await;
    h.auth
        .register(register("user@queueless.test", Role::User))
        .await
        .unwrap();

    let err = h
        .auth
        .register(register("user@queueless.test", Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_feedback_validation() {
    let h = Harness::new(CapacityPolicy::Reject).await;

    let id = h.feedback.submit(feedback("ok@example.com", 5)).await.unwrap();
    assert!(!id.is_empty());

    for bad in [feedback("not-an-email", 4), feedback("ok@example.com", 0), feedback("ok@example.com", 6)] {
        let err = h.feedback.submit(bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{:?}", err);
    }

    let stored = SqliteFeedbackRepository::new(h.pool.clone()).count().await.unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn test_analytics_report() {
    let h = Harness::new(CapacityPolicy::Reject).await;
    let general = h.department("General Medicine").await;
    let accounts = h.department("Accounts").await;

    // 08:00 UTC
    h.queue.join(JoinRequest::new(general)).await.unwrap();
    h.queue.join(JoinRequest::new(general)).await.unwrap();
    // 10:30 UTC
    h.clock.set_millis(START_MILLIS + 150 * 60_000);
    h.queue.join(JoinRequest::new(accounts)).await.unwrap();
    h.queue.serve(1, Some(general)).await.unwrap();

    let report = h.analytics.report().await.unwrap();

    let hours: Vec<(u32, i64)> = report.peak_hours.iter().map(|p| (p.hour, p.bookings)).collect();
    assert_eq!(hours, vec![(8, 2), (10, 1)]);

    assert_eq!(report.service_stats[0].service, "General Medicine");
    assert_eq!(report.service_stats[0].count, 2);
    assert_eq!(report.service_stats[1].service, "Accounts");

    let statuses: Vec<(TokenStatus, i64)> =
        report.token_status.iter().map(|s| (s.status, s.count)).collect();
    assert_eq!(
        statuses,
        vec![
            (TokenStatus::Waiting, 2),
            (TokenStatus::Served, 1),
            (TokenStatus::Missed, 0),
        ]
    );
}
