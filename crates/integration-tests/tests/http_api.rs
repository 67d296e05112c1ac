//! REST contract: routes, JSON shapes and status codes

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::Harness;
use http_body_util::BodyExt;
use queueless_api_http::build_router;
use queueless_core::application::CapacityPolicy;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Api {
    harness: Harness,
    router: Router,
}

impl Api {
    async fn new() -> Self {
        Self::with_burst(1000).await
    }

    async fn with_burst(burst: u32) -> Self {
        let harness = Harness::new(CapacityPolicy::Reject).await;
        let router = build_router(harness.app_state(burst));
        Self { harness, router }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, body).await
    }

    async fn sign_up(&self, email: &str, role: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                Some(json!({
                    "fullName": "Test Person",
                    "email": email,
                    "password": "long-enough-password",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["role"], role);
        body["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let api = Api::new().await;
    let (status, body) = api.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_services_lists_catalog() {
    let api = Api::new().await;
    let (status, body) = api.get("/services", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "City Hospital");
    assert_eq!(body[0]["departments"][1]["name"], "Cardiology");
    assert_eq!(body[0]["departments"][1]["maxSlots"], 3);
    assert_eq!(body[0]["departments"][1]["avgServiceTime"], 15);
    assert_eq!(body[1]["departments"][0]["name"], "Accounts");
}

#[tokio::test]
async fn test_join_then_list() {
    let api = Api::new().await;
    let dept = api.harness.department("General Medicine").await;

    let (status, first) = api
        .post("/queue/join", None, Some(json!({ "departmentId": dept })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["tokenNumber"], 1);
    assert_eq!(first["estimatedWaitTime"], 0);
    assert_eq!(first["priority"], false);

    let (_, second) = api
        .post(
            "/queue/join",
            None,
            Some(json!({ "departmentId": dept, "priority": true })),
        )
        .await;
    assert_eq!(second["tokenNumber"], 2);

    let (status, list) = api.get(&format!("/queue/list/{}", dept), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["tokenNumber"], 2);
    assert_eq!(list[0]["status"], "WAITING");
    assert_eq!(list[1]["tokenNumber"], 1);
    assert_eq!(list[1]["createdAt"], "2024-05-01T08:00:00Z");
}

#[tokio::test]
async fn test_join_errors() {
    let api = Api::new().await;
    let cardiology = api.harness.department("Cardiology").await;

    let (status, body) = api
        .post("/queue/join", None, Some(json!({ "departmentId": 999 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "DepartmentNotFound");
    assert_eq!(body["retryable"], false);

    for _ in 0..3 {
        api.post("/queue/join", None, Some(json!({ "departmentId": cardiology })))
            .await;
    }
    let (status, body) = api
        .post("/queue/join", None, Some(json!({ "departmentId": cardiology })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CapacityExceeded");

    let (status, body) = api
        .post("/queue/join", None, Some(json!({ "department": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn test_join_rate_limited() {
    let api = Api::with_burst(2).await;
    let dept = api.harness.department("General Medicine").await;

    for _ in 0..2 {
        let (status, _) = api
            .post("/queue/join", None, Some(json!({ "departmentId": dept })))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = api
        .post("/queue/join", None, Some(json!({ "departmentId": dept })))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RateLimited");
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_list_unknown_department() {
    let api = Api::new().await;
    let (status, body) = api.get("/queue/list/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "DepartmentNotFound");
}

#[tokio::test]
async fn test_malformed_path_and_query_use_the_error_body() {
    let api = Api::new().await;

    let (status, body) = api.get("/queue/list/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["retryable"], false);

    let admin = api.sign_up("admin@queueless.test", "admin").await;
    let (status, body) = api.post("/queue/serve/seven", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");

    let (status, body) = api
        .post("/queue/miss/1?departmentId=cardiology", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn test_serve_requires_admin() {
    let api = Api::new().await;
    let dept = api.harness.department("General Medicine").await;
    api.post("/queue/join", None, Some(json!({ "departmentId": dept })))
        .await;

    let (status, body) = api.post("/queue/serve/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AuthError");

    let (status, _) = api.post("/queue/serve/1", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = api.sign_up("user@queueless.test", "user").await;
    let (status, body) = api.post("/queue/serve/1", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    // Still waiting
    let (_, list) = api.get(&format!("/queue/list/{}", dept), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_serve_and_miss() {
    let api = Api::new().await;
    let general = api.harness.department("General Medicine").await;
    let accounts = api.harness.department("Accounts").await;
    let admin = api.sign_up("admin@queueless.test", "admin").await;

    for dept in [general, accounts, general] {
        api.post("/queue/join", None, Some(json!({ "departmentId": dept })))
            .await;
    }

    // Number 1 waits in both departments
    let (status, body) = api.post("/queue/serve/1", Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AmbiguousToken");

    let (status, body) = api
        .post(&format!("/queue/serve/1?departmentId={}", general), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, _) = api.post("/queue/miss/2", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = api.post("/queue/serve/2", Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "TokenNotWaiting");

    let (status, body) = api.post("/queue/serve/77", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "TokenNotFound");

    let (_, list) = api.get(&format!("/queue/list/{}", general), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_history_follows_the_session() {
    let api = Api::new().await;
    let dept = api.harness.department("Cardiology").await;

    let (status, _) = api.get("/tokens/history", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = api.sign_up("user@queueless.test", "user").await;
    api.post("/queue/join", Some(&user), Some(json!({ "departmentId": dept })))
        .await;
    api.post("/queue/join", Some(&user), Some(json!({ "departmentId": dept })))
        .await;
    // Anonymous joins are not attributed to anyone
    api.post("/queue/join", None, Some(json!({ "departmentId": dept })))
        .await;

    let (status, history) = api.get("/tokens/history", Some(&user)).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["tokenNumber"], 2);
    assert_eq!(history[0]["centerName"], "City Hospital");
    assert_eq!(history[0]["departmentName"], "Cardiology");
    assert_eq!(history[0]["slotTime"], "2024-05-01T08:15:00Z");
    assert_eq!(history[0]["status"], "WAITING");
}

#[tokio::test]
async fn test_feedback() {
    let api = Api::new().await;

    let (status, body) = api
        .post(
            "/feedback",
            None,
            Some(json!({ "name": "Ravi", "email": "ravi@example.com", "rating": 5, "message": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].is_string());

    let (status, body) = api
        .post(
            "/feedback",
            None,
            Some(json!({ "name": "Ravi", "email": "ravi@example.com", "rating": 9 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn test_auth_errors() {
    let api = Api::new().await;
    api.sign_up("user@queueless.test", "user").await;

    let (status, body) = api
        .post(
            "/auth/register",
            None,
            Some(json!({
                "fullName": "Someone Else",
                "email": "user@queueless.test",
                "password": "long-enough-password",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");

    let (status, body) = api
        .post(
            "/auth/login",
            None,
            Some(json!({ "email": "user@queueless.test", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AuthError");

    let (status, body) = api
        .post(
            "/auth/login",
            None,
            Some(json!({ "email": "user@queueless.test", "password": "long-enough-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_analytics_requires_admin() {
    let api = Api::new().await;
    let dept = api.harness.department("Accounts").await;
    api.post("/queue/join", None, Some(json!({ "departmentId": dept })))
        .await;

    let (status, _) = api.get("/admin/analytics", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = api.sign_up("user@queueless.test", "user").await;
    let (status, _) = api.get("/admin/analytics", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = api.sign_up("admin@queueless.test", "admin").await;
    let (status, body) = api.get("/admin/analytics", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["peakHours"], json!([{ "hour": "08:00", "bookings": 1 }]));
    assert_eq!(body["serviceStats"], json!([{ "service": "Accounts", "count": 1 }]));
    assert_eq!(body["tokenStatus"][2], json!({ "status": "MISSED", "count": 0 }));
}
