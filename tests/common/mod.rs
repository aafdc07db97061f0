//! Common test helpers for integration tests.
//!
//! Builds routers over in-memory repositories and drives them with
//! `tower::ServiceExt::oneshot`.
//!
//! # Note
//!
//! `#![allow(dead_code)]` is needed because each integration test file is
//! compiled as its own crate and uses only part of these helpers.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use todo_api::api::middleware::RateLimitConfig;
use todo_api::api::{AppConfig, AppState, create_router};
use todo_api::infrastructure::Repositories;

// =============================================================================
// AppState / Router Creation Helpers
// =============================================================================

/// Creates a test `AppState` with in-memory repositories.
pub fn create_test_app_state() -> AppState {
    AppState::from_repositories(Repositories::in_memory())
}

/// Creates a test `AppState` with a custom rate limit.
pub fn create_test_app_state_with_rate_limit(max_requests: u32) -> AppState {
    let config = AppConfig {
        rate_limit: RateLimitConfig {
            max_requests,
            ..RateLimitConfig::default()
        },
    };
    AppState::with_config(Repositories::in_memory(), config)
}

pub fn create_test_router() -> Router {
    create_router(create_test_app_state())
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Sends one request through a clone of `router`.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn send_json(router: &Router, method: Method, uri: &str, body: &Value) -> Response {
    send(router, method, uri, Some(&body.to_string())).await
}

/// Reads the response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Sends a request and returns the status with the decoded envelope.
pub async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let response = match body {
        Some(body) => send_json(router, method, uri, body).await,
        None => send(router, method, uri, None).await,
    };
    let status = response.status();
    (status, body_json(response).await)
}

// =============================================================================
// Fixtures
// =============================================================================

/// An RFC 3339 timestamp `days` days from now.
pub fn days_from_now(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339()
}

/// Creates a category and returns its id.
pub async fn seed_category(router: &Router, name: &str) -> i64 {
    let (status, body) = call(
        router,
        Method::POST,
        "/categories",
        Some(&json!({ "name": name, "description": "seeded" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed category failed: {body}");
    body["data"]["id"].as_i64().expect("category id")
}

/// Creates a todo in `category_id` and returns its id.
pub async fn seed_todo(router: &Router, title: &str, category_id: i64) -> i64 {
    let (status, body) = call(
        router,
        Method::POST,
        "/todos",
        Some(&json!({
            "title": title,
            "content": "B",
            "priority": 2,
            "due_date": days_from_now(1),
            "category_id": category_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed todo failed: {body}");
    body["data"]["id"].as_i64().expect("todo id")
}
