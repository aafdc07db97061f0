//! Routing definitions for the todo API.
//!
//! Layers, outermost first: panic recovery, CORS, tracing, rate limiting,
//! request logging.

use std::any::Any;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::category;
use super::error::ApiErrorResponse;
use super::handlers::{self, AppState};
use super::middleware::{RateLimitLayer, RequestLogLayer};
use super::todo;

// =============================================================================
// Router Creation
// =============================================================================

/// Creates the application router with all routes and middleware.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::from_repositories(repositories);
/// let router = create_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, router).await?;
/// ```
pub fn create_router(state: AppState) -> Router {
    let rate_limit = RateLimitLayer::new(state.config.rate_limit);

    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health_check))
        .route(
            "/categories",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/categories/{id}",
            patch(category::update_category).delete(category::delete_category),
        )
        .route("/todos", get(todo::list_todos).post(todo::create_todo))
        .route(
            "/todos/{id}",
            get(todo::get_todo)
                .patch(todo::update_todo)
                .delete(todo::delete_todo),
        )
        .with_state(state)
        .layer(RequestLogLayer::new())
        .layer(rate_limit)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
}

// =============================================================================
// Panic Recovery
// =============================================================================

/// Turns a handler panic into a 500 envelope and closes the connection.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = %detail, "handler panicked");

    let mut response = ApiErrorResponse::internal_error("Internal server error").into_response();
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}
