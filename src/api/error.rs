//! API error handling.
//!
//! Every failure leaves the API as an [`ApiErrorResponse`], rendered as the
//! standard envelope with `success: false`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::dto::ApiResponse;
use crate::domain::{CreateCategoryError, CreateTodoError, ReconcileError};
use crate::infrastructure::RepositoryError;
use crate::workflow::PatchError;

/// Message sent for every store failure. Details are logged, never returned.
pub const DATABASE_ERROR_MESSAGE: &str = "Database error";

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Human-readable error message.
    pub error: String,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// Creates a 429 Too Many Requests response.
    #[must_use]
    pub fn too_many_requests(error: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, error)
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.error))).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        tracing::error!(%error, "store operation failed");
        Self::internal_error(DATABASE_ERROR_MESSAGE)
    }
}

impl From<ReconcileError> for ApiErrorResponse {
    fn from(error: ReconcileError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<CreateTodoError> for ApiErrorResponse {
    fn from(error: CreateTodoError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<CreateCategoryError> for ApiErrorResponse {
    fn from(error: CreateCategoryError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<PatchError> for ApiErrorResponse {
    fn from(error: PatchError) -> Self {
        match error {
            PatchError::Validation(error) => error.into(),
            PatchError::NotFound { .. } => Self::not_found(error.to_string()),
            PatchError::Store(error) => error.into(),
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        Self::bad_request("Invalid JSON body")
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(%rejection, "rejected path parameter");
        Self::bad_request("Invalid ID")
    }
}

// =============================================================================
// Tests
// =============================================================================
