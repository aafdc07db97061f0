//! Shared application state and service-level handlers.

use std::sync::Arc;

use axum::Json;

use super::dto::{ApiResponse, HealthResponse};
use super::middleware::RateLimitConfig;
use crate::infrastructure::{
    CategoryRepository, ConfigurationError, Repositories, TodoRepository,
};

// =============================================================================
// Application Configuration
// =============================================================================

/// Application-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Request quota shared by all clients.
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Reads the application configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` when a variable is malformed.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Ok(Self {
            rate_limit: RateLimitConfig::from_env()?,
        })
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Holds trait objects so the backend chosen by `RepositoryFactory` can be
/// swapped at runtime.
#[derive(Clone)]
pub struct AppState {
    /// Todo repository.
    pub todo_repository: Arc<dyn TodoRepository>,
    /// Category repository.
    pub category_repository: Arc<dyn CategoryRepository>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Creates a new `AppState` from initialized repositories.
    #[must_use]
    pub fn from_repositories(repositories: Repositories) -> Self {
        Self::with_config(repositories, AppConfig::default())
    }

    /// Creates a new `AppState` from repositories and custom configuration.
    #[must_use]
    pub fn with_config(repositories: Repositories, config: AppConfig) -> Self {
        Self {
            todo_repository: repositories.todo_repository,
            category_repository: repositories.category_repository,
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /`
pub async fn welcome() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Welcome to todo-api!"))
}

/// `GET /health`
pub async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    let health = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(ApiResponse::success(health, "Service is healthy"))
}
