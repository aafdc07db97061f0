//! HTTP API layer.
//!
//! Routes, handlers, DTOs, error rendering and middleware.

pub mod category;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod todo;

pub use dto::{
    ApiResponse, CategoryResponse, CreateCategoryRequest, CreateTodoRequest, HealthResponse,
    TodoResponse, UpdateCategoryRequest, UpdateTodoRequest,
};
pub use error::ApiErrorResponse;
pub use handlers::{AppConfig, AppState};
pub use routes::create_router;
