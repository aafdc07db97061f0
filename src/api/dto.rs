//! Data Transfer Objects for API requests and responses.
//!
//! Every response body is wrapped in [`ApiResponse`]. Request DTOs convert
//! into domain inputs: creation requests into drafts, update requests into
//! patches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, CategoryPatch, Timestamp, Todo, TodoDraft, TodoPatch};

// =============================================================================
// Envelope
// =============================================================================

/// JSON envelope shared by every response.
///
/// `data` and `message` are omitted when absent; `error` is only present on
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying data and a message.
    #[must_use]
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// A successful response carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A failed response.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// Todo DTOs
// =============================================================================

/// Request body for `POST /todos`.
///
/// Missing fields decode to zero values and are rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTodoRequest {
    pub title: String,
    pub content: String,
    pub priority: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub category_id: i64,
}

impl From<CreateTodoRequest> for TodoDraft {
    fn from(request: CreateTodoRequest) -> Self {
        Self {
            title: request.title,
            content: request.content,
            priority: request.priority,
            due_date: request.due_date.map(Timestamp::from_datetime),
            category_id: request.category_id,
        }
    }
}

/// Request body for `PATCH /todos/{id}`. Missing and `null` keys are absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_done: Option<bool>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl From<UpdateTodoRequest> for TodoPatch {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            title: request.title,
            content: request.content,
            priority: request.priority,
            due_date: request.due_date.map(Timestamp::from_datetime),
            is_done: request.is_done,
            category_id: request.category_id,
        }
    }
}

/// Todo as rendered on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub priority: i64,
    pub created_at: String,
    pub due_date: String,
    pub is_done: bool,
    pub category_id: i64,
}

impl From<&Todo> for TodoResponse {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id.value(),
            title: todo.title.clone(),
            content: todo.content.clone(),
            priority: todo.priority.value(),
            created_at: todo.created_at.to_rfc3339(),
            due_date: todo.due_date.to_rfc3339(),
            is_done: todo.is_done,
            category_id: todo.category_id.value(),
        }
    }
}

// =============================================================================
// Category DTOs
// =============================================================================

/// Request body for `POST /categories`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Request body for `PATCH /categories/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdateCategoryRequest> for CategoryPatch {
    fn from(request: UpdateCategoryRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
        }
    }
}

/// Category as rendered on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.value(),
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}

// =============================================================================
// Health
// =============================================================================

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Tests
// =============================================================================
