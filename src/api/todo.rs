//! Todo handlers.
//!
//! Extractor rejections are taken as `Result`s so they can be rendered as
//! envelope errors instead of axum's plain-text defaults.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use super::dto::{ApiResponse, CreateTodoRequest, TodoResponse, UpdateTodoRequest};
use super::error::ApiErrorResponse;
use super::handlers::AppState;
use crate::domain::{NewTodo, Timestamp, TodoDraft, TodoId, TodoPatch};
use crate::workflow::{self, PatchError, RecordKind};

fn not_found(id: i64) -> ApiErrorResponse {
    PatchError::NotFound {
        kind: RecordKind::Todo,
        id,
    }
    .into()
}

/// `GET /todos`
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_todos(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TodoResponse>>>, ApiErrorResponse> {
    let todos = state.todo_repository.list().await?;
    let body = todos.iter().map(TodoResponse::from).collect();
    Ok(Json(ApiResponse::success(body, "Todos listed successfully.")))
}

/// `POST /todos`
///
/// # Errors
///
/// Returns 400 for malformed or invalid input, including a category that
/// does not exist.
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TodoResponse>>), ApiErrorResponse> {
    let Json(request) = payload?;
    let new_todo = NewTodo::validate(TodoDraft::from(request), Timestamp::now())?;

    let category_id = new_todo.category_id;
    if state
        .category_repository
        .find_by_id(category_id)
        .await?
        .is_none()
    {
        return Err(ApiErrorResponse::bad_request(format!(
            "No category with ID {category_id}"
        )));
    }

    let todo = state.todo_repository.insert(&new_todo).await?;
    tracing::info!(todo_id = %todo.id, "todo created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            TodoResponse::from(&todo),
            "Todo created successfully.",
        )),
    ))
}

/// `GET /todos/{id}`
///
/// # Errors
///
/// Returns 400 for a non-integer ID and 404 for an unknown one.
pub async fn get_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<TodoResponse>>, ApiErrorResponse> {
    let Path(id) = path?;
    let todo = state
        .todo_repository
        .find_by_id(TodoId::new(id))
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(ApiResponse::success(
        TodoResponse::from(&todo),
        "Todo fetched successfully.",
    )))
}

/// `PATCH /todos/{id}`
///
/// Responds with the merged todo and the change summary as the message.
///
/// # Errors
///
/// Returns 400 for a rejected patch, 404 for an unknown ID.
pub async fn update_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TodoResponse>>, ApiErrorResponse> {
    let Path(id) = path?;
    let Json(request) = payload?;

    let outcome = workflow::patch_todo(
        state.todo_repository.as_ref(),
        TodoId::new(id),
        &TodoPatch::from(request),
        &Timestamp::now(),
    )
    .await?;

    Ok(Json(ApiResponse::success(
        TodoResponse::from(&outcome.record),
        outcome.summary,
    )))
}

/// `DELETE /todos/{id}`
///
/// # Errors
///
/// Returns 400 for a non-integer ID and 404 for an unknown one.
pub async fn delete_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ApiErrorResponse> {
    let Path(id) = path?;
    if !state.todo_repository.delete(TodoId::new(id)).await? {
        return Err(not_found(id));
    }
    tracing::info!(todo_id = id, "todo deleted");

    Ok(Json(ApiResponse::message(format!("Todo with ID {id} deleted."))))
}
