//! Category handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use super::dto::{ApiResponse, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};
use super::error::ApiErrorResponse;
use super::handlers::AppState;
use crate::domain::{CategoryId, CategoryPatch, NewCategory};
use crate::workflow::{self, PatchError, RecordKind};

/// `GET /categories`
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ApiErrorResponse> {
    let categories = state.category_repository.list().await?;
    let body = categories.iter().map(CategoryResponse::from).collect();
    Ok(Json(ApiResponse::success(
        body,
        "Categories listed successfully!",
    )))
}

/// `POST /categories`
///
/// # Errors
///
/// Returns 400 for a blank or too long name and a too long description.
pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), ApiErrorResponse> {
    let Json(request) = payload?;
    let new_category = NewCategory::validate(request.name, request.description)?;

    let category = state.category_repository.insert(&new_category).await?;
    tracing::info!(category_id = %category.id, "category created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            CategoryResponse::from(&category),
            "Category created successfully!",
        )),
    ))
}

/// `PATCH /categories/{id}`
///
/// # Errors
///
/// Returns 400 for a rejected patch, 404 for an unknown ID.
pub async fn update_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ApiErrorResponse> {
    let Path(id) = path?;
    let Json(request) = payload?;

    let outcome = workflow::patch_category(
        state.category_repository.as_ref(),
        CategoryId::new(id),
        &CategoryPatch::from(request),
    )
    .await?;

    Ok(Json(ApiResponse::success(
        CategoryResponse::from(&outcome.record),
        outcome.summary,
    )))
}

/// `DELETE /categories/{id}`
///
/// Todos that reference the category are kept.
///
/// # Errors
///
/// Returns 400 for a non-integer ID and 404 for an unknown one.
pub async fn delete_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ApiErrorResponse> {
    let Path(id) = path?;
    if !state
        .category_repository
        .delete(CategoryId::new(id))
        .await?
    {
        return Err(PatchError::NotFound {
            kind: RecordKind::Category,
            id,
        }
        .into());
    }
    tracing::info!(category_id = id, "category deleted");

    Ok(Json(ApiResponse::message(format!(
        "Category with ID {id} deleted."
    ))))
}
