//! Partial-update workflow.
//!
//! Loads the current record, reconciles the patch against it, and persists
//! the merged record:
//!
//! ```text
//! load -> reconcile -> summarize -> apply
//! ```
//!
//! Read and write are separate statements with no transaction around them;
//! concurrent patches on the same record are last-writer-wins.

use std::fmt;

use thiserror::Error;

use crate::domain::{
    Category, CategoryId, CategoryPatch, ReconcileError, Timestamp, Todo, TodoId, TodoPatch,
    reconcile_category, reconcile_todo,
};
use crate::infrastructure::{CategoryRepository, RepositoryError, TodoRepository};

// =============================================================================
// Outcome and Errors
// =============================================================================

/// Which resource a workflow step was operating on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Todo,
    Category,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => formatter.write_str("todo"),
            Self::Category => formatter.write_str("category"),
        }
    }
}

/// A persisted patch: the stored record and its change summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome<T> {
    pub record: T,
    pub summary: String,
}

/// Errors from the partial-update workflow.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The patch was rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ReconcileError),

    /// The record was missing at read time or vanished before the write.
    #[error("No {kind} with ID {id}")]
    NotFound { kind: RecordKind, id: i64 },

    /// The store failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

// =============================================================================
// Todo
// =============================================================================

/// Loads the current state of a todo.
///
/// # Errors
///
/// Returns `PatchError::NotFound` if no todo has this ID, or
/// `PatchError::Store` if the lookup fails.
pub async fn load_todo(repository: &dyn TodoRepository, id: TodoId) -> Result<Todo, PatchError> {
    repository
        .find_by_id(id)
        .await?
        .ok_or(PatchError::NotFound {
            kind: RecordKind::Todo,
            id: id.value(),
        })
}

/// Persists a merged todo.
///
/// # Errors
///
/// Returns `PatchError::NotFound` when the update affects no rows.
pub async fn apply_todo(repository: &dyn TodoRepository, todo: &Todo) -> Result<(), PatchError> {
    let rows = repository.update(todo).await?;
    if rows == 0 {
        tracing::warn!(todo_id = %todo.id, "todo vanished before update");
        return Err(PatchError::NotFound {
            kind: RecordKind::Todo,
            id: todo.id.value(),
        });
    }
    Ok(())
}

/// Applies a partial update to a todo.
///
/// # Errors
///
/// Returns `PatchError::Validation` without writing anything when the patch
/// is rejected.
pub async fn patch_todo(
    repository: &dyn TodoRepository,
    id: TodoId,
    patch: &TodoPatch,
    now: &Timestamp,
) -> Result<PatchOutcome<Todo>, PatchError> {
    let existing = load_todo(repository, id).await?;
    let reconciled = reconcile_todo(&existing, patch, now)?;
    let summary = reconciled.summary();

    apply_todo(repository, &reconciled.merged).await?;
    tracing::debug!(todo_id = %id, changes = %summary, "todo patched");

    Ok(PatchOutcome {
        record: reconciled.merged,
        summary,
    })
}

// =============================================================================
// Category
// =============================================================================

/// Loads the current state of a category.
///
/// # Errors
///
/// Returns `PatchError::NotFound` if no category has this ID, or
/// `PatchError::Store` if the lookup fails.
pub async fn load_category(
    repository: &dyn CategoryRepository,
    id: CategoryId,
) -> Result<Category, PatchError> {
    repository
        .find_by_id(id)
        .await?
        .ok_or(PatchError::NotFound {
            kind: RecordKind::Category,
            id: id.value(),
        })
}

/// Persists a merged category.
///
/// # Errors
///
/// Returns `PatchError::NotFound` when the update affects no rows.
pub async fn apply_category(
    repository: &dyn CategoryRepository,
    category: &Category,
) -> Result<(), PatchError> {
    let rows = repository.update(category).await?;
    if rows == 0 {
        tracing::warn!(category_id = %category.id, "category vanished before update");
        return Err(PatchError::NotFound {
            kind: RecordKind::Category,
            id: category.id.value(),
        });
    }
    Ok(())
}

/// Applies a partial update to a category.
///
/// # Errors
///
/// Returns `PatchError::Validation` without writing anything when the patch
/// is rejected.
pub async fn patch_category(
    repository: &dyn CategoryRepository,
    id: CategoryId,
    patch: &CategoryPatch,
) -> Result<PatchOutcome<Category>, PatchError> {
    let existing = load_category(repository, id).await?;
    let reconciled = reconcile_category(&existing, patch)?;
    let summary = reconciled.summary();

    apply_category(repository, &reconciled.merged).await?;
    tracing::debug!(category_id = %id, changes = %summary, "category patched");

    Ok(PatchOutcome {
        record: reconciled.merged,
        summary,
    })
}

// =============================================================================
// Tests
// =============================================================================
