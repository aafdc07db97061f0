//! Repository traits for domain entities.
//!
//! Every operation returns a boxed `'static` future so the traits stay
//! object-safe and can be shared as `Arc<dyn ...>` across handlers.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Category, CategoryId, NewCategory, NewTodo, Todo, TodoId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
///
/// A missing row is not an error: lookups return `Ok(None)`, updates report
/// zero rows and deletes return `Ok(false)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be converted into a domain value.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        Self::DatabaseError(error.to_string())
    }
}

/// Future returned by every repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Todo Repository
// =============================================================================

/// Repository trait for todos.
pub trait TodoRepository: Send + Sync {
    /// Finds a todo by its ID.
    ///
    /// Returns `Ok(Some(todo))` if found, `Ok(None)` if not found,
    /// or an error if the operation fails.
    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<Option<Todo>>;

    /// Lists every todo ordered by ID.
    fn list(&self) -> RepositoryFuture<Vec<Todo>>;

    /// Inserts validated creation data and returns the stored todo with its
    /// new ID.
    fn insert(&self, new_todo: &NewTodo) -> RepositoryFuture<Todo>;

    /// Writes the updatable fields of `todo` to the row with the same ID.
    ///
    /// `created_at` is never written. Returns the number of rows affected,
    /// which is `0` when the row no longer exists.
    fn update(&self, todo: &Todo) -> RepositoryFuture<u64>;

    /// Deletes a todo by its ID.
    ///
    /// Returns `Ok(true)` if the todo was deleted, `Ok(false)` if not found.
    fn delete(&self, id: TodoId) -> RepositoryFuture<bool>;
}

// =============================================================================
// Category Repository
// =============================================================================

/// Repository trait for categories.
pub trait CategoryRepository: Send + Sync {
    /// Finds a category by its ID.
    fn find_by_id(&self, id: CategoryId) -> RepositoryFuture<Option<Category>>;

    /// Lists every category ordered by ID.
    fn list(&self) -> RepositoryFuture<Vec<Category>>;

    /// Inserts validated creation data and returns the stored category.
    fn insert(&self, new_category: &NewCategory) -> RepositoryFuture<Category>;

    /// Writes `name` and `description` of `category` to the row with the
    /// same ID. Returns the number of rows affected.
    fn update(&self, category: &Category) -> RepositoryFuture<u64>;

    /// Deletes a category by its ID. Todos referencing it are left alone.
    fn delete(&self, id: CategoryId) -> RepositoryFuture<bool>;
}
