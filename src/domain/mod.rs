//! Domain layer: entities, value objects and the reconciliation engine.
//!
//! Nothing in this module performs I/O.

pub mod category;
pub mod change;
pub mod reconcile;
pub mod todo;

pub use category::{
    Category, CategoryId, CreateCategoryError, DESCRIPTION_MAX_LENGTH, NAME_MAX_LENGTH,
    NewCategory,
};
pub use change::{CategoryField, ChangeSet, Field, TodoField};
pub use reconcile::{
    CategoryPatch, ReconcileError, Reconciled, TodoPatch, reconcile_category, reconcile_todo,
};
pub use todo::{
    CreateTodoError, NewTodo, Priority, PriorityOutOfRange, Timestamp, Todo, TodoDraft, TodoId,
};
