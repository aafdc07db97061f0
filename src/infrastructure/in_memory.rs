//! In-memory repository implementations.
//!
//! These implementations keep rows in a `BTreeMap` behind
//! `Arc<RwLock<...>>` and hand out IDs from a monotonically increasing
//! counter, mirroring `AUTOINCREMENT`. They are suitable for tests and for
//! running the service without a database file.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{Category, CategoryId, NewCategory, NewTodo, Todo, TodoId};
use crate::infrastructure::{CategoryRepository, RepositoryFuture, TodoRepository};

// =============================================================================
// Table
// =============================================================================

/// Rows of one table plus the next ID to assign.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Table<T> {
    const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// =============================================================================
// In-Memory Todo Repository
// =============================================================================

/// In-memory implementation of `TodoRepository`.
#[derive(Debug, Clone)]
pub struct InMemoryTodoRepository {
    todos: Arc<RwLock<Table<Todo>>>,
}

impl InMemoryTodoRepository {
    /// Creates a new empty in-memory todo repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            todos: Arc::new(RwLock::new(Table::new())),
        }
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TodoRepository for InMemoryTodoRepository {
    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<Option<Todo>> {
        let todos = Arc::clone(&self.todos);
        Box::pin(async move {
            let guard = todos.read().await;
            Ok(guard.rows.get(&id.value()).cloned())
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Todo>> {
        let todos = Arc::clone(&self.todos);
        Box::pin(async move {
            let guard = todos.read().await;
            Ok(guard.rows.values().cloned().collect())
        })
    }

    fn insert(&self, new_todo: &NewTodo) -> RepositoryFuture<Todo> {
        let todos = Arc::clone(&self.todos);
        let new_todo = new_todo.clone();
        Box::pin(async move {
            let mut guard = todos.write().await;
            let id = TodoId::new(guard.allocate_id());
            let todo = Todo::from_new(id, new_todo);
            guard.rows.insert(id.value(), todo.clone());
            Ok(todo)
        })
    }

    fn update(&self, todo: &Todo) -> RepositoryFuture<u64> {
        let todos = Arc::clone(&self.todos);
        let todo = todo.clone();
        Box::pin(async move {
            let mut guard = todos.write().await;
            let Some(stored) = guard.rows.get_mut(&todo.id.value()) else {
                return Ok(0);
            };
            let created_at = stored.created_at;
            *stored = Todo { created_at, ..todo };
            Ok(1)
        })
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<bool> {
        let todos = Arc::clone(&self.todos);
        Box::pin(async move {
            let mut guard = todos.write().await;
            Ok(guard.rows.remove(&id.value()).is_some())
        })
    }
}

// =============================================================================
// In-Memory Category Repository
// =============================================================================

/// In-memory implementation of `CategoryRepository`.
#[derive(Debug, Clone)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<Table<Category>>>,
}

impl InMemoryCategoryRepository {
    /// Creates a new empty in-memory category repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            categories: Arc::new(RwLock::new(Table::new())),
        }
    }
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl CategoryRepository for InMemoryCategoryRepository {
    fn find_by_id(&self, id: CategoryId) -> RepositoryFuture<Option<Category>> {
        let categories = Arc::clone(&self.categories);
        Box::pin(async move {
            let guard = categories.read().await;
            Ok(guard.rows.get(&id.value()).cloned())
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Category>> {
        let categories = Arc::clone(&self.categories);
        Box::pin(async move {
            let guard = categories.read().await;
            Ok(guard.rows.values().cloned().collect())
        })
    }

    fn insert(&self, new_category: &NewCategory) -> RepositoryFuture<Category> {
        let categories = Arc::clone(&self.categories);
        let new_category = new_category.clone();
        Box::pin(async move {
            let mut guard = categories.write().await;
            let id = CategoryId::new(guard.allocate_id());
            let category = Category::from_new(id, new_category);
            guard.rows.insert(id.value(), category.clone());
            Ok(category)
        })
    }

    fn update(&self, category: &Category) -> RepositoryFuture<u64> {
        let categories = Arc::clone(&self.categories);
        let category = category.clone();
        Box::pin(async move {
            let mut guard = categories.write().await;
            match guard.rows.get_mut(&category.id.value()) {
                Some(stored) => {
                    *stored = category;
                    Ok(1)
                }
                None => Ok(0),
            }
        })
    }

    fn delete(&self, id: CategoryId) -> RepositoryFuture<bool> {
        let categories = Arc::clone(&self.categories);
        Box::pin(async move {
            let mut guard = categories.write().await;
            Ok(guard.rows.remove(&id.value()).is_some())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
