//! `SQLite` repository implementations.
//!
//! This module provides `SQLite`-backed implementations of the repository
//! traits using `sqlx`. Timestamps are stored as RFC 3339 text.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS category (
//!     id          INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name        TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT ''
//! );
//!
//! CREATE TABLE IF NOT EXISTS todo (
//!     id          INTEGER PRIMARY KEY AUTOINCREMENT,
//!     title       TEXT NOT NULL,
//!     content     TEXT NOT NULL,
//!     priority    INTEGER NOT NULL,
//!     created_at  TEXT NOT NULL,
//!     due_date    TEXT NOT NULL,
//!     done        INTEGER NOT NULL DEFAULT 0,
//!     category_id INTEGER NOT NULL
//! );
//! ```
//!
//! `todo.category_id` carries no foreign key: deleting a category leaves its
//! todos in place.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::domain::{Category, CategoryId, NewCategory, NewTodo, Priority, Timestamp, Todo, TodoId};
use crate::infrastructure::{CategoryRepository, RepositoryError, RepositoryFuture, TodoRepository};

const CREATE_CATEGORY_TABLE: &str = "CREATE TABLE IF NOT EXISTS category (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
)";

const CREATE_TODO_TABLE: &str = "CREATE TABLE IF NOT EXISTS todo (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    priority    INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    due_date    TEXT NOT NULL,
    done        INTEGER NOT NULL DEFAULT 0,
    category_id INTEGER NOT NULL
)";

// =============================================================================
// Pool and Schema
// =============================================================================

/// Opens a connection pool, creating the database file if it does not exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is malformed or the database cannot be
/// opened.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool_options = if database_url.contains(":memory:") {
        // An in-memory database lives and dies with its single connection.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };
    pool_options.connect_with(options).await
}

/// Creates the `category` and `todo` tables if they are missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if a statement fails.
pub async fn initialize_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_CATEGORY_TABLE).execute(pool).await?;
    sqlx::query(CREATE_TODO_TABLE).execute(pool).await?;
    tracing::debug!("database schema initialized");
    Ok(())
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    content: String,
    priority: i64,
    created_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
    done: bool,
    category_id: i64,
}

impl TryFrom<TodoRow> for Todo {
    type Error = RepositoryError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let priority = Priority::new(row.priority).map_err(|error| {
            RepositoryError::SerializationError(format!("todo {}: {error}", row.id))
        })?;
        Ok(Self {
            id: TodoId::new(row.id),
            title: row.title,
            content: row.content,
            priority,
            created_at: Timestamp::from_datetime(row.created_at),
            due_date: Timestamp::from_datetime(row.due_date),
            is_done: row.done,
            category_id: CategoryId::new(row.category_id),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
        }
    }
}

// =============================================================================
// SQLite Todo Repository
// =============================================================================

/// `SQLite` implementation of `TodoRepository`.
#[derive(Debug, Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    /// Creates a new repository over an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl TodoRepository for SqliteTodoRepository {
    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<Option<Todo>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row: Option<TodoRow> = sqlx::query_as(
                "SELECT id, title, content, priority, created_at, due_date, done, category_id \
                 FROM todo WHERE id = ?",
            )
            .bind(id.value())
            .fetch_optional(&pool)
            .await?;
            row.map(Todo::try_from).transpose()
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Todo>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows: Vec<TodoRow> = sqlx::query_as(
                "SELECT id, title, content, priority, created_at, due_date, done, category_id \
                 FROM todo ORDER BY id ASC",
            )
            .fetch_all(&pool)
            .await?;
            rows.into_iter().map(Todo::try_from).collect()
        })
    }

    fn insert(&self, new_todo: &NewTodo) -> RepositoryFuture<Todo> {
        let pool = self.pool.clone();
        let new_todo = new_todo.clone();
        Box::pin(async move {
            let result = sqlx::query(
                "INSERT INTO todo (title, content, priority, created_at, due_date, done, category_id) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&new_todo.title)
            .bind(&new_todo.content)
            .bind(new_todo.priority.value())
            .bind(*new_todo.created_at.as_datetime())
            .bind(*new_todo.due_date.as_datetime())
            .bind(new_todo.is_done)
            .bind(new_todo.category_id.value())
            .execute(&pool)
            .await?;
            let id = TodoId::new(result.last_insert_rowid());
            Ok(Todo::from_new(id, new_todo))
        })
    }

    fn update(&self, todo: &Todo) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        let todo = todo.clone();
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE todo SET title = ?, content = ?, priority = ?, due_date = ?, done = ?, \
                 category_id = ? WHERE id = ?",
            )
            .bind(&todo.title)
            .bind(&todo.content)
            .bind(todo.priority.value())
            .bind(*todo.due_date.as_datetime())
            .bind(todo.is_done)
            .bind(todo.category_id.value())
            .bind(todo.id.value())
            .execute(&pool)
            .await?;
            Ok(result.rows_affected())
        })
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM todo WHERE id = ?")
                .bind(id.value())
                .execute(&pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }
}

// =============================================================================
// SQLite Category Repository
// =============================================================================

/// `SQLite` implementation of `CategoryRepository`.
#[derive(Debug, Clone)]
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    /// Creates a new repository over an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CategoryRepository for SqliteCategoryRepository {
    fn find_by_id(&self, id: CategoryId) -> RepositoryFuture<Option<Category>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row: Option<CategoryRow> =
                sqlx::query_as("SELECT id, name, description FROM category WHERE id = ?")
                    .bind(id.value())
                    .fetch_optional(&pool)
                    .await?;
            Ok(row.map(Category::from))
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Category>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows: Vec<CategoryRow> =
                sqlx::query_as("SELECT id, name, description FROM category ORDER BY id ASC")
                    .fetch_all(&pool)
                    .await?;
            Ok(rows.into_iter().map(Category::from).collect())
        })
    }

    fn insert(&self, new_category: &NewCategory) -> RepositoryFuture<Category> {
        let pool = self.pool.clone();
        let new_category = new_category.clone();
        Box::pin(async move {
            let result = sqlx::query("INSERT INTO category (name, description) VALUES (?, ?)")
                .bind(&new_category.name)
                .bind(&new_category.description)
                .execute(&pool)
                .await?;
            let id = CategoryId::new(result.last_insert_rowid());
            Ok(Category::from_new(id, new_category))
        })
    }

    fn update(&self, category: &Category) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        let category = category.clone();
        Box::pin(async move {
            let result = sqlx::query("UPDATE category SET name = ?, description = ? WHERE id = ?")
                .bind(&category.name)
                .bind(&category.description)
                .bind(category.id.value())
                .execute(&pool)
                .await?;
            Ok(result.rows_affected())
        })
    }

    fn delete(&self, id: CategoryId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM category WHERE id = ?")
                .bind(id.value())
                .execute(&pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SubsecRound};
    use rstest::rstest;

    async fn memory_pool() -> SqlitePool {
        let pool = connect("sqlite::memory:").await.unwrap();
        initialize_schema(&pool).await.unwrap();
        pool
    }

    fn new_todo(category_id: i64) -> NewTodo {
        let now = Utc::now().trunc_subsecs(0);
        NewTodo {
            title: "Buy milk".to_string(),
            content: "Two litres".to_string(),
            priority: Priority::new(2).unwrap(),
            created_at: Timestamp::from_datetime(now),
            due_date: Timestamp::from_datetime(now + Duration::days(2)),
            is_done: false,
            category_id: CategoryId::new(category_id),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_todo_insert_and_find() {
        let repository = SqliteTodoRepository::new(memory_pool().await);

        let inserted = repository.insert(&new_todo(1)).await.unwrap();
        let found = repository.find_by_id(inserted.id).await.unwrap();

        assert_eq!(found, Some(inserted));
    }

    #[rstest]
    #[tokio::test]
    async fn test_todo_find_missing_returns_none() {
        let repository = SqliteTodoRepository::new(memory_pool().await);
        let found = repository.find_by_id(TodoId::new(42)).await.unwrap();
        assert!(found.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_todo_update_keeps_created_at() {
        let repository = SqliteTodoRepository::new(memory_pool().await);
        let inserted = repository.insert(&new_todo(1)).await.unwrap();

        let changed = Todo {
            title: "Buy oat milk".to_string(),
            priority: Priority::new(5).unwrap(),
            is_done: true,
            created_at: Timestamp::from_datetime(Utc::now() + Duration::days(100)),
            ..inserted.clone()
        };
        let rows = repository.update(&changed).await.unwrap();
        let found = repository.find_by_id(inserted.id).await.unwrap().unwrap();

        assert_eq!(rows, 1);
        assert_eq!(found.title, "Buy oat milk");
        assert_eq!(found.priority.value(), 5);
        assert!(found.is_done);
        assert_eq!(found.created_at, inserted.created_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_todo_update_missing_row_affects_nothing() {
        let repository = SqliteTodoRepository::new(memory_pool().await);
        let inserted = repository.insert(&new_todo(1)).await.unwrap();
        assert!(repository.delete(inserted.id).await.unwrap());

        let rows = repository.update(&inserted).await.unwrap();
        assert_eq!(rows, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_todo_list_is_ordered_by_id() {
        let repository = SqliteTodoRepository::new(memory_pool().await);
        let first = repository.insert(&new_todo(1)).await.unwrap();
        let second = repository.insert(&new_todo(2)).await.unwrap();

        let todos = repository.list().await.unwrap();

        assert_eq!(todos, vec![first, second]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_todo_delete_twice() {
        let repository = SqliteTodoRepository::new(memory_pool().await);
        let inserted = repository.insert(&new_todo(1)).await.unwrap();

        assert!(repository.delete(inserted.id).await.unwrap());
        assert!(!repository.delete(inserted.id).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn test_corrupt_priority_is_a_serialization_error() {
        let pool = memory_pool().await;
        let repository = SqliteTodoRepository::new(pool.clone());
        let inserted = repository.insert(&new_todo(1)).await.unwrap();
        sqlx::query("UPDATE todo SET priority = 9 WHERE id = ?")
            .bind(inserted.id.value())
            .execute(&pool)
            .await
            .unwrap();

        let result = repository.find_by_id(inserted.id).await;

        assert!(matches!(result, Err(RepositoryError::SerializationError(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_category_crud() {
        let repository = SqliteCategoryRepository::new(memory_pool().await);
        let created = repository
            .insert(&NewCategory {
                name: "Work".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        let renamed = Category {
            name: "Office".to_string(),
            ..created.clone()
        };
        assert_eq!(repository.update(&renamed).await.unwrap(), 1);
        assert_eq!(
            repository.find_by_id(created.id).await.unwrap(),
            Some(renamed.clone())
        );
        assert_eq!(repository.list().await.unwrap(), vec![renamed]);
        assert!(repository.delete(created.id).await.unwrap());
        assert!(repository.list().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_deleting_category_keeps_todos() {
        let pool = memory_pool().await;
        let categories = SqliteCategoryRepository::new(pool.clone());
        let todos = SqliteTodoRepository::new(pool);
        let category = categories
            .insert(&NewCategory {
                name: "Home".to_string(),
                description: "Chores".to_string(),
            })
            .await
            .unwrap();
        let todo = todos.insert(&new_todo(category.id.value())).await.unwrap();

        assert!(categories.delete(category.id).await.unwrap());

        let orphan = todos.find_by_id(todo.id).await.unwrap().unwrap();
        assert_eq!(orphan.category_id, category.id);
    }
}
