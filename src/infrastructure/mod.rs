//! Infrastructure module for persistence.
//!
//! This module contains the repository traits and their `SQLite` and
//! in-memory implementations.

pub mod factory;
pub mod in_memory;
pub mod repository;
pub mod sqlite;

pub use factory::{
    ConfigurationError, FactoryError, Repositories, RepositoryConfig, RepositoryFactory,
    StorageMode, parse_env,
};
pub use in_memory::{InMemoryCategoryRepository, InMemoryTodoRepository};
pub use repository::{CategoryRepository, RepositoryError, RepositoryFuture, TodoRepository};
pub use sqlite::{SqliteCategoryRepository, SqliteTodoRepository};
