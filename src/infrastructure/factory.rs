//! Repository factory for runtime backend selection.
//!
//! Picks between the `SQLite` and in-memory backends from environment
//! configuration.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `sqlite` (default) | `in_memory`
//! - `DATABASE_URL`: `SQLite` connection URL (default `sqlite://todo-api.db`)
//!
//! # Example
//!
//! ```ignore
//! use infrastructure::factory::{RepositoryConfig, RepositoryFactory};
//!
//! let config = RepositoryConfig::from_env()?;
//! let repositories = RepositoryFactory::new(config).create().await?;
//! let todos = repositories.todo_repository.list().await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::sqlite;
use super::{
    CategoryRepository, InMemoryCategoryRepository, InMemoryTodoRepository,
    SqliteCategoryRepository, SqliteTodoRepository, TodoRepository,
};

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://todo-api.db";

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for todos and categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// `SQLite` database file (or `sqlite::memory:`).
    #[default]
    Sqlite,
    /// Process-local maps. Data is lost on restart.
    InMemory,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" | "db" => Ok(Self::Sqlite),
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Storage backend.
    pub storage_mode: StorageMode,
    /// `SQLite` connection URL, used when `storage_mode` is `Sqlite`.
    pub database_url: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `STORAGE_MODE` is not recognized or
    /// `DATABASE_URL` is not an `SQLite` URL.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let storage_mode = match env::var("STORAGE_MODE") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StorageMode::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidStorageMode(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        // Empty or whitespace-only counts as unset
        let database_url = env::var("DATABASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let config = Self {
            storage_mode,
            database_url,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidDatabaseUrl` when the `SQLite`
    /// backend is selected with a non-`sqlite:` URL.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Sqlite && !self.database_url.starts_with("sqlite:") {
            return Err(ConfigurationError::InvalidDatabaseUrl(
                self.database_url.clone(),
            ));
        }
        Ok(())
    }
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Sqlite)
///     .database_url("sqlite::memory:")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `SQLite` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database_url: self
                .database_url
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors in repository configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'sqlite' or 'in_memory'")]
    InvalidStorageMode(String),

    /// `DATABASE_URL` does not use the `sqlite:` scheme.
    #[error("Invalid database URL: '{0}'. Expected a 'sqlite:' URL")]
    InvalidDatabaseUrl(String),

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {variable}: '{value}'")]
    InvalidValue { variable: String, value: String },
}

/// Reads and parses `variable`, falling back to `default` when it is unset
/// or blank.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidValue` when the value does not parse.
pub fn parse_env<T: FromStr>(variable: &str, default: T) -> Result<T, ConfigurationError> {
    let Some(raw) = env::var(variable)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        return Ok(default);
    };
    raw.parse().map_err(|_| ConfigurationError::InvalidValue {
        variable: variable.to_string(),
        value: raw.clone(),
    })
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Opening the database or creating its tables failed.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Collection of initialized repositories.
#[derive(Clone)]
pub struct Repositories {
    /// Todo repository.
    pub todo_repository: Arc<dyn TodoRepository>,
    /// Category repository.
    pub category_repository: Arc<dyn CategoryRepository>,
}

impl Repositories {
    /// Creates empty in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            todo_repository: Arc::new(InMemoryTodoRepository::new()),
            category_repository: Arc::new(InMemoryCategoryRepository::new()),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("todo_repository", &"Arc<dyn TodoRepository>")
            .field("category_repository", &"Arc<dyn CategoryRepository>")
            .finish()
    }
}

/// Factory for creating repository instances based on configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates a new repository factory from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::Configuration` if environment configuration is invalid.
    pub fn from_env() -> Result<Self, FactoryError> {
        let config = RepositoryConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates all repositories based on the configuration.
    ///
    /// For the `SQLite` backend this opens the pool and creates the tables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::DatabaseConnection` if the database cannot be
    /// opened or initialized.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Repositories::in_memory()),
            StorageMode::Sqlite => {
                let pool = sqlite::connect(&self.config.database_url)
                    .await
                    .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;
                sqlite::initialize_schema(&pool)
                    .await
                    .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;
                Ok(Repositories {
                    todo_repository: Arc::new(SqliteTodoRepository::new(pool.clone())),
                    category_repository: Arc::new(SqliteCategoryRepository::new(pool)),
                })
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
