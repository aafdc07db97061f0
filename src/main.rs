//! Todo API
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `8080`)
//! - `STORAGE_MODE`: `sqlite` (default) | `in_memory`
//! - `DATABASE_URL`: `SQLite` URL (default: `sqlite://todo-api.db`)
//! - `RATE_LIMIT_MAX_REQUESTS`: requests per window (default: `60`)
//! - `RATE_LIMIT_WINDOW_SECONDS`: window length (default: `60`)
//! - `RUST_LOG`: Logging level (e.g., `debug`, `todo_api=debug`)
//! - `LOG_FORMAT`: `text` (default) | `json`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_api::api::{AppConfig, AppState, create_router};
use todo_api::infrastructure::{RepositoryConfig, RepositoryFactory};
use todo_api::server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!("Starting Todo API");

    let server_config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    let app_config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    let repository_config = match RepositoryConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        storage_mode = ?repository_config.storage_mode,
        database_url = %repository_config.database_url,
        max_requests = app_config.rate_limit.max_requests,
        window_seconds = app_config.rate_limit.window.as_secs(),
        "Configuration loaded"
    );

    let repositories = match RepositoryFactory::new(repository_config).create().await {
        Ok(repositories) => {
            tracing::info!("Repositories initialized successfully");
            repositories
        }
        Err(error) => {
            tracing::error!("Failed to initialize repositories: {}", error);
            std::process::exit(1);
        }
    };

    let state = AppState::with_config(repositories, app_config);
    let router = create_router(state);

    if let Err(error) = Server::new(server_config).run(router).await {
        tracing::error!("Server error: {}", error);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todo_api=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
