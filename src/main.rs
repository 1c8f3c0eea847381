//! AssetHub Server: content-versioned file storage gateway.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use assethub_api::AppState;
use assethub_core::config::AppConfig;
use assethub_core::error::AppError;
use assethub_database::repositories::{FileRepository, ProjectMemberRepository};
use assethub_database::{
    DatabasePool, MemoryCatalog, MemoryMembership, MembershipOracle, VersionCatalog,
};
use assethub_storage::StorageManager;

#[tokio::main]
async fn main() {
    let env = std::env::var("ASSETHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting AssetHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Catalog and membership ───────────────────────────
    let (catalog, members, db_pool): (Arc<dyn VersionCatalog>, Arc<dyn MembershipOracle>, _) =
        if config.database.url.trim().is_empty() {
            tracing::warn!("database.url is empty; using the in-memory catalog");
            (
                Arc::new(MemoryCatalog::new()),
                Arc::new(MemoryMembership::new()),
                None,
            )
        } else {
            let pool = DatabasePool::connect(&config.database).await?;

            tracing::info!("Running database migrations...");
            assethub_database::migration::run_migrations(pool.pool()).await?;
            tracing::info!("Database migrations complete");

            (
                Arc::new(FileRepository::new(pool.pool().clone())),
                Arc::new(ProjectMemberRepository::new(pool.pool().clone())),
                Some(pool),
            )
        };

    // ── Step 2: Object storage ───────────────────────────────────
    tracing::info!(provider = %config.storage.provider, "Initializing object storage...");
    let storage = StorageManager::from_config(&config.storage).await?;

    // ── Step 3: Serve ────────────────────────────────────────────
    let state = AppState::new(config, catalog, members, storage, db_pool);
    assethub_api::serve(state).await
}
