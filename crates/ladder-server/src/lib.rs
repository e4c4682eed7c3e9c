//! HTTP server for the match ladder
//!
//! Wires [`ladder_core`] services to a storage backend chosen by
//! [`ServerConfig::database_url`] and exposes them through an axum router.

pub mod api;
pub mod config;
pub mod db;
pub mod seed;

use ladder_core::{LeaderboardService, MatchService, MemoryStore, StoreError};
use std::sync::Arc;

pub use config::{ConfigError, LeaderboardLimits, ServerConfig, MEMORY_DATABASE};
pub use db::SqliteStore;
pub use seed::{Seed, SeedError};

#[derive(Clone)]
pub struct AppState {
    pub matches: Arc<MatchService>,
    pub leaderboard: Arc<LeaderboardService>,
    pub limits: LeaderboardLimits,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error("failed to open database: {0}")]
    Store(#[from] StoreError),
}

/// Open the configured backend, load the seed file if any, and build the
/// services.
pub async fn build_state(config: &ServerConfig) -> Result<AppState, StartupError> {
    let registry = Arc::new(config.registry()?);
    let seed = match &config.seed_file {
        Some(path) => Some(Seed::from_file(path)?),
        None => None,
    };

    if config.database_url == MEMORY_DATABASE {
        let store = Arc::new(MemoryStore::new());
        if let Some(seed) = &seed {
            seed.apply_memory(&store)?;
        }
        tracing::info!(backend = "memory", "storage ready");
        return Ok(AppState {
            matches: Arc::new(MatchService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                registry,
            )),
            leaderboard: Arc::new(LeaderboardService::new(store.clone(), store)),
            limits: config.leaderboard,
        });
    }

    let store = Arc::new(SqliteStore::connect(&config.database_url).await?);
    if let Some(seed) = &seed {
        seed.apply_sqlite(&store).await?;
    }
    tracing::info!(backend = "sqlite", url = %config.database_url, "storage ready");
    Ok(AppState {
        matches: Arc::new(MatchService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            registry,
        )),
        leaderboard: Arc::new(LeaderboardService::new(store.clone(), store)),
        limits: config.leaderboard,
    })
}
