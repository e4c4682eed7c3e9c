//! Server configuration
//!
//! Read from a TOML file (path in `LADDER_CONFIG`, default `ladder.toml`).
//! A missing file means defaults. `LADDER_BIND_ADDR` and `LADDER_DATABASE_URL`
//! override the file.

use ladder_core::{BlendWeights, GameId, PerformanceBlendStrategy, StrategyRegistry};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LADDER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "ladder.toml";

/// `database_url` value that selects the in-process store
pub const MEMORY_DATABASE: &str = "memory";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("strategy for games {games:?}: {source}")]
    Strategy {
        games: Vec<GameId>,
        source: ladder_core::InvalidWeights,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// `sqlite://path.db`, `sqlite::memory:`, or `memory`
    pub database_url: String,
    /// Directory facts to load at startup
    pub seed_file: Option<PathBuf>,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    pub leaderboard: LeaderboardLimits,
    /// Game-specific scoring, in priority order
    pub strategies: Vec<StrategyConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: "sqlite://ladder.db".to_string(),
            seed_file: None,
            log_filter: "info".to_string(),
            leaderboard: LeaderboardLimits::default(),
            strategies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LeaderboardLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for LeaderboardLimits {
    fn default() -> Self {
        Self {
            default_limit: 25,
            max_limit: 100,
        }
    }
}

impl LeaderboardLimits {
    /// Clamp a requested page size into [1, max_limit]
    pub fn clamp(&self, requested: Option<i64>) -> usize {
        let max = self.max_limit.max(1);
        match requested {
            None => self.default_limit.clamp(1, max),
            Some(n) if n < 1 => 1,
            Some(n) => (n as u64).min(max as u64) as usize,
        }
    }
}

/// A [`PerformanceBlendStrategy`] registration
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub games: Vec<GameId>,
    #[serde(default)]
    pub weights: BlendWeights,
    pub damage_scale: Option<f64>,
}

impl ServerConfig {
    /// Load from `LADDER_CONFIG` (or the default path), then apply env
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("LADDER_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Ok(url) = std::env::var("LADDER_DATABASE_URL") {
            self.database_url = url;
        }
    }

    /// Build the strategy registry: configured blends first, weighted sum as
    /// the default.
    pub fn registry(&self) -> Result<StrategyRegistry, ConfigError> {
        let mut registry = StrategyRegistry::new();
        for s in &self.strategies {
            let strategy = PerformanceBlendStrategy::new(s.games.clone(), s.weights).map_err(
                |source| ConfigError::Strategy {
                    games: s.games.clone(),
                    source,
                },
            )?;
            let strategy = match s.damage_scale {
                Some(scale) => strategy.with_damage_scale(scale),
                None => strategy,
            };
            registry.register(Box::new(strategy));
        }
        Ok(registry)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
