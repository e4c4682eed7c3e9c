//! Match ingestion and ranking pipeline for community tournaments
//!
//! This crate provides:
//! - Match report submission and review (draft → verified / rejected)
//! - Per-player, per-game stat aggregates updated on verification
//! - Pluggable ranking strategies and percentile-based skill tiers
//! - Leaderboard and player-rank queries
//!
//! Storage is behind the [`MatchStore`], [`StatStore`] and [`Directory`]
//! traits. [`MemoryStore`] implements all three in-process; the server crate
//! provides a SQLite backend.
//!
//! # Usage
//!
//! ```ignore
//! let store = Arc::new(MemoryStore::new());
//! let service = MatchService::new(store.clone(), store.clone(), store.clone(),
//!     Arc::new(StrategyRegistry::new()));
//! let draft = service.submit_match(request, captain).await?;
//! let outcome = service.verify_match(&draft.id, reviewer).await?;
//! ```

mod directory;
mod error;
mod ids;
mod leaderboard;
mod lifecycle;
mod matches;
mod memory;
mod ranking;
mod stats;
mod store;
mod tier;

pub use directory::*;
pub use error::*;
pub use ids::*;
pub use leaderboard::*;
pub use lifecycle::*;
pub use matches::*;
pub use memory::MemoryStore;
pub use ranking::*;
pub use stats::*;
pub use store::*;
pub use tier::*;
