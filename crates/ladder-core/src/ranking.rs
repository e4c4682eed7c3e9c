//! Ranking score calculation
//!
//! A [`StrategyRegistry`] holds zero or more game-specific strategies plus one
//! default. Lookup scans the registered strategies in order and falls back to
//! the default, so scoring never fails.

use serde::{Deserialize, Serialize};

use crate::directory::{validate_weight_sum, GameConfig, InvalidWeights};
use crate::ids::GameId;
use crate::stats::{keys, PlayerGameStats};

/// Scoring algorithm for one or more games
pub trait RankingStrategy: Send + Sync {
    /// Score an aggregate. Higher is better.
    fn calculate(&self, stats: &PlayerGameStats, game: &GameConfig) -> f64;

    fn supports_game(&self, game: &GameId) -> bool;

    fn name(&self) -> &str;
}

/// Σ weight × value over the game's configured ranking weights.
///
/// Weight keys may name raw aggregate stats or one of the derived keys
/// (`kd_ratio`, `avg_kills`, `avg_damage`, `win_rate`, `avg_placement`).
/// Missing stats count as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedSumStrategy;

impl RankingStrategy for WeightedSumStrategy {
    fn calculate(&self, stats: &PlayerGameStats, game: &GameConfig) -> f64 {
        game.ranking_weights
            .iter()
            .map(|(key, weight)| weight * stats.derived(key))
            .sum()
    }

    fn supports_game(&self, _game: &GameId) -> bool {
        true
    }

    fn name(&self) -> &str {
        "weighted-sum"
    }
}

/// Blend weights for [`PerformanceBlendStrategy`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub kd_ratio: f64,
    pub avg_kills: f64,
    pub avg_damage: f64,
    pub consistency: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            kd_ratio: 0.4,
            avg_kills: 0.3,
            avg_damage: 0.2,
            consistency: 0.1,
        }
    }
}

impl BlendWeights {
    pub fn validate(&self) -> Result<(), InvalidWeights> {
        validate_weight_sum(&[
            self.kd_ratio,
            self.avg_kills,
            self.avg_damage,
            self.consistency,
        ])
    }
}

/// Shooter-style blend of K/D, average kills, average damage and
/// consistency, registered for specific games.
///
/// Consistency is `1 / (1 + σ)` over kills per match, so a player with
/// identical results every match scores 1.0 on that component.
#[derive(Debug, Clone)]
pub struct PerformanceBlendStrategy {
    games: Vec<GameId>,
    weights: BlendWeights,
    /// Divides average damage so it lands on a scale comparable to kills
    damage_scale: f64,
}

impl PerformanceBlendStrategy {
    pub const DEFAULT_DAMAGE_SCALE: f64 = 100.0;

    pub fn new(games: Vec<GameId>, weights: BlendWeights) -> Result<Self, InvalidWeights> {
        weights.validate()?;
        Ok(Self {
            games,
            weights,
            damage_scale: Self::DEFAULT_DAMAGE_SCALE,
        })
    }

    pub fn with_damage_scale(mut self, scale: f64) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.damage_scale = scale;
        }
        self
    }

    pub fn consistency(stats: &PlayerGameStats) -> f64 {
        if stats.matches_played == 0 {
            return 0.0;
        }
        1.0 / (1.0 + stats.kills_std_dev())
    }
}

impl RankingStrategy for PerformanceBlendStrategy {
    fn calculate(&self, stats: &PlayerGameStats, _game: &GameConfig) -> f64 {
        let w = &self.weights;
        w.kd_ratio * stats.derived(keys::KD_RATIO)
            + w.avg_kills * stats.derived(keys::AVG_KILLS)
            + w.avg_damage * stats.derived(keys::AVG_DAMAGE) / self.damage_scale
            + w.consistency * Self::consistency(stats)
    }

    fn supports_game(&self, game: &GameId) -> bool {
        self.games.contains(game)
    }

    fn name(&self) -> &str {
        "performance-blend"
    }
}

/// Ordered strategy list with a mandatory fallback
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn RankingStrategy>>,
    default: Box<dyn RankingStrategy>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    /// Registry with only the weighted-sum default
    pub fn new() -> Self {
        Self::with_default(Box::new(WeightedSumStrategy))
    }

    pub fn with_default(default: Box<dyn RankingStrategy>) -> Self {
        Self {
            strategies: Vec::new(),
            default,
        }
    }

    /// Add a strategy. Earlier registrations win when several support a game.
    pub fn register(&mut self, strategy: Box<dyn RankingStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn select(&self, game: &GameId) -> &dyn RankingStrategy {
        self.strategies
            .iter()
            .find(|s| s.supports_game(game))
            .unwrap_or(&self.default)
            .as_ref()
    }

    pub fn score(&self, stats: &PlayerGameStats, game: &GameConfig) -> f64 {
        let score = self.select(&game.id).calculate(stats, game);
        // keep NaN out of the ordered leaderboard
        if score.is_finite() {
            score
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
#[path = "ranking_tests.rs"]
mod ranking_tests;
