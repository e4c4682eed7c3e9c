//! Open stat maps and the per-(player, game) aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::{GameId, PlayerId};
use crate::tier::Tier;

/// Aggregate keys written by match verification
pub mod keys {
    pub const KILLS: &str = "kills";
    pub const DEATHS: &str = "deaths";
    pub const ASSISTS: &str = "assists";
    pub const DAMAGE: &str = "damage";
    /// Sum of squared per-match kills, for the consistency measure
    pub const KILLS_SQ: &str = "kills_sq";
    pub const WINS: &str = "wins";
    pub const PLACEMENT_TOTAL: &str = "placement_total";

    // Derived on read, never stored
    pub const KD_RATIO: &str = "kd_ratio";
    pub const AVG_KILLS: &str = "avg_kills";
    pub const AVG_DAMAGE: &str = "avg_damage";
    pub const WIN_RATE: &str = "win_rate";
    pub const AVG_PLACEMENT: &str = "avg_placement";

    /// Keys produced by the match counters themselves. A custom stat may not
    /// reuse one of these names.
    pub const RESERVED: &[&str] = &[
        KILLS,
        DEATHS,
        ASSISTS,
        DAMAGE,
        KILLS_SQ,
        WINS,
        PLACEMENT_TOTAL,
        KD_RATIO,
        AVG_KILLS,
        AVG_DAMAGE,
        WIN_RATE,
        AVG_PLACEMENT,
    ];
}

/// A single stat value. Games define their own keys, so values are either
/// numeric or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            StatValue::Text(_) => None,
        }
    }
}

impl From<f64> for StatValue {
    fn from(n: f64) -> Self {
        StatValue::Number(n)
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

pub type StatMap = BTreeMap<String, StatValue>;

/// Numeric lookup with an explicit default of 0 for missing or text values.
pub fn number(stats: &StatMap, key: &str) -> f64 {
    stats.get(key).and_then(StatValue::as_number).unwrap_or(0.0)
}

/// Kill/death ratio. Zero deaths yields the kill count rather than infinity.
pub fn kd_ratio(kills: f64, deaths: f64) -> f64 {
    if deaths == 0.0 {
        kills
    } else {
        kills / deaths
    }
}

/// Per-player, per-game accumulation of raw stats plus the derived ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameStats {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub stats: StatMap,
    pub matches_played: u32,
    pub ranking_score: f64,
    pub tier: Tier,
    pub last_match_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerGameStats {
    /// Empty aggregate as produced by get-or-create
    pub fn new(player_id: PlayerId, game_id: GameId, now: DateTime<Utc>) -> Self {
        Self {
            player_id,
            game_id,
            stats: StatMap::new(),
            matches_played: 0,
            ranking_score: 0.0,
            tier: Tier::Bronze,
            last_match_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stat(&self, key: &str) -> f64 {
        number(&self.stats, key)
    }

    /// Resolve a key, computing derived keys from the raw totals.
    pub fn derived(&self, key: &str) -> f64 {
        let matches = self.matches_played as f64;
        let per_match = |total: f64| if matches > 0.0 { total / matches } else { 0.0 };
        match key {
            keys::KD_RATIO => kd_ratio(self.stat(keys::KILLS), self.stat(keys::DEATHS)),
            keys::AVG_KILLS => per_match(self.stat(keys::KILLS)),
            keys::AVG_DAMAGE => per_match(self.stat(keys::DAMAGE)),
            keys::WIN_RATE => per_match(self.stat(keys::WINS)),
            keys::AVG_PLACEMENT => per_match(self.stat(keys::PLACEMENT_TOTAL)),
            other => self.stat(other),
        }
    }

    /// Standard deviation of kills per match, from Σk and Σk².
    pub fn kills_std_dev(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        let n = self.matches_played as f64;
        let mean = self.stat(keys::KILLS) / n;
        let variance = self.stat(keys::KILLS_SQ) / n - mean * mean;
        // rounding can push a zero variance slightly negative
        variance.max(0.0).sqrt()
    }
}

/// Additive deltas one verified match contributes to a player's aggregate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contribution {
    pub deltas: BTreeMap<String, f64>,
}

impl Contribution {
    pub fn add(&mut self, key: &str, value: f64) {
        *self.deltas.entry(key.to_string()).or_insert(0.0) += value;
    }

    pub fn get(&self, key: &str) -> f64 {
        self.deltas.get(key).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod stats_tests;
