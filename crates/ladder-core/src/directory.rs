//! Facts owned by other services: games, tournaments, teams, players.
//!
//! The pipeline only reads these. The [`Directory`] trait is the seam; the
//! server backs it with SQLite tables populated from a seed file, tests back it
//! with [`crate::MemoryStore`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::ids::{GameId, PlayerId, TeamId, TournamentId};
use crate::stats::StatValue;

/// Allowed deviation of a weight set's sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Kind of value a stat key holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Number,
    Text,
}

/// Schema entry for one stat key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatField {
    pub kind: StatKind,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl StatField {
    pub fn number() -> Self {
        Self {
            kind: StatKind::Number,
            min: None,
            max: None,
        }
    }

    pub fn bounded(min: f64, max: f64) -> Self {
        Self {
            kind: StatKind::Number,
            min: Some(min),
            max: Some(max),
        }
    }

    /// Describe why `value` does not satisfy this field, if it doesn't.
    pub fn violation(&self, value: &StatValue) -> Option<String> {
        match (self.kind, value) {
            (StatKind::Text, StatValue::Text(_)) => None,
            (StatKind::Text, StatValue::Number(_)) => Some("expected text".to_string()),
            (StatKind::Number, StatValue::Text(_)) => Some("expected a number".to_string()),
            (StatKind::Number, StatValue::Number(n)) => {
                if !n.is_finite() {
                    return Some("must be finite".to_string());
                }
                if let Some(min) = self.min {
                    if *n < min {
                        return Some(format!("below minimum {min}"));
                    }
                }
                if let Some(max) = self.max {
                    if *n > max {
                        return Some(format!("above maximum {max}"));
                    }
                }
                None
            }
        }
    }
}

/// Weight set whose sum is outside 1.0 ± [`WEIGHT_SUM_TOLERANCE`], or which
/// contains a negative or non-finite weight
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid ranking weights: {0}")]
pub struct InvalidWeights(pub String);

/// Check a weight set sums to 1.0 within tolerance.
pub fn validate_weight_sum<'a>(weights: impl IntoIterator<Item = &'a f64>) -> Result<(), InvalidWeights> {
    let mut sum = 0.0;
    for &w in weights {
        if !w.is_finite() || w < 0.0 {
            return Err(InvalidWeights(format!("weight {w} must be a non-negative number")));
        }
        sum += w;
    }
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(InvalidWeights(format!(
            "weights sum to {sum:.4}, expected 1.0 ± {WEIGHT_SUM_TOLERANCE}"
        )));
    }
    Ok(())
}

/// Game configuration: which stats exist and how they are weighted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub id: GameId,
    pub name: String,
    #[serde(default)]
    pub stat_schema: BTreeMap<String, StatField>,
    #[serde(default)]
    pub ranking_weights: BTreeMap<String, f64>,
}

impl GameConfig {
    pub fn validate_weights(&self) -> Result<(), InvalidWeights> {
        validate_weight_sum(self.ranking_weights.values())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Draft,
    Registration,
    Active,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Registration => "registration",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(TournamentStatus::Draft),
            "registration" => Some(TournamentStatus::Registration),
            "active" => Some(TournamentStatus::Active),
            "completed" => Some(TournamentStatus::Completed),
            "cancelled" => Some(TournamentStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub game_id: GameId,
    pub status: TournamentStatus,
}

/// Team roster at the moment of lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub captain_id: PlayerId,
    pub members: Vec<PlayerId>,
}

impl Team {
    pub fn has_member(&self, player: &PlayerId) -> bool {
        self.members.contains(player)
    }
}

/// Read-only lookups into services this pipeline does not own
#[async_trait]
pub trait Directory: Send + Sync {
    async fn tournament(&self, id: &TournamentId) -> Result<Option<Tournament>, StoreError>;

    async fn team(&self, id: &TeamId) -> Result<Option<Team>, StoreError>;

    async fn game(&self, id: &GameId) -> Result<Option<GameConfig>, StoreError>;

    /// Public name shown on leaderboards
    async fn display_name(&self, player: &PlayerId) -> Result<Option<String>, StoreError>;

    /// Whether the user may verify or reject match reports
    async fn is_reviewer(&self, user: &PlayerId) -> Result<bool, StoreError>;
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod directory_tests;
