//! Storage ports for matches and per-player aggregates.
//!
//! Backends must provide the primitives the pipeline relies on for
//! consistency under concurrent requests:
//! - [`MatchStore::resolve`] is a check-and-set on `(id, status = draft)`
//! - [`StatStore::increment`] adds in place, never read-modify-write in the
//!   caller
//! - [`StatStore::set_ranking`] is a plain replace; last write wins

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::ids::{GameId, MatchId, PlayerId, TeamId, TournamentId};
use crate::matches::{Match, MatchStatus, Resolution, Review};
use crate::stats::{Contribution, PlayerGameStats};
use crate::tier::Tier;

/// Outcome of a check-and-set transition
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The match was draft and now carries the new status
    Applied(Match),
    /// The match had already left draft; nothing was written
    NotDraft(Match),
    Missing,
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn insert_match(&self, m: &Match) -> Result<(), StoreError>;

    async fn get_match(&self, id: &MatchId) -> Result<Option<Match>, StoreError>;

    /// Move a draft match to the resolution's status, atomically with the
    /// draft check.
    async fn resolve(
        &self,
        id: &MatchId,
        resolution: &Resolution,
        review: Review,
    ) -> Result<Transition, StoreError>;

    /// Newest first
    async fn matches_by_tournament(
        &self,
        tournament: &TournamentId,
        status: Option<MatchStatus>,
    ) -> Result<Vec<Match>, StoreError>;

    async fn matches_by_team(&self, team: &TeamId) -> Result<Vec<Match>, StoreError>;

    async fn matches_by_player(&self, player: &PlayerId) -> Result<Vec<Match>, StoreError>;
}

#[async_trait]
pub trait StatStore: Send + Sync {
    async fn get_or_create(
        &self,
        player: &PlayerId,
        game: &GameId,
    ) -> Result<PlayerGameStats, StoreError>;

    async fn get_stats(
        &self,
        player: &PlayerId,
        game: &GameId,
    ) -> Result<Option<PlayerGameStats>, StoreError>;

    /// Atomically add the contribution to the aggregate, bump
    /// `matches_played` by one and stamp `last_match_at`. Returns the
    /// aggregate as it stands after the increment.
    async fn increment(
        &self,
        player: &PlayerId,
        game: &GameId,
        contribution: &Contribution,
        played_at: DateTime<Utc>,
    ) -> Result<PlayerGameStats, StoreError>;

    async fn set_ranking(
        &self,
        player: &PlayerId,
        game: &GameId,
        score: f64,
        tier: Tier,
    ) -> Result<(), StoreError>;

    /// Aggregates for a game ordered by score descending, then player id
    /// ascending, optionally restricted to one tier.
    async fn ranked(
        &self,
        game: &GameId,
        tier: Option<Tier>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PlayerGameStats>, StoreError>;

    async fn count(&self, game: &GameId, tier: Option<Tier>) -> Result<u64, StoreError>;

    /// Number of aggregates in the game with a strictly greater score
    async fn count_above(&self, game: &GameId, score: f64) -> Result<u64, StoreError>;

    async fn tier_counts(&self, game: &GameId) -> Result<BTreeMap<Tier, u64>, StoreError>;
}

/// Total order used by every leaderboard: score descending, ties by player id.
pub fn leaderboard_order(a: &PlayerGameStats, b: &PlayerGameStats) -> std::cmp::Ordering {
    b.ranking_score
        .total_cmp(&a.ranking_score)
        .then_with(|| a.player_id.cmp(&b.player_id))
}
