//! Read-only leaderboard projections over the stat store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::directory::Directory;
use crate::error::{LadderError, Result};
use crate::ids::{GameId, PlayerId};
use crate::stats::{PlayerGameStats, StatMap};
use crate::store::StatStore;
use crate::tier::Tier;

/// Percentile of a rank within a population of `total`, in 0..=100.
///
/// Defined as 0 for an empty population.
pub fn percentile(rank: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total_f = total as f64;
    let p = (total_f - rank as f64 + 1.0) / total_f * 100.0;
    p.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u64,
    pub player_id: PlayerId,
    pub display_name: String,
    pub ranking_score: f64,
    pub tier: Tier,
    pub matches_played: u32,
    pub stats: StatMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
    /// Population size, independent of the page
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRank {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub rank: u64,
    pub ranking_score: f64,
    pub tier: Tier,
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub counts: BTreeMap<Tier, u64>,
    pub total: u64,
}

pub struct LeaderboardService {
    stats: Arc<dyn StatStore>,
    directory: Arc<dyn Directory>,
}

impl LeaderboardService {
    pub fn new(stats: Arc<dyn StatStore>, directory: Arc<dyn Directory>) -> Self {
        Self { stats, directory }
    }

    /// Ranked page for a game. Limit and offset are used as given.
    pub async fn get_leaderboard(
        &self,
        game: &GameId,
        limit: usize,
        offset: usize,
    ) -> Result<LeaderboardPage> {
        let rows = self.stats.ranked(game, None, limit, offset).await?;
        let total = self.stats.count(game, None).await?;
        let entries = self.entries(rows, offset as u64).await?;
        Ok(LeaderboardPage { entries, total })
    }

    /// Ranked page within a single tier. Ranks are positions within the tier.
    pub async fn get_leaderboard_by_tier(
        &self,
        game: &GameId,
        tier: Tier,
        limit: usize,
        offset: usize,
    ) -> Result<LeaderboardPage> {
        let rows = self.stats.ranked(game, Some(tier), limit, offset).await?;
        let total = self.stats.count(game, Some(tier)).await?;
        let entries = self.entries(rows, offset as u64).await?;
        Ok(LeaderboardPage { entries, total })
    }

    /// Competition rank: players with equal scores share a rank.
    pub async fn get_player_rank(&self, player: &PlayerId, game: &GameId) -> Result<PlayerRank> {
        let stats = self
            .stats
            .get_stats(player, game)
            .await?
            .ok_or(LadderError::StatsNotFound {
                player_id: *player,
                game_id: *game,
            })?;
        let rank = self.stats.count_above(game, stats.ranking_score).await? + 1;
        let total = self.stats.count(game, None).await?;
        Ok(PlayerRank {
            player_id: *player,
            game_id: *game,
            rank,
            ranking_score: stats.ranking_score,
            tier: stats.tier,
            percentile: percentile(rank, total),
        })
    }

    pub async fn get_tier_distribution(&self, game: &GameId) -> Result<TierDistribution> {
        let counts = self.stats.tier_counts(game).await?;
        let total = counts.values().sum();
        Ok(TierDistribution { counts, total })
    }

    async fn entries(
        &self,
        rows: Vec<PlayerGameStats>,
        offset: u64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut entries = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            let display_name = self
                .directory
                .display_name(&row.player_id)
                .await?
                .unwrap_or_else(|| row.player_id.to_string());
            entries.push(LeaderboardEntry {
                rank: offset + i as u64 + 1,
                player_id: row.player_id,
                display_name,
                ranking_score: row.ranking_score,
                tier: row.tier,
                matches_played: row.matches_played,
                stats: row.stats,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "leaderboard_tests.rs"]
mod leaderboard_tests;
