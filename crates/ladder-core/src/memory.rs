//! In-process store backing all three ports.
//!
//! Each map sits behind its own lock and every primitive does its work inside
//! a single lock scope, which is what makes `resolve` a check-and-set and
//! `increment` an add-in-place. Used by tests and by the server when no
//! database is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::directory::{Directory, GameConfig, Team, Tournament};
use crate::error::StoreError;
use crate::ids::{GameId, MatchId, PlayerId, TeamId, TournamentId};
use crate::matches::{Match, MatchStatus, Resolution, Review};
use crate::stats::{Contribution, PlayerGameStats, StatValue};
use crate::store::{leaderboard_order, MatchStore, StatStore, Transition};
use crate::tier::Tier;

#[derive(Default)]
struct Facts {
    games: HashMap<GameId, GameConfig>,
    tournaments: HashMap<TournamentId, Tournament>,
    teams: HashMap<TeamId, Team>,
    names: HashMap<PlayerId, String>,
    reviewers: HashSet<PlayerId>,
}

#[derive(Default)]
pub struct MemoryStore {
    matches: Mutex<Vec<Match>>,
    stats: Mutex<HashMap<(PlayerId, GameId), PlayerGameStats>>,
    facts: Mutex<Facts>,
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    m.lock()
        .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Directory seeding

    pub fn add_game(&self, game: GameConfig) {
        if let Ok(mut f) = self.facts.lock() {
            f.games.insert(game.id, game);
        }
    }

    pub fn add_tournament(&self, tournament: Tournament) {
        if let Ok(mut f) = self.facts.lock() {
            f.tournaments.insert(tournament.id, tournament);
        }
    }

    pub fn add_team(&self, team: Team) {
        if let Ok(mut f) = self.facts.lock() {
            f.teams.insert(team.id, team);
        }
    }

    pub fn add_player(&self, id: PlayerId, display_name: &str) {
        if let Ok(mut f) = self.facts.lock() {
            f.names.insert(id, display_name.to_string());
        }
    }

    pub fn add_reviewer(&self, id: PlayerId) {
        if let Ok(mut f) = self.facts.lock() {
            f.reviewers.insert(id);
        }
    }

    /// Write an aggregate directly, bypassing verification. For fixtures.
    pub fn put_stats(&self, stats: PlayerGameStats) {
        if let Ok(mut s) = self.stats.lock() {
            s.insert((stats.player_id, stats.game_id), stats);
        }
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn tournament(&self, id: &TournamentId) -> Result<Option<Tournament>, StoreError> {
        Ok(lock(&self.facts)?.tournaments.get(id).cloned())
    }

    async fn team(&self, id: &TeamId) -> Result<Option<Team>, StoreError> {
        Ok(lock(&self.facts)?.teams.get(id).cloned())
    }

    async fn game(&self, id: &GameId) -> Result<Option<GameConfig>, StoreError> {
        Ok(lock(&self.facts)?.games.get(id).cloned())
    }

    async fn display_name(&self, player: &PlayerId) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.facts)?.names.get(player).cloned())
    }

    async fn is_reviewer(&self, user: &PlayerId) -> Result<bool, StoreError> {
        Ok(lock(&self.facts)?.reviewers.contains(user))
    }
}

fn newest_first(mut v: Vec<Match>) -> Vec<Match> {
    v.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    v
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn insert_match(&self, m: &Match) -> Result<(), StoreError> {
        lock(&self.matches)?.push(m.clone());
        Ok(())
    }

    async fn get_match(&self, id: &MatchId) -> Result<Option<Match>, StoreError> {
        Ok(lock(&self.matches)?.iter().find(|m| &m.id == id).cloned())
    }

    async fn resolve(
        &self,
        id: &MatchId,
        resolution: &Resolution,
        review: Review,
    ) -> Result<Transition, StoreError> {
        let mut matches = lock(&self.matches)?;
        let Some(m) = matches.iter_mut().find(|m| &m.id == id) else {
            return Ok(Transition::Missing);
        };
        if m.status != MatchStatus::Draft {
            return Ok(Transition::NotDraft(m.clone()));
        }
        resolution.apply(m, review);
        Ok(Transition::Applied(m.clone()))
    }

    async fn matches_by_tournament(
        &self,
        tournament: &TournamentId,
        status: Option<MatchStatus>,
    ) -> Result<Vec<Match>, StoreError> {
        let found = lock(&self.matches)?
            .iter()
            .filter(|m| &m.tournament_id == tournament)
            .filter(|m| status.is_none_or(|s| m.status == s))
            .cloned()
            .collect();
        Ok(newest_first(found))
    }

    async fn matches_by_team(&self, team: &TeamId) -> Result<Vec<Match>, StoreError> {
        let found = lock(&self.matches)?
            .iter()
            .filter(|m| &m.team_id == team)
            .cloned()
            .collect();
        Ok(newest_first(found))
    }

    async fn matches_by_player(&self, player: &PlayerId) -> Result<Vec<Match>, StoreError> {
        let found = lock(&self.matches)?
            .iter()
            .filter(|m| m.involves(player))
            .cloned()
            .collect();
        Ok(newest_first(found))
    }
}

#[async_trait]
impl StatStore for MemoryStore {
    async fn get_or_create(
        &self,
        player: &PlayerId,
        game: &GameId,
    ) -> Result<PlayerGameStats, StoreError> {
        let mut stats = lock(&self.stats)?;
        let agg = stats
            .entry((*player, *game))
            .or_insert_with(|| PlayerGameStats::new(*player, *game, Utc::now()));
        Ok(agg.clone())
    }

    async fn get_stats(
        &self,
        player: &PlayerId,
        game: &GameId,
    ) -> Result<Option<PlayerGameStats>, StoreError> {
        Ok(lock(&self.stats)?.get(&(*player, *game)).cloned())
    }

    async fn increment(
        &self,
        player: &PlayerId,
        game: &GameId,
        contribution: &Contribution,
        played_at: DateTime<Utc>,
    ) -> Result<PlayerGameStats, StoreError> {
        let mut stats = lock(&self.stats)?;
        let agg = stats
            .entry((*player, *game))
            .or_insert_with(|| PlayerGameStats::new(*player, *game, Utc::now()));
        for (key, delta) in &contribution.deltas {
            let current = agg.stat(key);
            agg.stats
                .insert(key.clone(), StatValue::Number(current + delta));
        }
        agg.matches_played += 1;
        agg.last_match_at = Some(played_at);
        agg.updated_at = Utc::now();
        Ok(agg.clone())
    }

    async fn set_ranking(
        &self,
        player: &PlayerId,
        game: &GameId,
        score: f64,
        tier: Tier,
    ) -> Result<(), StoreError> {
        let mut stats = lock(&self.stats)?;
        match stats.get_mut(&(*player, *game)) {
            Some(agg) => {
                agg.ranking_score = score;
                agg.tier = tier;
                agg.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StoreError::Corrupt(format!(
                "no aggregate for player {player} in game {game}"
            ))),
        }
    }

    async fn ranked(
        &self,
        game: &GameId,
        tier: Option<Tier>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PlayerGameStats>, StoreError> {
        let mut rows: Vec<PlayerGameStats> = lock(&self.stats)?
            .values()
            .filter(|s| &s.game_id == game)
            .filter(|s| tier.is_none_or(|t| s.tier == t))
            .cloned()
            .collect();
        rows.sort_by(leaderboard_order);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, game: &GameId, tier: Option<Tier>) -> Result<u64, StoreError> {
        let n = lock(&self.stats)?
            .values()
            .filter(|s| &s.game_id == game)
            .filter(|s| tier.is_none_or(|t| s.tier == t))
            .count();
        Ok(n as u64)
    }

    async fn count_above(&self, game: &GameId, score: f64) -> Result<u64, StoreError> {
        let n = lock(&self.stats)?
            .values()
            .filter(|s| &s.game_id == game && s.ranking_score > score)
            .count();
        Ok(n as u64)
    }

    async fn tier_counts(&self, game: &GameId) -> Result<BTreeMap<Tier, u64>, StoreError> {
        let mut counts: BTreeMap<Tier, u64> = Tier::ALL.iter().map(|t| (*t, 0)).collect();
        for s in lock(&self.stats)?.values().filter(|s| &s.game_id == game) {
            *counts.entry(s.tier).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
