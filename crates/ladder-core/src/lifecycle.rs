//! Match lifecycle: submission, review, and the aggregate updates a
//! verification drives.
//!
//! ```text
//! draft --verify--> verified
//!   \----reject---> rejected
//! ```
//!
//! Verification moves the match out of draft first (check-and-set in the
//! store) and only then touches aggregates, so two concurrent verifications of
//! the same match can never both apply stats. Aggregates are then updated
//! independently per player. A failure for one player does not undo the
//! others or the status change; it is returned in
//! [`VerificationOutcome::failures`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::directory::{Directory, GameConfig};
use crate::error::{LadderError, Result};
use crate::ids::{GameId, MatchId, PlayerId, TeamId, TournamentId};
use crate::leaderboard::percentile;
use crate::matches::{
    Match, MatchStatus, PlayerMatchEntry, Resolution, Review, SubmitMatch, MAX_PLACEMENT,
    MIN_PLACEMENT,
};
use crate::ranking::StrategyRegistry;
use crate::stats::keys;
use crate::store::{MatchStore, StatStore, Transition};
use crate::tier::Tier;

/// One player whose aggregate could not be updated during verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateFailure {
    pub player_id: PlayerId,
    pub error: String,
}

/// Result of a verification: the verified match plus per-player outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    #[serde(rename = "match")]
    pub verified: Match,
    pub updated: Vec<PlayerId>,
    pub failures: Vec<AggregateFailure>,
}

impl VerificationOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of [`MatchService::resolve_match`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ResolveOutcome {
    Verified(VerificationOutcome),
    Rejected {
        #[serde(rename = "match")]
        rejected: Match,
    },
}

impl ResolveOutcome {
    pub fn matched(&self) -> &Match {
        match self {
            ResolveOutcome::Verified(o) => &o.verified,
            ResolveOutcome::Rejected { rejected } => rejected,
        }
    }
}

pub struct MatchService {
    matches: Arc<dyn MatchStore>,
    stats: Arc<dyn StatStore>,
    directory: Arc<dyn Directory>,
    registry: Arc<StrategyRegistry>,
}

impl MatchService {
    pub fn new(
        matches: Arc<dyn MatchStore>,
        stats: Arc<dyn StatStore>,
        directory: Arc<dyn Directory>,
        registry: Arc<StrategyRegistry>,
    ) -> Self {
        Self {
            matches,
            stats,
            directory,
            registry,
        }
    }

    /// Validate a captain's report and store it as a draft.
    ///
    /// Nothing is written unless every check passes.
    pub async fn submit_match(&self, req: SubmitMatch, submitter: PlayerId) -> Result<Match> {
        let tournament = self
            .directory
            .tournament(&req.tournament_id)
            .await?
            .ok_or(LadderError::TournamentNotFound(req.tournament_id))?;
        if tournament.status != crate::directory::TournamentStatus::Active {
            return Err(LadderError::TournamentNotActive(tournament.id));
        }
        if tournament.game_id != req.game_id {
            return Err(LadderError::GameMismatch {
                expected: tournament.game_id,
                actual: req.game_id,
            });
        }

        let team = self
            .directory
            .team(&req.team_id)
            .await?
            .ok_or(LadderError::TeamNotFound(req.team_id))?;
        if team.captain_id != submitter {
            return Err(LadderError::NotCaptain(submitter));
        }

        if !(MIN_PLACEMENT..=MAX_PLACEMENT).contains(&req.placement) {
            return Err(LadderError::InvalidPlacement(req.placement));
        }
        if req.kills < 0 {
            return Err(LadderError::InvalidKills(req.kills));
        }
        let team_kills =
            u32::try_from(req.kills).map_err(|_| LadderError::InvalidKills(req.kills))?;
        if req.evidence_ref.trim().is_empty() {
            return Err(LadderError::MissingEvidence);
        }

        let game = self.game(&req.game_id).await?;
        for entry in &req.players {
            validate_entry(entry, &game)?;
        }

        for entry in &req.players {
            if !team.has_member(&entry.player_id) {
                return Err(LadderError::PlayerNotInTeam(entry.player_id));
            }
        }
        let roster: HashSet<&PlayerId> = team.members.iter().collect();
        let submitted: HashSet<&PlayerId> = req.players.iter().map(|p| &p.player_id).collect();
        if req.players.len() != roster.len() || submitted.len() != roster.len() {
            return Err(LadderError::TeamSizeMismatch {
                expected: roster.len(),
                actual: submitted.len(),
            });
        }

        let m = Match {
            id: MatchId::new(),
            tournament_id: req.tournament_id,
            team_id: req.team_id,
            game_id: req.game_id,
            status: MatchStatus::Draft,
            // range checked above
            team_placement: req.placement as u8,
            team_kills,
            players: req.players,
            evidence_ref: req.evidence_ref,
            submitted_by: submitter,
            submitted_at: Utc::now(),
            rejection_reason: None,
            review: None,
        };
        self.matches.insert_match(&m).await?;

        info!(
            match_id = %m.id,
            team_id = %m.team_id,
            game_id = %m.game_id,
            players = m.players.len(),
            "match submitted"
        );
        Ok(m)
    }

    /// Approve a draft match and fold its stats into every player's aggregate.
    pub async fn verify_match(
        &self,
        id: &MatchId,
        reviewer: PlayerId,
    ) -> Result<VerificationOutcome> {
        self.ensure_reviewer(&reviewer).await?;
        let verified = self.transition(id, &Resolution::Verify, reviewer).await?;
        info!(match_id = %verified.id, reviewer = %reviewer, "match verified");

        // The game config is needed for rescoring. If it cannot be read, no
        // player can be updated; report every player as failed.
        let game = match self.game(&verified.game_id).await {
            Ok(game) => game,
            Err(e) => {
                warn!(match_id = %verified.id, error = %e, "cannot load game for rescoring");
                let failures = verified
                    .players
                    .iter()
                    .map(|p| AggregateFailure {
                        player_id: p.player_id,
                        error: e.to_string(),
                    })
                    .collect();
                return Ok(VerificationOutcome {
                    verified,
                    updated: Vec::new(),
                    failures,
                });
            }
        };

        let mut updated = Vec::with_capacity(verified.players.len());
        let mut failures = Vec::new();
        for entry in &verified.players {
            match self.apply_entry(&verified, entry, &game).await {
                Ok(()) => updated.push(entry.player_id),
                Err(e) => {
                    warn!(
                        match_id = %verified.id,
                        player_id = %entry.player_id,
                        error = %e,
                        "aggregate update failed; match stays verified"
                    );
                    failures.push(AggregateFailure {
                        player_id: entry.player_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(VerificationOutcome {
            verified,
            updated,
            failures,
        })
    }

    /// Reject a draft match. Aggregates are untouched. A blank reason is
    /// stored as no reason.
    pub async fn reject_match(
        &self,
        id: &MatchId,
        reviewer: PlayerId,
        reason: Option<&str>,
    ) -> Result<Match> {
        self.ensure_reviewer(&reviewer).await?;
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let rejected = self
            .transition(id, &Resolution::Reject { reason }, reviewer)
            .await?;
        info!(
            match_id = %rejected.id,
            reviewer = %reviewer,
            reason = rejected.rejection_reason.as_deref().unwrap_or(""),
            "match rejected"
        );
        Ok(rejected)
    }

    /// Single review entry point: approve verifies, otherwise reject.
    pub async fn resolve_match(
        &self,
        id: &MatchId,
        reviewer: PlayerId,
        approve: bool,
        reason: Option<&str>,
    ) -> Result<ResolveOutcome> {
        if approve {
            Ok(ResolveOutcome::Verified(self.verify_match(id, reviewer).await?))
        } else {
            let rejected = self.reject_match(id, reviewer, reason).await?;
            Ok(ResolveOutcome::Rejected { rejected })
        }
    }

    pub async fn get_match(&self, id: &MatchId) -> Result<Match> {
        self.matches
            .get_match(id)
            .await?
            .ok_or(LadderError::MatchNotFound(*id))
    }

    pub async fn matches_for_tournament(
        &self,
        tournament: &TournamentId,
        status: Option<MatchStatus>,
    ) -> Result<Vec<Match>> {
        Ok(self.matches.matches_by_tournament(tournament, status).await?)
    }

    pub async fn matches_for_team(&self, team: &TeamId) -> Result<Vec<Match>> {
        Ok(self.matches.matches_by_team(team).await?)
    }

    pub async fn matches_for_player(&self, player: &PlayerId) -> Result<Vec<Match>> {
        Ok(self.matches.matches_by_player(player).await?)
    }

    /// Recompute every score in a game with the current weights, then
    /// reassign every tier from the new standings. Returns the number of
    /// aggregates rewritten.
    pub async fn rescore_game(&self, game_id: &GameId, reviewer: PlayerId) -> Result<usize> {
        self.ensure_reviewer(&reviewer).await?;
        let game = self.game(game_id).await?;
        let total = self.stats.count(game_id, None).await?;
        let all = self.stats.ranked(game_id, None, total as usize, 0).await?;

        let mut rescored: Vec<(PlayerId, f64)> = all
            .iter()
            .map(|agg| (agg.player_id, self.registry.score(agg, &game)))
            .collect();
        rescored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        // competition ranking, matching get_player_rank
        let n = rescored.len() as u64;
        let mut rank = 0;
        let mut prev: Option<f64> = None;
        for (i, (player, score)) in rescored.iter().enumerate() {
            if prev != Some(*score) {
                rank = i as u64 + 1;
                prev = Some(*score);
            }
            let tier = Tier::classify(percentile(rank, n));
            self.stats.set_ranking(player, game_id, *score, tier).await?;
        }

        info!(game_id = %game_id, players = rescored.len(), "game rescored");
        Ok(rescored.len())
    }

    async fn ensure_reviewer(&self, user: &PlayerId) -> Result<()> {
        if self.directory.is_reviewer(user).await? {
            Ok(())
        } else {
            Err(LadderError::NotReviewer(*user))
        }
    }

    async fn game(&self, id: &GameId) -> Result<GameConfig> {
        self.directory
            .game(id)
            .await?
            .ok_or(LadderError::GameNotFound(*id))
    }

    async fn transition(
        &self,
        id: &MatchId,
        resolution: &Resolution,
        reviewer: PlayerId,
    ) -> Result<Match> {
        let review = Review {
            reviewer_id: reviewer,
            reviewed_at: Utc::now(),
        };
        match self.matches.resolve(id, resolution, review).await? {
            Transition::Applied(m) => Ok(m),
            Transition::NotDraft(m) => Err(LadderError::MatchNotDraft {
                id: m.id,
                status: m.status,
            }),
            Transition::Missing => Err(LadderError::MatchNotFound(*id)),
        }
    }

    /// Increment, rescore, retier one player's aggregate.
    async fn apply_entry(&self, m: &Match, entry: &PlayerMatchEntry, game: &GameConfig) -> Result<()> {
        let player = &entry.player_id;
        let played_at = m
            .review
            .as_ref()
            .map(|r| r.reviewed_at)
            .unwrap_or(m.submitted_at);
        let agg = self
            .stats
            .increment(player, &m.game_id, &entry.contribution(m.team_placement), played_at)
            .await?;

        let score = self.registry.score(&agg, game);
        // the player's own row still has its old score, so rank against the
        // new one explicitly
        let above = self.stats.count_above(&m.game_id, score).await?;
        let above = if agg.ranking_score > score { above.saturating_sub(1) } else { above };
        let total = self.stats.count(&m.game_id, None).await?;
        let tier = Tier::classify(percentile(above + 1, total));

        self.stats.set_ranking(player, &m.game_id, score, tier).await?;
        debug!(
            player_id = %player,
            game_id = %m.game_id,
            score,
            tier = %tier,
            matches_played = agg.matches_played,
            "aggregate rescored"
        );
        Ok(())
    }
}

/// Per-entry checks that do not depend on the roster
fn validate_entry(entry: &PlayerMatchEntry, game: &GameConfig) -> Result<()> {
    let invalid = |key: &str, reason: String| LadderError::InvalidPlayerStat {
        player_id: entry.player_id,
        key: key.to_string(),
        reason,
    };
    if !entry.damage.is_finite() || entry.damage < 0.0 {
        return Err(invalid(keys::DAMAGE, "must be a non-negative number".to_string()));
    }
    for (key, value) in &entry.custom_stats {
        if keys::RESERVED.contains(&key.as_str()) {
            return Err(invalid(key, "reserved stat name".to_string()));
        }
        if let Some(field) = game.stat_schema.get(key) {
            if let Some(reason) = field.violation(value) {
                return Err(invalid(key, reason));
            }
        } else if value.as_number().is_some_and(|n| !n.is_finite()) {
            return Err(invalid(key, "must be finite".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
