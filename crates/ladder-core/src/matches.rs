//! Match reports and their review state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{GameId, MatchId, PlayerId, TeamId, TournamentId};
use crate::stats::{keys, Contribution, StatMap, StatValue};

/// Placement bounds for a team in a single match
pub const MIN_PLACEMENT: i32 = 1;
pub const MAX_PLACEMENT: i32 = 100;

/// Review state of a submitted report.
///
/// `Draft` is the only state with outgoing transitions; both resolutions are
/// terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Draft,
    Verified,
    Rejected,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Draft => "draft",
            MatchStatus::Verified => "verified",
            MatchStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(MatchStatus::Draft),
            "verified" => Some(MatchStatus::Verified),
            "rejected" => Some(MatchStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, MatchStatus::Draft)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One player's line in a match report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchEntry {
    pub player_id: PlayerId,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub damage: f64,
    /// Game-specific extras, checked against the game's stat schema
    #[serde(default)]
    pub custom_stats: StatMap,
}

impl PlayerMatchEntry {
    pub fn new(player_id: PlayerId, kills: u32, deaths: u32) -> Self {
        Self {
            player_id,
            kills,
            deaths,
            assists: 0,
            damage: 0.0,
            custom_stats: StatMap::new(),
        }
    }

    /// Deltas this line adds to the player's aggregate. Text custom stats stay
    /// on the match and are not aggregated.
    pub fn contribution(&self, team_placement: u8) -> Contribution {
        let mut c = Contribution::default();
        let kills = self.kills as f64;
        c.add(keys::KILLS, kills);
        c.add(keys::DEATHS, self.deaths as f64);
        c.add(keys::ASSISTS, self.assists as f64);
        c.add(keys::DAMAGE, self.damage);
        c.add(keys::KILLS_SQ, kills * kills);
        c.add(keys::WINS, if team_placement == 1 { 1.0 } else { 0.0 });
        c.add(keys::PLACEMENT_TOTAL, team_placement as f64);
        for (key, value) in &self.custom_stats {
            if let StatValue::Number(n) = value {
                c.add(key, *n);
            }
        }
        c
    }
}

/// Who resolved a match and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer_id: PlayerId,
    pub reviewed_at: DateTime<Utc>,
}

/// A submitted match report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub game_id: GameId,
    pub status: MatchStatus,
    pub team_placement: u8,
    pub team_kills: u32,
    pub players: Vec<PlayerMatchEntry>,
    pub evidence_ref: String,
    pub submitted_by: PlayerId,
    pub submitted_at: DateTime<Utc>,
    pub rejection_reason: Option<String>,
    pub review: Option<Review>,
}

impl Match {
    pub fn involves(&self, player: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.player_id == player)
    }
}

/// Target state of a check-and-set transition out of draft
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Verify,
    Reject { reason: Option<String> },
}

impl Resolution {
    pub fn status(&self) -> MatchStatus {
        match self {
            Resolution::Verify => MatchStatus::Verified,
            Resolution::Reject { .. } => MatchStatus::Rejected,
        }
    }

    /// Apply to a draft match. Callers must have checked the draft state
    /// under the store's check-and-set.
    pub fn apply(&self, m: &mut Match, review: Review) {
        m.status = self.status();
        if let Resolution::Reject { reason } = self {
            m.rejection_reason = reason.clone();
        }
        m.review = Some(review);
    }
}

/// Incoming report as sent by a team captain. Numeric fields are signed so
/// out-of-range values reach validation instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitMatch {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub game_id: GameId,
    pub placement: i32,
    pub kills: i64,
    pub players: Vec<PlayerMatchEntry>,
    pub evidence_ref: String,
}

#[cfg(test)]
#[path = "matches_tests.rs"]
mod matches_tests;
