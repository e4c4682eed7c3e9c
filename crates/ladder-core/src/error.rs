//! Error taxonomy for the ranking pipeline

use crate::ids::{GameId, MatchId, PlayerId, TeamId, TournamentId};
use crate::matches::MatchStatus;

/// Failure inside a storage backend. Only `Unavailable` is worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Coarse classification callers use to pick a response class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    Validation,
    State,
    NotFound,
    Infrastructure,
}

#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    // authorization
    #[error("player {0} is not the team captain")]
    NotCaptain(PlayerId),

    #[error("user {0} is not allowed to review matches")]
    NotReviewer(PlayerId),

    // validation
    #[error("placement {0} is outside 1..=100")]
    InvalidPlacement(i32),

    #[error("team kills {0} must not be negative")]
    InvalidKills(i64),

    #[error("player {0} is not on the team roster")]
    PlayerNotInTeam(PlayerId),

    #[error("expected stats for {expected} roster members, got {actual}")]
    TeamSizeMismatch { expected: usize, actual: usize },

    #[error("invalid stat {key} for player {player_id}: {reason}")]
    InvalidPlayerStat {
        player_id: PlayerId,
        key: String,
        reason: String,
    },

    #[error("evidence reference is required")]
    MissingEvidence,

    #[error("tournament is played in game {expected}, not {actual}")]
    GameMismatch { expected: GameId, actual: GameId },

    // state
    #[error("tournament {0} is not active")]
    TournamentNotActive(TournamentId),

    #[error("match {id} is {status}, not draft")]
    MatchNotDraft { id: MatchId, status: MatchStatus },

    // not found
    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    #[error("no stats for player {player_id} in game {game_id}")]
    StatsNotFound { player_id: PlayerId, game_id: GameId },

    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("team {0} not found")]
    TeamNotFound(TeamId),

    #[error("game {0} not found")]
    GameNotFound(GameId),

    // infrastructure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LadderError {
    pub fn kind(&self) -> ErrorKind {
        use LadderError::*;
        match self {
            NotCaptain(_) | NotReviewer(_) => ErrorKind::Authorization,
            InvalidPlacement(_)
            | InvalidKills(_)
            | PlayerNotInTeam(_)
            | TeamSizeMismatch { .. }
            | InvalidPlayerStat { .. }
            | MissingEvidence
            | GameMismatch { .. } => ErrorKind::Validation,
            TournamentNotActive(_) | MatchNotDraft { .. } => ErrorKind::State,
            MatchNotFound(_)
            | StatsNotFound { .. }
            | TournamentNotFound(_)
            | TeamNotFound(_)
            | GameNotFound(_) => ErrorKind::NotFound,
            Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// Only an unavailable store is worth retrying unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, LadderError::Store(StoreError::Unavailable(_)))
    }

    /// Stable machine-readable code for transports
    pub fn code(&self) -> &'static str {
        use LadderError::*;
        match self {
            NotCaptain(_) => "not_captain",
            NotReviewer(_) => "not_reviewer",
            InvalidPlacement(_) => "invalid_placement",
            InvalidKills(_) => "invalid_kills",
            PlayerNotInTeam(_) => "player_not_in_team",
            TeamSizeMismatch { .. } => "team_size_mismatch",
            InvalidPlayerStat { .. } => "invalid_player_stat",
            MissingEvidence => "missing_evidence",
            GameMismatch { .. } => "game_mismatch",
            TournamentNotActive(_) => "tournament_not_active",
            MatchNotDraft { .. } => "match_not_draft",
            MatchNotFound(_) => "match_not_found",
            StatsNotFound { .. } => "stats_not_found",
            TournamentNotFound(_) => "tournament_not_found",
            TeamNotFound(_) => "team_not_found",
            GameNotFound(_) => "game_not_found",
            Store(_) => "store_unavailable",
        }
    }
}

pub type Result<T, E = LadderError> = std::result::Result<T, E>;
