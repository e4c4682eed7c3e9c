//! Directory seed file
//!
//! Games, tournaments, teams, display names and reviewers are owned by other
//! services. For standalone runs they are loaded from a TOML file:
//!
//! ```toml
//! reviewers = ["6f0c..."]
//!
//! [[games]]
//! id = "..."
//! name = "Apex Legends"
//! ranking_weights = { kd_ratio = 0.5, avg_kills = 0.3, win_rate = 0.2 }
//!
//! [[tournaments]]
//! id = "..."
//! game_id = "..."
//! status = "active"
//!
//! [[teams]]
//! id = "..."
//! captain_id = "..."
//! members = ["...", "..."]
//!
//! [[players]]
//! id = "..."
//! display_name = "Wraith"
//! ```

use ladder_core::{
    GameConfig, GameId, InvalidWeights, MemoryStore, PlayerId, StoreError, Team, Tournament,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("game {game}: {source}")]
    Weights { game: GameId, source: InvalidWeights },

    #[error("team {team}: captain {captain} is not on the roster")]
    CaptainNotMember { team: ladder_core::TeamId, captain: PlayerId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub games: Vec<GameConfig>,
    pub tournaments: Vec<Tournament>,
    pub teams: Vec<Team>,
    pub players: Vec<PlayerSeed>,
    pub reviewers: Vec<PlayerId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSeed {
    pub id: PlayerId,
    pub display_name: String,
}

impl Seed {
    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject game weights that do not sum to 1 and captains missing from
    /// their own roster.
    pub fn validate(&self) -> Result<(), SeedError> {
        for game in &self.games {
            game.validate_weights()
                .map_err(|source| SeedError::Weights {
                    game: game.id,
                    source,
                })?;
        }
        for team in &self.teams {
            if !team.has_member(&team.captain_id) {
                return Err(SeedError::CaptainNotMember {
                    team: team.id,
                    captain: team.captain_id,
                });
            }
        }
        Ok(())
    }

    pub fn apply_memory(&self, store: &MemoryStore) -> Result<(), SeedError> {
        self.validate()?;
        for game in &self.games {
            store.add_game(game.clone());
        }
        for t in &self.tournaments {
            store.add_tournament(t.clone());
        }
        for team in &self.teams {
            store.add_team(team.clone());
        }
        for p in &self.players {
            store.add_player(p.id, &p.display_name);
        }
        for r in &self.reviewers {
            store.add_reviewer(*r);
        }
        self.log_applied("memory");
        Ok(())
    }

    pub async fn apply_sqlite(&self, store: &SqliteStore) -> Result<(), SeedError> {
        self.validate()?;
        for game in &self.games {
            store.upsert_game(game).await?;
        }
        for t in &self.tournaments {
            store.upsert_tournament(t).await?;
        }
        for team in &self.teams {
            store.upsert_team(team).await?;
        }
        for p in &self.players {
            store.upsert_player(&p.id, &p.display_name).await?;
        }
        for r in &self.reviewers {
            store.add_reviewer(r).await?;
        }
        self.log_applied("sqlite");
        Ok(())
    }

    fn log_applied(&self, backend: &str) {
        info!(
            backend,
            games = self.games.len(),
            tournaments = self.tournaments.len(),
            teams = self.teams.len(),
            players = self.players.len(),
            reviewers = self.reviewers.len(),
            "directory seeded"
        );
    }
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod seed_tests;
