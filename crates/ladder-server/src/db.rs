//! SQLite persistence for matches, aggregates and directory facts
//!
//! Uses runtime-checked `sqlx::query` so the crate builds without a live
//! database. Ids are stored as hyphenated UUID text, which sorts the same way
//! as the UUID bytes; timestamps as RFC 3339 text.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use ladder_core::{
    Contribution, Directory, GameConfig, GameId, Match, MatchId, MatchStatus, MatchStore,
    PlayerGameStats, PlayerId, PlayerMatchEntry, Resolution, Review, StatStore, StatValue,
    StoreError, Team, TeamId, Tier, Tournament, TournamentId, TournamentStatus, Transition,
};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits on another connection's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS matches (
        id TEXT PRIMARY KEY,
        tournament_id TEXT NOT NULL,
        team_id TEXT NOT NULL,
        game_id TEXT NOT NULL,
        status TEXT NOT NULL,
        team_placement INTEGER NOT NULL,
        team_kills INTEGER NOT NULL,
        players TEXT NOT NULL,
        evidence_ref TEXT NOT NULL,
        submitted_by TEXT NOT NULL,
        submitted_at TEXT NOT NULL,
        rejection_reason TEXT,
        reviewer_id TEXT,
        reviewed_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_matches_tournament_status ON matches (tournament_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_matches_team ON matches (team_id)",
    "CREATE TABLE IF NOT EXISTS match_players (
        match_id TEXT NOT NULL,
        player_id TEXT NOT NULL,
        PRIMARY KEY (match_id, player_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_match_players_player ON match_players (player_id)",
    "CREATE TABLE IF NOT EXISTS player_game_stats (
        player_id TEXT NOT NULL,
        game_id TEXT NOT NULL,
        matches_played INTEGER NOT NULL DEFAULT 0,
        ranking_score REAL NOT NULL DEFAULT 0,
        tier TEXT NOT NULL DEFAULT 'bronze',
        last_match_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (player_id, game_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_stats_game_score ON player_game_stats (game_id, ranking_score DESC)",
    "CREATE TABLE IF NOT EXISTS player_stat_values (
        player_id TEXT NOT NULL,
        game_id TEXT NOT NULL,
        key TEXT NOT NULL,
        value REAL NOT NULL,
        PRIMARY KEY (player_id, game_id, key)
    )",
    "CREATE TABLE IF NOT EXISTS games (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        stat_schema TEXT NOT NULL,
        ranking_weights TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tournaments (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL,
        status TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS teams (
        id TEXT PRIMARY KEY,
        captain_id TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS team_members (
        team_id TEXT NOT NULL,
        player_id TEXT NOT NULL,
        PRIMARY KEY (team_id, player_id)
    )",
    "CREATE TABLE IF NOT EXISTS players (
        id TEXT PRIMARY KEY,
        display_name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reviewers (
        player_id TEXT PRIMARY KEY
    )",
];

const MATCH_COLUMNS: &str = "id, tournament_id, team_id, game_id, status, team_placement, \
     team_kills, players, evidence_ref, submitted_by, submitted_at, rejection_reason, \
     reviewer_id, reviewed_at";

const STATS_COLUMNS: &str =
    "player_id, game_id, matches_played, ranking_score, tier, last_match_at, created_at, updated_at";

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{what}: {detail}"))
}

fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt("timestamp", e))
}

fn parse_id<T: FromStr>(s: &str) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    s.parse().map_err(|e| corrupt("id", e))
}

fn col<T>(row: &SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(db_err)
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and create tables if needed.
    ///
    /// In-memory databases are per connection, so they get a single-connection
    /// pool. File databases use WAL so readers do not block the writer.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        let (options, pool_options) = if url.contains(":memory:") {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (options, pool)
        } else {
            let options = options.journal_mode(SqliteJournalMode::Wal);
            (options, SqlitePoolOptions::new().max_connections(8))
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(db_err)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }

    // =========================================================================
    // Directory writes (seeding)
    // =========================================================================

    pub async fn upsert_game(&self, game: &GameConfig) -> Result<(), StoreError> {
        let schema = serde_json::to_string(&game.stat_schema).map_err(|e| corrupt("schema", e))?;
        let weights =
            serde_json::to_string(&game.ranking_weights).map_err(|e| corrupt("weights", e))?;
        sqlx::query(
            "INSERT INTO games (id, name, stat_schema, ranking_weights) VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET name = excluded.name,
                stat_schema = excluded.stat_schema, ranking_weights = excluded.ranking_weights",
        )
        .bind(game.id.to_string())
        .bind(&game.name)
        .bind(schema)
        .bind(weights)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    pub async fn upsert_tournament(&self, t: &Tournament) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tournaments (id, game_id, status) VALUES (?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET game_id = excluded.game_id, status = excluded.status",
        )
        .bind(t.id.to_string())
        .bind(t.game_id.to_string())
        .bind(t.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Replace a team and its full roster
    pub async fn upsert_team(&self, team: &Team) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(
            "INSERT INTO teams (id, captain_id) VALUES (?, ?)
             ON CONFLICT (id) DO UPDATE SET captain_id = excluded.captain_id",
        )
        .bind(team.id.to_string())
        .bind(team.captain_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        sqlx::query("DELETE FROM team_members WHERE team_id = ?")
            .bind(team.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        for member in &team.members {
            sqlx::query("INSERT OR IGNORE INTO team_members (team_id, player_id) VALUES (?, ?)")
                .bind(team.id.to_string())
                .bind(member.to_string())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)
    }

    pub async fn upsert_player(&self, id: &PlayerId, display_name: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO players (id, display_name) VALUES (?, ?)
             ON CONFLICT (id) DO UPDATE SET display_name = excluded.display_name",
        )
        .bind(id.to_string())
        .bind(display_name)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    pub async fn add_reviewer(&self, id: &PlayerId) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO reviewers (player_id) VALUES (?)")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // =========================================================================
    // Row mapping
    // =========================================================================

    fn match_from_row(row: &SqliteRow) -> Result<Match, StoreError> {
        let status: String = col(row, "status")?;
        let players: String = col(row, "players")?;
        let players: Vec<PlayerMatchEntry> =
            serde_json::from_str(&players).map_err(|e| corrupt("match players", e))?;
        let placement: i64 = col(row, "team_placement")?;
        let kills: i64 = col(row, "team_kills")?;
        let reviewer: Option<String> = col(row, "reviewer_id")?;
        let reviewed_at: Option<String> = col(row, "reviewed_at")?;
        let review = match (reviewer, reviewed_at) {
            (Some(r), Some(at)) => Some(Review {
                reviewer_id: parse_id(&r)?,
                reviewed_at: parse_ts(&at)?,
            }),
            _ => None,
        };
        Ok(Match {
            id: parse_id(&col::<String>(row, "id")?)?,
            tournament_id: parse_id(&col::<String>(row, "tournament_id")?)?,
            team_id: parse_id(&col::<String>(row, "team_id")?)?,
            game_id: parse_id(&col::<String>(row, "game_id")?)?,
            status: MatchStatus::parse(&status).ok_or_else(|| corrupt("match status", &status))?,
            team_placement: u8::try_from(placement).map_err(|e| corrupt("placement", e))?,
            team_kills: u32::try_from(kills).map_err(|e| corrupt("team kills", e))?,
            players,
            evidence_ref: col(row, "evidence_ref")?,
            submitted_by: parse_id(&col::<String>(row, "submitted_by")?)?,
            submitted_at: parse_ts(&col::<String>(row, "submitted_at")?)?,
            rejection_reason: col(row, "rejection_reason")?,
            review,
        })
    }

    async fn matches_where(&self, sql: &str, binds: &[String]) -> Result<Vec<Match>, StoreError> {
        let mut query = sqlx::query(sql);
        for b in binds {
            query = query.bind(b.as_str());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.iter().map(Self::match_from_row).collect()
    }

    async fn stats_from_row(&self, row: &SqliteRow) -> Result<PlayerGameStats, StoreError> {
        let player_id: String = col(row, "player_id")?;
        let game_id: String = col(row, "game_id")?;
        let tier: String = col(row, "tier")?;
        let matches_played: i64 = col(row, "matches_played")?;
        let last_match_at: Option<String> = col(row, "last_match_at")?;

        let values = sqlx::query(
            "SELECT key, value FROM player_stat_values WHERE player_id = ? AND game_id = ?",
        )
        .bind(&player_id)
        .bind(&game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        let mut stats = BTreeMap::new();
        for v in &values {
            stats.insert(col::<String>(v, "key")?, StatValue::Number(col(v, "value")?));
        }

        Ok(PlayerGameStats {
            player_id: parse_id(&player_id)?,
            game_id: parse_id(&game_id)?,
            stats,
            matches_played: u32::try_from(matches_played)
                .map_err(|e| corrupt("matches played", e))?,
            ranking_score: col(row, "ranking_score")?,
            tier: tier.parse().map_err(|e| corrupt("tier", e))?,
            last_match_at: last_match_at.as_deref().map(parse_ts).transpose()?,
            created_at: parse_ts(&col::<String>(row, "created_at")?)?,
            updated_at: parse_ts(&col::<String>(row, "updated_at")?)?,
        })
    }
}

// =============================================================================
// Port implementations
// =============================================================================

#[async_trait]
impl MatchStore for SqliteStore {
    async fn insert_match(&self, m: &Match) -> Result<(), StoreError> {
        let players = serde_json::to_string(&m.players).map_err(|e| corrupt("match players", e))?;
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(&format!(
            "INSERT INTO matches ({MATCH_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(m.id.to_string())
        .bind(m.tournament_id.to_string())
        .bind(m.team_id.to_string())
        .bind(m.game_id.to_string())
        .bind(m.status.as_str())
        .bind(m.team_placement as i64)
        .bind(m.team_kills as i64)
        .bind(players)
        .bind(&m.evidence_ref)
        .bind(m.submitted_by.to_string())
        .bind(ts(m.submitted_at))
        .bind(m.rejection_reason.as_deref())
        .bind(m.review.as_ref().map(|r| r.reviewer_id.to_string()))
        .bind(m.review.as_ref().map(|r| ts(r.reviewed_at)))
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        for entry in &m.players {
            sqlx::query("INSERT OR IGNORE INTO match_players (match_id, player_id) VALUES (?, ?)")
                .bind(m.id.to_string())
                .bind(entry.player_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)
    }

    async fn get_match(&self, id: &MatchId) -> Result<Option<Match>, StoreError> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(Self::match_from_row).transpose()
    }

    async fn resolve(
        &self,
        id: &MatchId,
        resolution: &Resolution,
        review: Review,
    ) -> Result<Transition, StoreError> {
        let reason = match resolution {
            Resolution::Reject { reason } => reason.as_deref(),
            Resolution::Verify => None,
        };
        let result = sqlx::query(
            "UPDATE matches
             SET status = ?, rejection_reason = ?, reviewer_id = ?, reviewed_at = ?
             WHERE id = ? AND status = 'draft'",
        )
        .bind(resolution.status().as_str())
        .bind(reason)
        .bind(review.reviewer_id.to_string())
        .bind(ts(review.reviewed_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let current = self.get_match(id).await?;
        Ok(match current {
            None => Transition::Missing,
            Some(m) if result.rows_affected() == 1 => Transition::Applied(m),
            Some(m) => Transition::NotDraft(m),
        })
    }

    async fn matches_by_tournament(
        &self,
        tournament: &TournamentId,
        status: Option<MatchStatus>,
    ) -> Result<Vec<Match>, StoreError> {
        match status {
            Some(status) => {
                self.matches_where(
                    &format!(
                        "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = ? AND status = ?
                         ORDER BY submitted_at DESC"
                    ),
                    &[tournament.to_string(), status.as_str().to_string()],
                )
                .await
            }
            None => {
                self.matches_where(
                    &format!(
                        "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = ?
                         ORDER BY submitted_at DESC"
                    ),
                    &[tournament.to_string()],
                )
                .await
            }
        }
    }

    async fn matches_by_team(&self, team: &TeamId) -> Result<Vec<Match>, StoreError> {
        self.matches_where(
            &format!(
                "SELECT {MATCH_COLUMNS} FROM matches WHERE team_id = ? ORDER BY submitted_at DESC"
            ),
            &[team.to_string()],
        )
        .await
    }

    async fn matches_by_player(&self, player: &PlayerId) -> Result<Vec<Match>, StoreError> {
        self.matches_where(
            &format!(
                "SELECT {MATCH_COLUMNS} FROM matches
                 WHERE id IN (SELECT match_id FROM match_players WHERE player_id = ?)
                 ORDER BY submitted_at DESC"
            ),
            &[player.to_string()],
        )
        .await
    }
}

#[async_trait]
impl StatStore for SqliteStore {
    async fn get_or_create(
        &self,
        player: &PlayerId,
        game: &GameId,
    ) -> Result<PlayerGameStats, StoreError> {
        let now = ts(Utc::now());
        sqlx::query(
            "INSERT INTO player_game_stats (player_id, game_id, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (player_id, game_id) DO NOTHING",
        )
        .bind(player.to_string())
        .bind(game.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        self.get_stats(player, game)
            .await?
            .ok_or_else(|| corrupt("aggregate", "vanished after insert"))
    }

    async fn get_stats(
        &self,
        player: &PlayerId,
        game: &GameId,
    ) -> Result<Option<PlayerGameStats>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {STATS_COLUMNS} FROM player_game_stats WHERE player_id = ? AND game_id = ?"
        ))
        .bind(player.to_string())
        .bind(game.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        match row {
            Some(row) => Ok(Some(self.stats_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn increment(
        &self,
        player: &PlayerId,
        game: &GameId,
        contribution: &Contribution,
        played_at: DateTime<Utc>,
    ) -> Result<PlayerGameStats, StoreError> {
        let now = ts(Utc::now());
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(
            "INSERT INTO player_game_stats
                (player_id, game_id, matches_played, last_match_at, created_at, updated_at)
             VALUES (?, ?, 1, ?, ?, ?)
             ON CONFLICT (player_id, game_id) DO UPDATE SET
                matches_played = matches_played + 1,
                last_match_at = excluded.last_match_at,
                updated_at = excluded.updated_at",
        )
        .bind(player.to_string())
        .bind(game.to_string())
        .bind(ts(played_at))
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        for (key, delta) in &contribution.deltas {
            sqlx::query(
                "INSERT INTO player_stat_values (player_id, game_id, key, value) VALUES (?, ?, ?, ?)
                 ON CONFLICT (player_id, game_id, key) DO UPDATE SET value = value + excluded.value",
            )
            .bind(player.to_string())
            .bind(game.to_string())
            .bind(key)
            .bind(*delta)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;

        self.get_stats(player, game)
            .await?
            .ok_or_else(|| corrupt("aggregate", "vanished after increment"))
    }

    async fn set_ranking(
        &self,
        player: &PlayerId,
        game: &GameId,
        score: f64,
        tier: Tier,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE player_game_stats SET ranking_score = ?, tier = ?, updated_at = ?
             WHERE player_id = ? AND game_id = ?",
        )
        .bind(score)
        .bind(tier.as_str())
        .bind(ts(Utc::now()))
        .bind(player.to_string())
        .bind(game.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(corrupt(
                "aggregate",
                format!("no row for player {player} in game {game}"),
            ));
        }
        Ok(())
    }

    async fn ranked(
        &self,
        game: &GameId,
        tier: Option<Tier>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PlayerGameStats>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = match tier {
            Some(tier) => {
                sqlx::query(&format!(
                    "SELECT {STATS_COLUMNS} FROM player_game_stats WHERE game_id = ? AND tier = ?
                     ORDER BY ranking_score DESC, player_id ASC LIMIT ? OFFSET ?"
                ))
                .bind(game.to_string())
                .bind(tier.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {STATS_COLUMNS} FROM player_game_stats WHERE game_id = ?
                     ORDER BY ranking_score DESC, player_id ASC LIMIT ? OFFSET ?"
                ))
                .bind(game.to_string())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(self.stats_from_row(row).await?);
        }
        Ok(out)
    }

    async fn count(&self, game: &GameId, tier: Option<Tier>) -> Result<u64, StoreError> {
        let n: i64 = match tier {
            Some(tier) => sqlx::query_scalar(
                "SELECT COUNT(*) FROM player_game_stats WHERE game_id = ? AND tier = ?",
            )
            .bind(game.to_string())
            .bind(tier.as_str())
            .fetch_one(&self.pool)
            .await,
            None => sqlx::query_scalar("SELECT COUNT(*) FROM player_game_stats WHERE game_id = ?")
                .bind(game.to_string())
                .fetch_one(&self.pool)
                .await,
        }
        .map_err(db_err)?;
        Ok(n.max(0) as u64)
    }

    async fn count_above(&self, game: &GameId, score: f64) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM player_game_stats WHERE game_id = ? AND ranking_score > ?",
        )
        .bind(game.to_string())
        .bind(score)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(n.max(0) as u64)
    }

    async fn tier_counts(&self, game: &GameId) -> Result<BTreeMap<Tier, u64>, StoreError> {
        let rows = sqlx::query(
            "SELECT tier, COUNT(*) AS n FROM player_game_stats WHERE game_id = ? GROUP BY tier",
        )
        .bind(game.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        let mut counts: BTreeMap<Tier, u64> = Tier::ALL.iter().map(|t| (*t, 0)).collect();
        for row in &rows {
            let tier: String = col(row, "tier")?;
            let n: i64 = col(row, "n")?;
            let tier: Tier = tier.parse().map_err(|e| corrupt("tier", e))?;
            counts.insert(tier, n.max(0) as u64);
        }
        Ok(counts)
    }
}

#[async_trait]
impl Directory for SqliteStore {
    async fn tournament(&self, id: &TournamentId) -> Result<Option<Tournament>, StoreError> {
        let row = sqlx::query("SELECT id, game_id, status FROM tournaments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let status: String = col(&row, "status")?;
        Ok(Some(Tournament {
            id: *id,
            game_id: parse_id(&col::<String>(&row, "game_id")?)?,
            status: TournamentStatus::parse(&status)
                .ok_or_else(|| corrupt("tournament status", &status))?,
        }))
    }

    async fn team(&self, id: &TeamId) -> Result<Option<Team>, StoreError> {
        let captain: Option<String> = sqlx::query_scalar("SELECT captain_id FROM teams WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some(captain) = captain else {
            return Ok(None);
        };
        let members: Vec<String> = sqlx::query_scalar(
            "SELECT player_id FROM team_members WHERE team_id = ? ORDER BY player_id",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(Some(Team {
            id: *id,
            captain_id: parse_id(&captain)?,
            members: members
                .iter()
                .map(|m| parse_id(m))
                .collect::<Result<_, _>>()?,
        }))
    }

    async fn game(&self, id: &GameId) -> Result<Option<GameConfig>, StoreError> {
        let row = sqlx::query("SELECT name, stat_schema, ranking_weights FROM games WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let schema: String = col(&row, "stat_schema")?;
        let weights: String = col(&row, "ranking_weights")?;
        Ok(Some(GameConfig {
            id: *id,
            name: col(&row, "name")?,
            stat_schema: serde_json::from_str(&schema).map_err(|e| corrupt("stat schema", e))?,
            ranking_weights: serde_json::from_str(&weights)
                .map_err(|e| corrupt("ranking weights", e))?,
        }))
    }

    async fn display_name(&self, player: &PlayerId) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar("SELECT display_name FROM players WHERE id = ?")
            .bind(player.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn is_reviewer(&self, user: &PlayerId) -> Result<bool, StoreError> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT player_id FROM reviewers WHERE player_id = ?")
                .bind(user.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod db_tests;
