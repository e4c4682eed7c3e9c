use super::*;
use ladder_core::{Directory, StatKind, TournamentStatus};

const GAME: &str = "0b9f2c1e-4a64-4c8e-9d2a-1f3e5a7b9c01";
const TOURNAMENT: &str = "7d1e6a52-2c3b-4f7a-8e1d-5b9c0a2f4e11";
const TEAM: &str = "c4a8e2f0-9b1d-4e6c-a3f5-7d2b8e0c1a21";
const CAPTAIN: &str = "1a2b3c4d-5e6f-4a8b-9c0d-1e2f3a4b5c31";
const MATE: &str = "9f8e7d6c-5b4a-4c2d-8e0f-a1b2c3d4e541";
const REVIEWER: &str = "2e4f6a8c-0b1d-4f3e-9a5c-7b9d1f3e5a51";

fn seed_toml(weights: &str) -> String {
    format!(
        r#"
reviewers = ["{REVIEWER}"]

[[games]]
id = "{GAME}"
name = "Apex Legends"
ranking_weights = {weights}

[games.stat_schema.revives]
kind = "number"
min = 0.0
max = 50.0

[[tournaments]]
id = "{TOURNAMENT}"
game_id = "{GAME}"
status = "active"

[[teams]]
id = "{TEAM}"
captain_id = "{CAPTAIN}"
members = ["{CAPTAIN}", "{MATE}"]

[[players]]
id = "{CAPTAIN}"
display_name = "Wraith"
"#
    )
}

fn valid_seed() -> Seed {
    toml::from_str(&seed_toml("{ kd_ratio = 0.5, avg_kills = 0.3, win_rate = 0.2 }")).unwrap()
}

#[test]
fn test_parses_all_sections() {
    let seed = valid_seed();
    assert_eq!(seed.games.len(), 1);
    assert_eq!(seed.games[0].name, "Apex Legends");
    assert_eq!(seed.games[0].stat_schema["revives"].kind, StatKind::Number);
    assert_eq!(seed.games[0].stat_schema["revives"].max, Some(50.0));
    assert_eq!(seed.tournaments[0].status, TournamentStatus::Active);
    assert_eq!(seed.teams[0].members.len(), 2);
    assert_eq!(seed.players[0].display_name, "Wraith");
    assert_eq!(seed.reviewers, vec![REVIEWER.parse::<PlayerId>().unwrap()]);
    seed.validate().unwrap();
}

#[test]
fn test_empty_seed_is_valid() {
    let seed: Seed = toml::from_str("").unwrap();
    assert!(seed.games.is_empty());
    seed.validate().unwrap();
}

#[test]
fn test_rejects_weights_not_summing_to_one() {
    let seed: Seed = toml::from_str(&seed_toml("{ kd_ratio = 0.5, avg_kills = 0.3 }")).unwrap();
    assert!(matches!(seed.validate(), Err(SeedError::Weights { .. })));
}

#[test]
fn test_rejects_captain_off_roster() {
    let mut seed = valid_seed();
    let captain = seed.teams[0].captain_id;
    seed.teams[0].members.retain(|m| *m != captain);
    assert!(matches!(
        seed.validate(),
        Err(SeedError::CaptainNotMember { .. })
    ));
}

#[test]
fn test_missing_file_is_an_error() {
    let err = Seed::from_file(Path::new("/nonexistent/ladder-seed.toml")).unwrap_err();
    assert!(matches!(err, SeedError::Io { .. }));
}

#[tokio::test]
async fn test_apply_memory_populates_directory() {
    let store = MemoryStore::new();
    valid_seed().apply_memory(&store).unwrap();

    let team = store.team(&TEAM.parse().unwrap()).await.unwrap().unwrap();
    assert!(team.has_member(&MATE.parse().unwrap()));
    assert!(store.is_reviewer(&REVIEWER.parse().unwrap()).await.unwrap());
    assert_eq!(
        store
            .display_name(&CAPTAIN.parse().unwrap())
            .await
            .unwrap()
            .as_deref(),
        Some("Wraith")
    );
}

#[tokio::test]
async fn test_apply_sqlite_populates_directory() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    let seed = valid_seed();
    seed.apply_sqlite(&store).await.unwrap();
    // reapplying is idempotent
    seed.apply_sqlite(&store).await.unwrap();

    let game = store.game(&GAME.parse().unwrap()).await.unwrap().unwrap();
    assert_eq!(game, seed.games[0]);
    let tournament = store
        .tournament(&TOURNAMENT.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tournament.game_id, game.id);
    assert!(store.is_reviewer(&REVIEWER.parse().unwrap()).await.unwrap());
}
