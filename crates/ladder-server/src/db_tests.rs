use super::*;
use ladder_core::{Contribution, StatField};

async fn store() -> SqliteStore {
    SqliteStore::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}

fn draft(team: TeamId, game: GameId, tournament: TournamentId, players: &[PlayerId]) -> Match {
    Match {
        id: MatchId::new(),
        tournament_id: tournament,
        team_id: team,
        game_id: game,
        status: MatchStatus::Draft,
        team_placement: 2,
        team_kills: 5,
        players: players
            .iter()
            .map(|p| PlayerMatchEntry::new(*p, 3, 1))
            .collect(),
        evidence_ref: "https://clips.example/1".to_string(),
        submitted_by: players[0],
        submitted_at: Utc::now(),
        rejection_reason: None,
        review: None,
    }
}

fn review(reviewer: PlayerId) -> Review {
    Review {
        reviewer_id: reviewer,
        reviewed_at: Utc::now(),
    }
}

// =============================================================================
// Matches
// =============================================================================

#[tokio::test]
async fn test_match_round_trips_through_table() {
    let db = store().await;
    let players = [PlayerId::new(), PlayerId::new()];
    let m = draft(TeamId::new(), GameId::new(), TournamentId::new(), &players);
    db.insert_match(&m).await.unwrap();

    let loaded = db.get_match(&m.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, m.id);
    assert_eq!(loaded.status, MatchStatus::Draft);
    assert_eq!(loaded.players, m.players);
    assert_eq!(loaded.submitted_at, m.submitted_at);
    assert!(db.get_match(&MatchId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_resolve_only_applies_once() {
    let db = store().await;
    let players = [PlayerId::new()];
    let m = draft(TeamId::new(), GameId::new(), TournamentId::new(), &players);
    db.insert_match(&m).await.unwrap();
    let reviewer = PlayerId::new();

    let first = db
        .resolve(&m.id, &Resolution::Verify, review(reviewer))
        .await
        .unwrap();
    match first {
        Transition::Applied(v) => {
            assert_eq!(v.status, MatchStatus::Verified);
            assert_eq!(v.review.unwrap().reviewer_id, reviewer);
        }
        other => panic!("expected Applied, got {other:?}"),
    }

    let second = db
        .resolve(
            &m.id,
            &Resolution::Reject {
                reason: Some("late".to_string()),
            },
            review(reviewer),
        )
        .await
        .unwrap();
    match second {
        Transition::NotDraft(current) => {
            assert_eq!(current.status, MatchStatus::Verified);
            assert!(current.rejection_reason.is_none());
        }
        other => panic!("expected NotDraft, got {other:?}"),
    }

    let missing = db
        .resolve(&MatchId::new(), &Resolution::Verify, review(reviewer))
        .await
        .unwrap();
    assert_eq!(missing, Transition::Missing);
}

#[tokio::test]
async fn test_match_listings_filter_and_order() {
    let db = store().await;
    let tournament = TournamentId::new();
    let team = TeamId::new();
    let game = GameId::new();
    let alice = PlayerId::new();
    let bob = PlayerId::new();

    let mut older = draft(team, game, tournament, &[alice]);
    older.submitted_at = Utc::now() - chrono::Duration::minutes(5);
    let newer = draft(team, game, tournament, &[alice, bob]);
    db.insert_match(&older).await.unwrap();
    db.insert_match(&newer).await.unwrap();
    db.resolve(&older.id, &Resolution::Verify, review(PlayerId::new()))
        .await
        .unwrap();

    let all = db.matches_by_tournament(&tournament, None).await.unwrap();
    assert_eq!(
        all.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![newer.id, older.id]
    );

    let verified = db
        .matches_by_tournament(&tournament, Some(MatchStatus::Verified))
        .await
        .unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].id, older.id);

    assert_eq!(db.matches_by_team(&team).await.unwrap().len(), 2);
    assert_eq!(db.matches_by_player(&alice).await.unwrap().len(), 2);
    let bobs = db.matches_by_player(&bob).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].id, newer.id);
}

// =============================================================================
// Aggregates
// =============================================================================

#[tokio::test]
async fn test_increment_adds_in_place() {
    let db = store().await;
    let player = PlayerId::new();
    let game = GameId::new();

    let fresh = db.get_or_create(&player, &game).await.unwrap();
    assert_eq!(fresh.matches_played, 0);
    assert_eq!(fresh.tier, Tier::Bronze);

    let mut c = Contribution::default();
    c.add("kills", 4.0);
    c.add("deaths", 2.0);
    db.increment(&player, &game, &c, Utc::now()).await.unwrap();
    let after = db.increment(&player, &game, &c, Utc::now()).await.unwrap();

    assert_eq!(after.matches_played, 2);
    assert_eq!(after.stat("kills"), 8.0);
    assert_eq!(after.stat("deaths"), 4.0);
    assert!(after.last_match_at.is_some());
}

#[tokio::test]
async fn test_increment_creates_missing_aggregate() {
    let db = store().await;
    let player = PlayerId::new();
    let game = GameId::new();
    let mut c = Contribution::default();
    c.add("kills", 1.0);

    let agg = db.increment(&player, &game, &c, Utc::now()).await.unwrap();
    assert_eq!(agg.matches_played, 1);
    assert_eq!(agg.stat("kills"), 1.0);
}

#[tokio::test]
async fn test_ranked_orders_by_score_then_player() {
    let db = store().await;
    let game = GameId::new();
    let mut ids: Vec<PlayerId> = (0..4).map(|_| PlayerId::new()).collect();
    ids.sort();
    let scores = [(ids[3], 10.0, Tier::Platinum), (ids[1], 5.0, Tier::Silver)];
    for (p, score, tier) in scores {
        db.get_or_create(&p, &game).await.unwrap();
        db.set_ranking(&p, &game, score, tier).await.unwrap();
    }
    // two players tied at 0
    db.get_or_create(&ids[2], &game).await.unwrap();
    db.get_or_create(&ids[0], &game).await.unwrap();

    let ranked = db.ranked(&game, None, 10, 0).await.unwrap();
    let order: Vec<PlayerId> = ranked.iter().map(|s| s.player_id).collect();
    assert_eq!(order, vec![ids[3], ids[1], ids[0], ids[2]]);

    let page = db.ranked(&game, None, 2, 1).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].player_id, ids[1]);

    let silver = db.ranked(&game, Some(Tier::Silver), 10, 0).await.unwrap();
    assert_eq!(silver.len(), 1);
    assert_eq!(db.count(&game, None).await.unwrap(), 4);
    assert_eq!(db.count(&game, Some(Tier::Bronze)).await.unwrap(), 2);
    assert_eq!(db.count_above(&game, 5.0).await.unwrap(), 1);
    assert_eq!(db.count_above(&game, 0.0).await.unwrap(), 2);

    let tiers = db.tier_counts(&game).await.unwrap();
    assert_eq!(tiers.len(), 4);
    assert_eq!(tiers[&Tier::Bronze], 2);
    assert_eq!(tiers[&Tier::Gold], 0);
}

#[tokio::test]
async fn test_set_ranking_requires_aggregate() {
    let db = store().await;
    let err = db
        .set_ranking(&PlayerId::new(), &GameId::new(), 1.0, Tier::Gold)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

// =============================================================================
// Directory
// =============================================================================

#[tokio::test]
async fn test_directory_upserts_are_readable() {
    let db = store().await;
    let game = GameConfig {
        id: GameId::new(),
        name: "Apex".to_string(),
        stat_schema: [("revives".to_string(), StatField::bounded(0.0, 50.0))]
            .into_iter()
            .collect(),
        ranking_weights: [("kd_ratio".to_string(), 0.6), ("avg_kills".to_string(), 0.4)]
            .into_iter()
            .collect(),
    };
    db.upsert_game(&game).await.unwrap();
    assert_eq!(db.game(&game.id).await.unwrap(), Some(game.clone()));

    let tournament = Tournament {
        id: TournamentId::new(),
        game_id: game.id,
        status: TournamentStatus::Registration,
    };
    db.upsert_tournament(&tournament).await.unwrap();
    let activated = Tournament {
        status: TournamentStatus::Active,
        ..tournament.clone()
    };
    db.upsert_tournament(&activated).await.unwrap();
    assert_eq!(db.tournament(&tournament.id).await.unwrap(), Some(activated));

    let captain = PlayerId::new();
    let mate = PlayerId::new();
    let team = Team {
        id: TeamId::new(),
        captain_id: captain,
        members: vec![captain, mate],
    };
    db.upsert_team(&team).await.unwrap();
    let loaded = db.team(&team.id).await.unwrap().unwrap();
    assert_eq!(loaded.captain_id, captain);
    assert!(loaded.has_member(&mate));
    assert_eq!(loaded.members.len(), 2);

    // roster replacement drops old members
    db.upsert_team(&Team {
        members: vec![captain],
        ..team.clone()
    })
    .await
    .unwrap();
    assert!(!db.team(&team.id).await.unwrap().unwrap().has_member(&mate));

    db.upsert_player(&captain, "Wraith").await.unwrap();
    assert_eq!(
        db.display_name(&captain).await.unwrap().as_deref(),
        Some("Wraith")
    );
    assert!(db.display_name(&mate).await.unwrap().is_none());

    assert!(!db.is_reviewer(&mate).await.unwrap());
    db.add_reviewer(&mate).await.unwrap();
    db.add_reviewer(&mate).await.unwrap();
    assert!(db.is_reviewer(&mate).await.unwrap());

    assert!(db.team(&TeamId::new()).await.unwrap().is_none());
    assert!(db.tournament(&TournamentId::new()).await.unwrap().is_none());
    assert!(db.game(&GameId::new()).await.unwrap().is_none());
}
