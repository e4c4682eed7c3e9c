use super::*;
use crate::stats::StatValue;
use chrono::Utc;
use std::collections::BTreeMap;

fn game(weights: &[(&str, f64)]) -> GameConfig {
    GameConfig {
        id: GameId::new(),
        name: "Arena Shooter".to_string(),
        stat_schema: BTreeMap::new(),
        ranking_weights: weights.iter().map(|(k, w)| (k.to_string(), *w)).collect(),
    }
}

fn aggregate(game: &GameConfig, stats: &[(&str, f64)], matches_played: u32) -> PlayerGameStats {
    let mut agg = PlayerGameStats::new(crate::ids::PlayerId::new(), game.id, Utc::now());
    for (k, v) in stats {
        agg.stats.insert(k.to_string(), StatValue::Number(*v));
    }
    agg.matches_played = matches_played;
    agg
}

struct Constant(GameId, f64);

impl RankingStrategy for Constant {
    fn calculate(&self, _stats: &PlayerGameStats, _game: &GameConfig) -> f64 {
        self.1
    }
    fn supports_game(&self, game: &GameId) -> bool {
        &self.0 == game
    }
    fn name(&self) -> &str {
        "constant"
    }
}

#[test]
fn test_weighted_sum_uses_game_weights() {
    let g = game(&[(keys::KILLS, 0.5), (keys::ASSISTS, 0.5)]);
    let agg = aggregate(&g, &[(keys::KILLS, 10.0), (keys::ASSISTS, 4.0)], 2);
    assert_eq!(WeightedSumStrategy.calculate(&agg, &g), 7.0);
}

#[test]
fn test_weighted_sum_missing_keys_are_zero() {
    let g = game(&[("headshots", 1.0)]);
    let agg = aggregate(&g, &[(keys::KILLS, 10.0)], 1);
    assert_eq!(WeightedSumStrategy.calculate(&agg, &g), 0.0);
}

#[test]
fn test_weighted_sum_kd_zero_deaths() {
    let g = game(&[(keys::KD_RATIO, 1.0)]);
    let flawless = aggregate(&g, &[(keys::KILLS, 8.0), (keys::DEATHS, 0.0)], 1);
    assert_eq!(WeightedSumStrategy.calculate(&flawless, &g), 8.0);

    let traded = aggregate(&g, &[(keys::KILLS, 8.0), (keys::DEATHS, 4.0)], 1);
    assert_eq!(WeightedSumStrategy.calculate(&traded, &g), 2.0);
}

#[test]
fn test_blend_rejects_bad_weights() {
    let bad = BlendWeights {
        kd_ratio: 0.5,
        avg_kills: 0.5,
        avg_damage: 0.5,
        consistency: 0.0,
    };
    assert!(PerformanceBlendStrategy::new(vec![], bad).is_err());
    assert!(PerformanceBlendStrategy::new(vec![], BlendWeights::default()).is_ok());
}

#[test]
fn test_blend_score() {
    let g = game(&[]);
    let strategy = PerformanceBlendStrategy::new(vec![g.id], BlendWeights::default()).unwrap();
    // two matches: 6 and 6 kills, 3 deaths total, 400 damage total
    let agg = aggregate(
        &g,
        &[
            (keys::KILLS, 12.0),
            (keys::KILLS_SQ, 72.0),
            (keys::DEATHS, 3.0),
            (keys::DAMAGE, 400.0),
        ],
        2,
    );
    // 0.4*4 + 0.3*6 + 0.2*(200/100) + 0.1*1
    let expected = 1.6 + 1.8 + 0.4 + 0.1;
    assert!((strategy.calculate(&agg, &g) - expected).abs() < 1e-9);
}

#[test]
fn test_consistency_drops_with_variance() {
    let g = game(&[]);
    let steady = aggregate(&g, &[(keys::KILLS, 10.0), (keys::KILLS_SQ, 50.0)], 2);
    let swingy = aggregate(&g, &[(keys::KILLS, 10.0), (keys::KILLS_SQ, 100.0)], 2);
    assert_eq!(PerformanceBlendStrategy::consistency(&steady), 1.0);
    assert!(PerformanceBlendStrategy::consistency(&swingy) < 1.0);
}

#[test]
fn test_registry_falls_back_to_default() {
    let g = game(&[(keys::KILLS, 1.0)]);
    let registry = StrategyRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.select(&g.id).name(), "weighted-sum");

    let agg = aggregate(&g, &[(keys::KILLS, 3.0)], 1);
    assert_eq!(registry.score(&agg, &g), 3.0);
}

#[test]
fn test_registry_first_match_wins() {
    let g = game(&[]);
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(Constant(GameId::new(), 1.0)));
    registry.register(Box::new(Constant(g.id, 2.0)));
    registry.register(Box::new(Constant(g.id, 3.0)));
    assert_eq!(registry.len(), 3);

    let agg = aggregate(&g, &[], 0);
    assert_eq!(registry.score(&agg, &g), 2.0);
}

#[test]
fn test_registry_replaces_non_finite_scores() {
    let g = game(&[]);
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(Constant(g.id, f64::NAN)));
    let agg = aggregate(&g, &[], 0);
    assert_eq!(registry.score(&agg, &g), 0.0);
}
