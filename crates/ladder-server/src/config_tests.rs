use super::*;

#[test]
fn test_defaults() {
    let config = ServerConfig::default();
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.leaderboard.default_limit, 25);
    assert_eq!(config.leaderboard.max_limit, 100);
    assert!(config.registry().unwrap().is_empty());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = ServerConfig::from_toml(
        r#"
        bind_addr = "0.0.0.0:9000"

        [leaderboard]
        max_limit = 50
        "#,
    )
    .unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:9000");
    assert_eq!(config.database_url, "sqlite://ladder.db");
    assert_eq!(config.leaderboard.max_limit, 50);
    assert_eq!(config.leaderboard.default_limit, 25);
}

#[test]
fn test_missing_file_is_default() {
    let config = ServerConfig::from_file(Path::new("/nonexistent/ladder.toml")).unwrap();
    assert_eq!(config.log_filter, "info");
}

#[test]
fn test_limit_clamping() {
    let limits = LeaderboardLimits {
        default_limit: 25,
        max_limit: 100,
    };
    assert_eq!(limits.clamp(None), 25);
    assert_eq!(limits.clamp(Some(0)), 1);
    assert_eq!(limits.clamp(Some(-5)), 1);
    assert_eq!(limits.clamp(Some(40)), 40);
    assert_eq!(limits.clamp(Some(5000)), 100);
}

#[test]
fn test_strategies_from_toml() {
    let game = GameId::new();
    let config = ServerConfig::from_toml(&format!(
        r#"
        [[strategies]]
        games = ["{game}"]
        damage_scale = 150.0

        [strategies.weights]
        kd_ratio = 0.25
        avg_kills = 0.25
        avg_damage = 0.25
        consistency = 0.25
        "#
    ))
    .unwrap();
    let registry = config.registry().unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.select(&game).name(), "performance-blend");
    assert_eq!(registry.select(&GameId::new()).name(), "weighted-sum");
}

#[test]
fn test_strategy_weights_validated() {
    let config = ServerConfig::from_toml(&format!(
        r#"
        [[strategies]]
        games = ["{}"]

        [strategies.weights]
        kd_ratio = 0.9
        avg_kills = 0.9
        avg_damage = 0.0
        consistency = 0.0
        "#,
        GameId::new()
    ))
    .unwrap();
    assert!(matches!(
        config.registry(),
        Err(ConfigError::Strategy { .. })
    ));
}
