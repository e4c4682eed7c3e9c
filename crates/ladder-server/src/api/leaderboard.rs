use axum::extract::{Json, State};
use ladder_core::{GameId, LeaderboardPage, PlayerId, PlayerRank, Tier, TierDistribution};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiResult, Caller, PathParams, QueryParams};
use crate::AppState;

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub tier: Option<String>,
}

/// One page of the leaderboard, restricted to a tier when `tier` is given
pub async fn get_leaderboard(
    State(state): State<AppState>,
    PathParams(game): PathParams<GameId>,
    QueryParams(params): QueryParams<LeaderboardParams>,
) -> ApiResult<Json<LeaderboardPage>> {
    let limit = state.limits.clamp(params.limit);
    let offset = params.offset.unwrap_or(0).max(0) as usize;

    let page = match params.tier.as_deref() {
        None | Some("") => {
            state
                .leaderboard
                .get_leaderboard(&game, limit, offset)
                .await?
        }
        Some(t) => {
            let tier: Tier = t
                .parse()
                .map_err(|e: ladder_core::UnknownTier| ApiError::BadRequest(e.to_string()))?;
            state
                .leaderboard
                .get_leaderboard_by_tier(&game, tier, limit, offset)
                .await?
        }
    };
    Ok(Json(page))
}

pub async fn get_player_rank(
    State(state): State<AppState>,
    PathParams((game, player)): PathParams<(GameId, PlayerId)>,
) -> ApiResult<Json<PlayerRank>> {
    Ok(Json(state.leaderboard.get_player_rank(&player, &game).await?))
}

pub async fn get_tier_distribution(
    State(state): State<AppState>,
    PathParams(game): PathParams<GameId>,
) -> ApiResult<Json<TierDistribution>> {
    Ok(Json(state.leaderboard.get_tier_distribution(&game).await?))
}

pub async fn rescore_game(
    State(state): State<AppState>,
    Caller(reviewer): Caller,
    PathParams(game): PathParams<GameId>,
) -> ApiResult<Json<serde_json::Value>> {
    let rescored = state.matches.rescore_game(&game, reviewer).await?;
    Ok(Json(json!({ "game_id": game, "rescored": rescored })))
}
