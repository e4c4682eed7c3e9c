use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use ladder_core::{
    Match, MatchId, MatchStatus, PlayerId, ResolveOutcome, SubmitMatch, TeamId, TournamentId,
};
use serde::Deserialize;

use super::{ApiError, ApiResult, Caller, JsonBody, PathParams, QueryParams};
use crate::AppState;

#[derive(Deserialize)]
pub struct ResolveRequest {
    pub approve: bool,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

pub async fn submit_match(
    State(state): State<AppState>,
    Caller(submitter): Caller,
    JsonBody(req): JsonBody<SubmitMatch>,
) -> ApiResult<(StatusCode, Json<Match>)> {
    let m = state.matches.submit_match(req, submitter).await?;
    Ok((StatusCode::CREATED, Json(m)))
}

pub async fn resolve_match(
    State(state): State<AppState>,
    Caller(reviewer): Caller,
    PathParams(id): PathParams<MatchId>,
    JsonBody(req): JsonBody<ResolveRequest>,
) -> ApiResult<Json<ResolveOutcome>> {
    let outcome = state
        .matches
        .resolve_match(&id, reviewer, req.approve, req.reason.as_deref())
        .await?;
    Ok(Json(outcome))
}

pub async fn get_match(
    State(state): State<AppState>,
    PathParams(id): PathParams<MatchId>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.matches.get_match(&id).await?))
}

pub async fn tournament_matches(
    State(state): State<AppState>,
    PathParams(id): PathParams<TournamentId>,
    QueryParams(filter): QueryParams<StatusFilter>,
) -> ApiResult<Json<Vec<Match>>> {
    let status = match filter.status.as_deref() {
        None | Some("") => None,
        Some(s) => Some(
            MatchStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown match status '{s}'")))?,
        ),
    };
    Ok(Json(state.matches.matches_for_tournament(&id, status).await?))
}

pub async fn team_matches(
    State(state): State<AppState>,
    PathParams(id): PathParams<TeamId>,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(state.matches.matches_for_team(&id).await?))
}

pub async fn player_matches(
    State(state): State<AppState>,
    PathParams(id): PathParams<PlayerId>,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(state.matches.matches_for_player(&id).await?))
}
