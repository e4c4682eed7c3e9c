// HTTP API: match submission and review, leaderboards

mod leaderboard;
mod matches;

use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Json, Path, Query, Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use ladder_core::{ErrorKind, LadderError, PlayerId};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Header carrying the authenticated user id, set by the upstream auth layer
pub const USER_HEADER: &str = "x-user-id";

// ── Caller identity ───────────────────────────────────────────────────

/// The authenticated user making the request
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub PlayerId);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::Unauthenticated(format!("missing {USER_HEADER} header")))?;
        let id = value
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| {
                ApiError::Unauthenticated(format!("{USER_HEADER} is not a valid user id"))
            })?;
        Ok(Caller(id))
    }
}

// ── Extractors ────────────────────────────────────────────────────────

/// [`Json`] body whose rejection is an [`ApiError`]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// [`Path`] parameters whose rejection is an [`ApiError`]
pub struct PathParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(PathParams(value))
    }
}

/// [`Query`] parameters whose rejection is an [`ApiError`]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(QueryParams(value))
    }
}

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ladder(#[from] LadderError),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    BadRequest(String),

    /// Body, path or query that failed to parse
    #[error("{message}")]
    Malformed { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ladder(e) => match e.kind() {
                ErrorKind::Authorization => StatusCode::FORBIDDEN,
                ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::State => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Infrastructure => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Malformed { status, .. } => *status,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Ladder(e) => e.code(),
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Malformed { .. } => "malformed_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = json!({ "error": self.code(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/matches", post(matches::submit_match))
        .route("/matches/:id", get(matches::get_match))
        .route("/matches/:id/resolve", post(matches::resolve_match))
        .route("/tournaments/:id/matches", get(matches::tournament_matches))
        .route("/teams/:id/matches", get(matches::team_matches))
        .route("/players/:id/matches", get(matches::player_matches))
        .route("/games/:game/leaderboard", get(leaderboard::get_leaderboard))
        .route(
            "/games/:game/players/:player/rank",
            get(leaderboard::get_player_rank),
        )
        .route("/games/:game/tiers", get(leaderboard::get_tier_distribution))
        .route("/games/:game/rescore", post(leaderboard::rescore_game))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
