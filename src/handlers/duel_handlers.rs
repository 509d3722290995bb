use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::handlers::{ErrorResponse, error_response, internal_error};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::duel::{DuelVoteRequest, StartDuelRequest};
use crate::services::duel_service::{DuelError, DuelService, DuelState};

/// Convert DuelError to HTTP response
impl IntoResponse for DuelError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_type) = match self {
            DuelError::SessionNotFound => (StatusCode::NOT_FOUND, "no_duel_session"),
            DuelError::NoActivePair => (StatusCode::CONFLICT, "no_active_pair"),
            DuelError::WinnerNotInPair(_) => (StatusCode::BAD_REQUEST, "winner_not_in_pair"),
            DuelError::DatabaseError(ref msg) => return internal_error(msg),
        };

        error_response(status, error_type, &message)
    }
}

/// Handler for starting a duel session
///
/// Replaces any session the user already had. The body is optional.
#[utoipa::path(
    post,
    path = "/api/duels",
    request_body = StartDuelRequest,
    responses(
        (status = 201, description = "Session started with its opening pair", body = DuelState),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "duels"
)]
pub async fn start_duel_handler(
    State(duel_service): State<Arc<dyn DuelService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    request: Option<Json<StartDuelRequest>>,
) -> Result<(StatusCode, Json<DuelState>), Response> {
    let theme_id = request.and_then(|Json(request)| request.theme_id);

    match duel_service.start(auth_user.user_id, theme_id).await {
        Ok(state) => Ok((StatusCode::CREATED, Json(state))),
        Err(e) => Err(e.into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/duels/current",
    responses(
        (status = 200, description = "Current pair and tally", body = DuelState),
        (status = 404, description = "No session started", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "duels"
)]
pub async fn current_duel_handler(
    State(duel_service): State<Arc<dyn DuelService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<DuelState>, Response> {
    match duel_service.current(auth_user.user_id).await {
        Ok(state) => Ok(Json(state)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for judging the current pair
///
/// Responds with the next pair once the feedback delay has passed.
#[utoipa::path(
    post,
    path = "/api/duels/vote",
    request_body = DuelVoteRequest,
    responses(
        (status = 200, description = "Next pair and tally", body = DuelState),
        (status = 400, description = "Winner is not in the current pair", body = ErrorResponse),
        (status = 404, description = "No session started", body = ErrorResponse),
        (status = 409, description = "No pair is being shown", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "duels"
)]
pub async fn duel_vote_handler(
    State(duel_service): State<Arc<dyn DuelService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<DuelVoteRequest>,
) -> Result<Json<DuelState>, Response> {
    match duel_service
        .vote(auth_user.user_id, request.winner_id)
        .await
    {
        Ok(state) => Ok(Json(state)),
        Err(e) => Err(e.into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/duels/skip",
    responses(
        (status = 200, description = "Next pair and unchanged tally", body = DuelState),
        (status = 404, description = "No session started", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "duels"
)]
pub async fn skip_duel_handler(
    State(duel_service): State<Arc<dyn DuelService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<DuelState>, Response> {
    match duel_service.skip(auth_user.user_id).await {
        Ok(state) => Ok(Json(state)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for ending a duel session
///
/// Idle sessions also expire on their own after `DUEL_SESSION_TTL_SECS`.
#[utoipa::path(
    delete,
    path = "/api/duels",
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "No session started", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "duels"
)]
pub async fn end_duel_handler(
    State(duel_service): State<Arc<dyn DuelService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<StatusCode, Response> {
    match duel_service.end(auth_user.user_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
