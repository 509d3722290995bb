use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::handlers::{ErrorResponse, error_response, internal_error};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::vote::{CastVoteRequest, Vote};
use crate::services::vote_service::{VoteError, VoteService};

/// Convert VoteError to HTTP response
impl IntoResponse for VoteError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_type) = match self {
            VoteError::OutfitNotFound => (StatusCode::NOT_FOUND, "outfit_not_found"),
            VoteError::VoterNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            VoteError::NotAcceptingVotes(_) => (StatusCode::CONFLICT, "not_accepting_votes"),
            VoteError::DatabaseError(ref msg) => return internal_error(msg),
        };

        error_response(status, error_type, &message)
    }
}

/// Handler for voting on an outfit
///
/// Only outfits in `voting` accept votes.
#[utoipa::path(
    post,
    path = "/api/votes",
    request_body = CastVoteRequest,
    responses(
        (status = 201, description = "Vote recorded", body = Vote),
        (status = 404, description = "Outfit or voter not found", body = ErrorResponse),
        (status = 409, description = "Outfit is not in voting", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "votes"
)]
pub async fn cast_vote_handler(
    State(vote_service): State<Arc<dyn VoteService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CastVoteRequest>,
) -> Result<(StatusCode, Json<Vote>), Response> {
    match vote_service
        .cast_vote(auth_user.user_id, request.outfit_id)
        .await
    {
        Ok(vote) => Ok((StatusCode::CREATED, Json(vote))),
        Err(e) => Err(e.into_response()),
    }
}
