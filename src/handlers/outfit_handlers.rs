use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::handlers::{ErrorResponse, error_response, internal_error, validate_request};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::outfit::{
    CreateOutfitRequest, LeaderboardQuery, Outfit, OutfitDetail, OutfitFilters, UpdateOutfitRequest,
};
use crate::services::outfit_service::{OutfitError, OutfitService};

/// Convert OutfitError to HTTP response
impl IntoResponse for OutfitError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_type) = match self {
            OutfitError::OutfitNotFound => (StatusCode::NOT_FOUND, "outfit_not_found"),
            OutfitError::ThemeNotFound => (StatusCode::NOT_FOUND, "theme_not_found"),
            OutfitError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "product_not_found"),
            OutfitError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            OutfitError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            OutfitError::NotEditable(_) => (StatusCode::CONFLICT, "not_editable"),
            OutfitError::StatusChanged => (StatusCode::CONFLICT, "status_conflict"),
            OutfitError::SubmissionRejected(_) => (StatusCode::BAD_REQUEST, "submission_rejected"),
            OutfitError::DatabaseError(ref msg) => return internal_error(msg),
        };

        error_response(status, error_type, &message)
    }
}

/// Handler for listing outfits
///
/// Filters combine with AND; newest outfits come first.
#[utoipa::path(
    get,
    path = "/api/outfits",
    params(OutfitFilters),
    responses(
        (status = 200, description = "Matching outfits", body = Vec<OutfitDetail>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "outfits"
)]
pub async fn list_outfits_handler(
    State(outfit_service): State<Arc<dyn OutfitService>>,
    Query(filters): Query<OutfitFilters>,
) -> Result<Json<Vec<OutfitDetail>>, Response> {
    match outfit_service.list_outfits(filters).await {
        Ok(outfits) => Ok(Json(outfits)),
        Err(e) => Err(e.into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/outfits/{id}",
    params(
        ("id" = Uuid, Path, description = "Outfit ID")
    ),
    responses(
        (status = 200, description = "Outfit with its items and creator", body = OutfitDetail),
        (status = 404, description = "Outfit not found", body = ErrorResponse)
    ),
    tag = "outfits"
)]
pub async fn get_outfit_handler(
    State(outfit_service): State<Arc<dyn OutfitService>>,
    Path(outfit_id): Path<Uuid>,
) -> Result<Json<OutfitDetail>, Response> {
    match outfit_service.get_outfit(outfit_id).await {
        Ok(outfit) => Ok(Json(outfit)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the leaderboard
///
/// Outfits in voting or completed, most votes first, older outfits winning
/// ties. `limit` defaults to 10 and is capped at 100.
#[utoipa::path(
    get,
    path = "/api/outfits/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked outfits", body = Vec<OutfitDetail>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "outfits"
)]
pub async fn leaderboard_handler(
    State(outfit_service): State<Arc<dyn OutfitService>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<OutfitDetail>>, Response> {
    match outfit_service.leaderboard(query).await {
        Ok(outfits) => Ok(Json(outfits)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating an outfit
///
/// The authenticated user becomes the owner. Creating straight into
/// `submitted` runs the submission check against the theme.
#[utoipa::path(
    post,
    path = "/api/outfits",
    request_body = CreateOutfitRequest,
    responses(
        (status = 201, description = "Outfit created", body = Outfit),
        (status = 400, description = "Validation error or submission rejected", body = ErrorResponse),
        (status = 404, description = "Theme or product not found", body = ErrorResponse),
        (status = 409, description = "Status not allowed on creation", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "outfits"
)]
pub async fn create_outfit_handler(
    State(outfit_service): State<Arc<dyn OutfitService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateOutfitRequest>,
) -> Result<(StatusCode, Json<Outfit>), Response> {
    validate_request(&request)?;

    match outfit_service
        .create_outfit(auth_user.user_id, request)
        .await
    {
        Ok(outfit) => Ok((StatusCode::CREATED, Json(outfit))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating an outfit
///
/// Content can only change while the outfit is a draft. The status may stay
/// or advance one step.
#[utoipa::path(
    put,
    path = "/api/outfits/{id}",
    params(
        ("id" = Uuid, Path, description = "Outfit ID")
    ),
    request_body = UpdateOutfitRequest,
    responses(
        (status = 200, description = "Outfit updated", body = Outfit),
        (status = 400, description = "Validation error or submission rejected", body = ErrorResponse),
        (status = 403, description = "User doesn't own the outfit", body = ErrorResponse),
        (status = 404, description = "Outfit not found", body = ErrorResponse),
        (status = 409, description = "Invalid status change, outfit not editable or status changed concurrently", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "outfits"
)]
pub async fn update_outfit_handler(
    State(outfit_service): State<Arc<dyn OutfitService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(outfit_id): Path<Uuid>,
    Json(request): Json<UpdateOutfitRequest>,
) -> Result<Json<Outfit>, Response> {
    validate_request(&request)?;

    match outfit_service
        .update_outfit(auth_user.user_id, outfit_id, request)
        .await
    {
        Ok(outfit) => Ok(Json(outfit)),
        Err(e) => Err(e.into_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/outfits/{id}",
    params(
        ("id" = Uuid, Path, description = "Outfit ID")
    ),
    responses(
        (status = 204, description = "Outfit deleted"),
        (status = 403, description = "User doesn't own the outfit", body = ErrorResponse),
        (status = 404, description = "Outfit not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "outfits"
)]
pub async fn delete_outfit_handler(
    State(outfit_service): State<Arc<dyn OutfitService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(outfit_id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    match outfit_service
        .delete_outfit(auth_user.user_id, outfit_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
