use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::composer::BudgetSummary;
use crate::handlers::{ErrorResponse, error_response, internal_error, validate_request};
use crate::models::theme::{BudgetCheckRequest, CreateThemeRequest, Theme, ThemeFilters};
use crate::services::theme_service::{ThemeError, ThemeService};

/// Convert ThemeError to HTTP response
impl IntoResponse for ThemeError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_type) = match self {
            ThemeError::ThemeNotFound => (StatusCode::NOT_FOUND, "theme_not_found"),
            ThemeError::DuplicateId => (StatusCode::CONFLICT, "duplicate_theme"),
            ThemeError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "product_not_found"),
            ThemeError::DatabaseError(ref msg) => return internal_error(msg),
        };

        error_response(status, error_type, &message)
    }
}

/// Handler for listing themes
///
/// Only active themes are returned unless a status is given.
#[utoipa::path(
    get,
    path = "/api/themes",
    params(ThemeFilters),
    responses(
        (status = 200, description = "Themes ordered by end date", body = Vec<Theme>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "themes"
)]
pub async fn list_themes_handler(
    State(theme_service): State<Arc<dyn ThemeService>>,
    Query(filters): Query<ThemeFilters>,
) -> Result<Json<Vec<Theme>>, Response> {
    match theme_service.list_themes(filters).await {
        Ok(themes) => Ok(Json(themes)),
        Err(e) => Err(e.into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/themes/{id}",
    params(
        ("id" = String, Path, description = "Theme slug")
    ),
    responses(
        (status = 200, description = "Theme", body = Theme),
        (status = 404, description = "Theme not found", body = ErrorResponse)
    ),
    tag = "themes"
)]
pub async fn get_theme_handler(
    State(theme_service): State<Arc<dyn ThemeService>>,
    Path(theme_id): Path<String>,
) -> Result<Json<Theme>, Response> {
    match theme_service.get_theme(&theme_id).await {
        Ok(theme) => Ok(Json(theme)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating a theme
#[utoipa::path(
    post,
    path = "/api/themes",
    request_body = CreateThemeRequest,
    responses(
        (status = 201, description = "Theme created", body = Theme),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Theme id already taken", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "themes"
)]
pub async fn create_theme_handler(
    State(theme_service): State<Arc<dyn ThemeService>>,
    Json(request): Json<CreateThemeRequest>,
) -> Result<(StatusCode, Json<Theme>), Response> {
    validate_request(&request)?;

    match theme_service.create_theme(request).await {
        Ok(theme) => Ok((StatusCode::CREATED, Json(theme))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for pricing a selection against a theme
///
/// Reports total cost, remaining budget and whether the selection could be
/// submitted.
#[utoipa::path(
    post,
    path = "/api/themes/{id}/budget-check",
    params(
        ("id" = String, Path, description = "Theme slug")
    ),
    request_body = BudgetCheckRequest,
    responses(
        (status = 200, description = "Selection summary", body = BudgetSummary),
        (status = 404, description = "Theme or product not found", body = ErrorResponse)
    ),
    tag = "themes"
)]
pub async fn budget_check_handler(
    State(theme_service): State<Arc<dyn ThemeService>>,
    Path(theme_id): Path<String>,
    Json(request): Json<BudgetCheckRequest>,
) -> Result<Json<BudgetSummary>, Response> {
    match theme_service
        .budget_check(&theme_id, &request.product_ids)
        .await
    {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => Err(e.into_response()),
    }
}
