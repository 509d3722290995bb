use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::handlers::error_response;
use crate::services::auth_service::{AuthError, AuthService};

/// Extension type to store authenticated user ID in request
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Auth middleware that validates JWT tokens and adds user_id to request extensions
pub async fn auth_middleware(
    State(auth_service): State<Arc<dyn AuthService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthRejection::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthRejection::InvalidTokenFormat)?;

    let user_id = auth_service
        .validate_token(token)
        .await
        .map_err(|e| match e {
            AuthError::TokenExpired => AuthRejection::TokenExpired,
            other => {
                debug!(error = %other, "Rejected bearer token");
                AuthRejection::InvalidToken
            }
        })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}

/// Why a request was turned away before reaching its handler
#[derive(Debug)]
pub enum AuthRejection {
    MissingToken,
    InvalidTokenFormat,
    InvalidToken,
    TokenExpired,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (error_type, message) = match self {
            AuthRejection::MissingToken => ("missing_token", "Missing authorization token"),
            AuthRejection::InvalidTokenFormat => (
                "invalid_token_format",
                "Invalid authorization header format. Expected: Bearer <token>",
            ),
            AuthRejection::InvalidToken => ("invalid_token", "Invalid or malformed token"),
            AuthRejection::TokenExpired => ("token_expired", "Token has expired"),
        };

        error_response(StatusCode::UNAUTHORIZED, error_type, message)
    }
}
