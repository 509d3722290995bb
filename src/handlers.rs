pub mod auth_handlers;
pub mod duel_handlers;
pub mod outfit_handlers;
pub mod product_handlers;
pub mod theme_handlers;
pub mod vote_handlers;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;
use validator::Validate;

/// Error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Builds the JSON error body every handler returns
pub(crate) fn error_response(status: StatusCode, error_type: &str, message: &str) -> Response {
    (status, Json(ErrorResponse::new(error_type, message))).into_response()
}

/// Storage failures are logged in full and reported without detail
pub(crate) fn internal_error(detail: &str) -> Response {
    error!(error = %detail, "Request failed on storage");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "database_error",
        "Internal server error",
    )
}

/// Validates a request body, turning field errors into a 400 response
pub(crate) fn validate_request<T: Validate>(request: &T) -> Result<(), Response> {
    let Err(validation_errors) = request.validate() else {
        return Ok(());
    };

    let mut messages: Vec<String> = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    messages.sort();

    Err(error_response(
        StatusCode::BAD_REQUEST,
        "validation_error",
        &messages.join("; "),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUserRequest;

    #[tokio::test]
    async fn test_validate_request_lists_field_messages() {
        let request = CreateUserRequest {
            name: "P".to_string(),
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
            avatar: None,
        };

        let response = validate_request(&request).unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "validation_error");
        assert_eq!(
            body.message,
            "email: Invalid email format; name: Name must be between 2 and 100 characters"
        );
    }

    #[test]
    fn test_validate_request_accepts_valid_body() {
        let request = CreateUserRequest {
            name: "Priya".to_string(),
            email: "priya@example.com".to_string(),
            password: "password123".to_string(),
            avatar: None,
        };
        assert!(validate_request(&request).is_ok());
    }
}
