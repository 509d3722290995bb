use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::handlers::{ErrorResponse, error_response, internal_error, validate_request};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::auth::{AuthToken, LoginRequest};
use crate::models::user::{CreateUserRequest, User, UserProfile};
use crate::services::auth_service::{AuthError, AuthService};

/// Convert AuthError to HTTP response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AuthError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "duplicate_email",
                "Email already exists",
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authentication token",
            ),
            AuthError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "token_expired",
                "Authentication token has expired",
            ),
            AuthError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "user_not_found",
                "User no longer exists",
            ),
            AuthError::DatabaseError(ref msg) => return internal_error(msg),
        };

        error_response(status, error_type, message)
    }
}

/// Handler for user registration
///
/// Creates a new user account with the provided credentials.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User successfully registered", body = User),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), Response> {
    validate_request(&request)?;

    match auth_service.register(request).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for user login
///
/// Authenticates a user and returns a JWT token with their profile.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthToken),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthToken>, Response> {
    match auth_service.login(request).await {
        Ok(token) => Ok(Json(token)),
        Err(e) => Err(e.into_response()),
    }
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn me_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfile>, Response> {
    auth_service
        .profile(auth_user.user_id)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryUserRepository;
    use crate::services::auth_service::AuthServiceImpl;
    use uuid::Uuid;

    fn auth_service() -> Arc<dyn AuthService> {
        Arc::new(
            AuthServiceImpl::new(
                Arc::new(InMemoryUserRepository::new()),
                "test_secret".to_string(),
            )
            .with_hash_cost(bcrypt::MIN_COST),
        )
    }

    fn register_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_register_handler_success() {
        let auth_service = auth_service();

        let result =
            register_handler(State(auth_service), Json(register_request("test@example.com")))
                .await;

        let (status, Json(user)) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user.name, "Test User");
        assert_eq!(user.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_register_handler_validation_error() {
        let auth_service = auth_service();

        let result =
            register_handler(State(auth_service), Json(register_request("invalid-email"))).await;
        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_handler_duplicate_email() {
        let auth_service = auth_service();
        let request = register_request("test@example.com");

        register_handler(State(auth_service.clone()), Json(request.clone()))
            .await
            .unwrap();

        let response = register_handler(State(auth_service), Json(request))
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_handler_invalid_credentials() {
        let auth_service = auth_service();
        register_handler(
            State(auth_service.clone()),
            Json(register_request("test@example.com")),
        )
        .await
        .unwrap();

        let login_request = LoginRequest {
            email: "test@example.com".to_string(),
            password: "wrongpassword".to_string(),
        };

        let response = login_handler(State(auth_service), Json(login_request))
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_handler_returns_profile() {
        let auth_service = auth_service();
        let (_, Json(user)) = register_handler(
            State(auth_service.clone()),
            Json(register_request("test@example.com")),
        )
        .await
        .unwrap();

        let Json(profile) = me_handler(
            State(auth_service.clone()),
            Extension(AuthenticatedUser { user_id: user.id }),
        )
        .await
        .unwrap();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.level, "Style Novice");

        let response = me_handler(
            State(auth_service),
            Extension(AuthenticatedUser {
                user_id: Uuid::new_v4(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
