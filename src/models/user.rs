use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Level given to freshly registered users
pub const DEFAULT_LEVEL: &str = "Style Novice";

/// Points an outfit's creator earns for every vote it receives
pub const POINTS_PER_VOTE_RECEIVED: i64 = 10;

/// Minimum points per level, highest first
const LEVELS: [(i64, &str); 4] = [
    (2800, "Fashion Icon"),
    (2400, "Style Expert"),
    (1000, "Style Enthusiast"),
    (0, DEFAULT_LEVEL),
];

/// Level title for a points balance
pub fn level_for_points(points: i64) -> &'static str {
    LEVELS
        .iter()
        .find(|(min, _)| points >= *min)
        .map_or(DEFAULT_LEVEL, |&(_, level)| level)
}

/// User entity representing a registered stylist
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub points: i64,
    pub level: String,
    pub outfits_created: i64,
    pub votes_given: i64,
    pub created_at: DateTime<Utc>,
}

/// Public session record handed back to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub points: i64,
    pub level: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            points: user.points,
            level: user.level,
        }
    }
}

/// Request payload for user registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Priya Sharma",
    "email": "priya@example.com",
    "password": "securepassword123"
}))]
pub struct CreateUserRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Name must be between 2 and 100 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_points(0), DEFAULT_LEVEL);
        assert_eq!(level_for_points(990), DEFAULT_LEVEL);
        assert_eq!(level_for_points(1000), "Style Enthusiast");
        assert_eq!(level_for_points(2420), "Style Expert");
        assert_eq!(level_for_points(2850), "Fashion Icon");
        assert_eq!(level_for_points(-5), DEFAULT_LEVEL);
    }
}
