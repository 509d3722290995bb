use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::product::Product;
use crate::models::user::User;

/// Submission lifecycle of an outfit. Transitions only move forward.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Type,
)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutfitStatus {
    Draft,
    Submitted,
    Voting,
    Completed,
}

impl OutfitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutfitStatus::Draft => "draft",
            OutfitStatus::Submitted => "submitted",
            OutfitStatus::Voting => "voting",
            OutfitStatus::Completed => "completed",
        }
    }

    /// The status that directly follows this one, if any
    pub fn successor(&self) -> Option<OutfitStatus> {
        match self {
            OutfitStatus::Draft => Some(OutfitStatus::Submitted),
            OutfitStatus::Submitted => Some(OutfitStatus::Voting),
            OutfitStatus::Voting => Some(OutfitStatus::Completed),
            OutfitStatus::Completed => None,
        }
    }

    /// Staying put or advancing exactly one step is allowed
    pub fn can_transition_to(&self, next: OutfitStatus) -> bool {
        *self == next || self.successor() == Some(next)
    }
}

/// A titled collection of catalog items entered into a theme
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub theme_id: String,
    pub title: String,
    pub description: String,
    pub product_ids: Vec<Uuid>,
    /// Display order matters
    pub moodboard_images: Vec<String>,
    pub votes: i64,
    pub status: OutfitStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public face of an outfit's creator
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<User> for Creator {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar: user.avatar,
        }
    }
}

/// An outfit with its catalog items and creator filled in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutfitDetail {
    #[serde(flatten)]
    pub outfit: Outfit,
    /// Items in `productIds` order; items missing from the catalog are left out
    pub products: Vec<Product>,
    /// Absent when the creator's account is gone
    pub creator: Option<Creator>,
}

/// Request payload for creating an outfit. The owner comes from the token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "themeId": "summer-vibes",
    "title": "Sunny Day Vibes",
    "description": "Perfect for a casual summer day out with friends",
    "productIds": ["550e8400-e29b-41d4-a716-446655440000"],
    "moodboardImages": ["/summer-outfit-bright-colors.jpg"]
}))]
pub struct CreateOutfitRequest {
    #[validate(length(min = 1, message = "Theme is required"))]
    pub theme_id: String,

    #[validate(length(min = 1, max = 120, message = "Title must be between 1 and 120 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    pub product_ids: Vec<Uuid>,

    #[serde(default)]
    pub moodboard_images: Vec<String>,

    /// Defaults to `draft`
    pub status: Option<OutfitStatus>,
}

/// Request payload for updating an outfit; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutfitRequest {
    #[validate(length(min = 1, max = 120, message = "Title must be between 1 and 120 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    pub product_ids: Option<Vec<Uuid>>,

    pub moodboard_images: Option<Vec<String>>,

    pub status: Option<OutfitStatus>,
}

/// Outfit listing query
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OutfitFilters {
    pub user_id: Option<Uuid>,
    pub status: Option<OutfitStatus>,
    pub theme_id: Option<String>,
}

impl OutfitFilters {
    pub fn matches(&self, outfit: &Outfit) -> bool {
        self.user_id.is_none_or(|id| outfit.user_id == id)
            && self.status.is_none_or(|s| outfit.status == s)
            && self
                .theme_id
                .as_deref()
                .is_none_or(|t| outfit.theme_id == t)
    }
}

/// Leaderboard query
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    pub theme_id: Option<String>,
    pub limit: Option<usize>,
}
