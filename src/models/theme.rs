use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_slug;

/// Largest accepted theme budget
pub const MAX_BUDGET: i64 = 1_000_000_000;

/// Lifecycle of a style challenge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ThemeStatus {
    Active,
    Upcoming,
    Ended,
}

impl ThemeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeStatus::Active => "active",
            ThemeStatus::Upcoming => "upcoming",
            ThemeStatus::Ended => "ended",
        }
    }
}

/// A timed style challenge with a budget ceiling
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Human readable slug, e.g. `summer-vibes`
    pub id: String,
    pub title: String,
    pub description: String,
    pub rules: Vec<String>,
    pub budget: i64,
    pub required_colors: Vec<String>,
    pub rewards: Vec<String>,
    pub status: ThemeStatus,
    pub entries: i64,
    pub end_date: DateTime<Utc>,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a theme
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "summer-vibes",
    "title": "Summer Vibes",
    "description": "Light, bright looks for long days",
    "rules": ["Must include one clothing item"],
    "budget": 5000,
    "rewards": ["500 points"],
    "endDate": "2026-07-31T23:59:59Z"
}))]
pub struct CreateThemeRequest {
    #[validate(custom(function = "validate_slug"))]
    pub id: String,

    #[validate(length(min = 1, max = 120, message = "Title must be between 1 and 120 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    pub rules: Vec<String>,

    #[validate(range(
        min = 0,
        max = 1000000000,
        message = "Budget must be between 0 and 1000000000"
    ))]
    #[schema(minimum = 0, maximum = 1000000000, example = 5000)]
    pub budget: i64,

    #[serde(default)]
    pub required_colors: Vec<String>,

    #[serde(default)]
    pub rewards: Vec<String>,

    pub status: Option<ThemeStatus>,

    pub end_date: DateTime<Utc>,

    #[serde(default)]
    pub image: String,
}

/// Theme listing query. Without a status only active themes are listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ThemeFilters {
    pub status: Option<ThemeStatus>,
}

/// Request payload for pricing a selection against a theme budget
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCheckRequest {
    pub product_ids: Vec<Uuid>,
}
