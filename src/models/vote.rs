use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A single recorded vote for an outfit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub outfit_id: Uuid,
    /// Outfit vote count after this vote was applied
    pub outfit_votes: i64,
    pub created_at: DateTime<Utc>,
}

/// Request payload for casting a vote
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "outfitId": "550e8400-e29b-41d4-a716-446655440000" }))]
pub struct CastVoteRequest {
    pub outfit_id: Uuid,
}
