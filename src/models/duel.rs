use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request payload for starting a duel session
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "themeId": "summer-vibes" }))]
pub struct StartDuelRequest {
    /// Restrict the pool to one theme; all themes when absent
    pub theme_id: Option<String>,
}

/// Request payload for judging the current duel
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "winnerId": "550e8400-e29b-41d4-a716-446655440000" }))]
pub struct DuelVoteRequest {
    pub winner_id: Uuid,
}
