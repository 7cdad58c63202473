use serde::{Deserialize, Serialize};

use crate::models::domain::{Like, Match, MatchId, ProfileSummary, UserId};

/// Response for the like endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub like: Like,
    /// Set when this like completed a mutual pair
    #[serde(rename = "match")]
    pub matched: Option<Match>,
    #[serde(rename = "matchCreated")]
    pub match_created: bool,
}

/// Response for the candidates endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<ProfileSummary>,
    pub total_results: usize,
}

/// Response for ban / unban
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResponse {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "isBanned")]
    pub is_banned: bool,
    #[serde(rename = "dissolvedMatches")]
    pub dissolved_matches: Vec<MatchId>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
