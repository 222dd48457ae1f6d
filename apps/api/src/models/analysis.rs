use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Outcome of matching one resume against one job description.
///
/// Invariant: when `is_non_tech_role` is true, `match_percentage` is 0
/// and every list is empty — enforced by constructing non-tech results
/// only through [`MatchResult::non_technical`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_percentage: u8,
    pub is_non_tech_role: bool,
    pub strengths: Vec<String>,
    pub content_weaknesses: Vec<String>,
    pub structure_weaknesses: Vec<String>,
    pub content_recommendations: Vec<String>,
    pub structure_recommendations: Vec<String>,
    pub raw_similarity: f64,
}

impl MatchResult {
    /// The fixed result shape for a job description that is not a
    /// software/technology role.
    pub fn non_technical() -> Self {
        Self {
            match_percentage: 0,
            is_non_tech_role: true,
            strengths: vec![],
            content_weaknesses: vec![],
            structure_weaknesses: vec![],
            content_recommendations: vec![],
            structure_recommendations: vec![],
            raw_similarity: 0.0,
        }
    }
}

/// Persisted analysis record, upserted by `(user_id, resume_hash)`.
/// `results` holds the serialized `Vec<MatchResult>` for the submitted
/// job descriptions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_hash: String,
    pub results: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
