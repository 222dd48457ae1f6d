//! Technology-confidence ratings: keyword extraction seeds a profile at
//! the default confidence, then the user edits levels and saves them
//! back. Records upsert on (user, resume hash) like analyses do.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::handlers::MIN_RESUME_CHARS;
use crate::analysis::store::resume_hash;
use crate::errors::AppError;
use crate::keywords;
use crate::models::profile::{TechCategory, TechRatingRow, TechnologyEntry};
use crate::state::AppState;

pub const MIN_CONFIDENCE: u8 = 1;
pub const MAX_CONFIDENCE: u8 = 10;

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub user_id: Uuid,
    pub resume_text: String,
}

/// Rating entry as the client sends it. Category is optional; missing
/// ones resolve through the extractor's name lookup.
#[derive(Deserialize)]
pub struct RatingEntryInput {
    pub name: String,
    #[serde(default)]
    pub category: Option<TechCategory>,
    pub confidence_level: u8,
}

#[derive(Deserialize)]
pub struct UpdateRatingsRequest {
    pub user_id: Uuid,
    pub resume_hash: String,
    pub technologies: Vec<RatingEntryInput>,
}

#[derive(Serialize)]
pub struct RatingResponse {
    pub id: Uuid,
    pub resume_hash: String,
    pub technologies: Vec<TechnologyEntry>,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// POST /api/v1/ratings/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<RatingResponse>, AppError> {
    if req.resume_text.trim().chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "resume_text must be at least {MIN_RESUME_CHARS} characters"
        )));
    }

    let profile = keywords::extract(&req.resume_text);
    let hash = resume_hash(&req.resume_text);
    let row = upsert_rating(&state, req.user_id, &hash, &profile.technologies).await?;

    Ok(Json(RatingResponse {
        id: row.id,
        resume_hash: hash,
        technologies: profile.technologies,
    }))
}

/// PUT /api/v1/ratings
pub async fn handle_update_ratings(
    State(state): State<AppState>,
    Json(req): Json<UpdateRatingsRequest>,
) -> Result<Json<RatingResponse>, AppError> {
    if req.resume_hash.trim().is_empty() {
        return Err(AppError::Validation("resume_hash is required".to_string()));
    }
    let technologies = resolve_entries(req.technologies)?;
    let row = upsert_rating(&state, req.user_id, &req.resume_hash, &technologies).await?;

    Ok(Json(RatingResponse {
        id: row.id,
        resume_hash: req.resume_hash,
        technologies,
    }))
}

/// GET /api/v1/ratings
pub async fn handle_list_ratings(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<TechRatingRow>>, AppError> {
    let rows: Vec<TechRatingRow> = sqlx::query_as(
        "SELECT * FROM tech_ratings WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(params.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// DELETE /api/v1/ratings/:id
pub async fn handle_delete_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM tech_ratings WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Rating {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn upsert_rating(
    state: &AppState,
    user_id: Uuid,
    resume_hash: &str,
    technologies: &[TechnologyEntry],
) -> Result<TechRatingRow, AppError> {
    let technologies_json = serde_json::to_value(technologies)?;

    let row: TechRatingRow = sqlx::query_as(
        r#"
        INSERT INTO tech_ratings (id, user_id, resume_hash, technologies)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, resume_hash)
        DO UPDATE SET technologies = EXCLUDED.technologies, updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(resume_hash)
    .bind(&technologies_json)
    .fetch_one(&state.db)
    .await?;

    Ok(row)
}

/// Validates client entries and fills in missing categories from the
/// extractor's dictionary, defaulting unknown names to General.
fn resolve_entries(entries: Vec<RatingEntryInput>) -> Result<Vec<TechnologyEntry>, AppError> {
    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation(
                "technology name must not be empty".to_string(),
            ));
        }
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&entry.confidence_level) {
            return Err(AppError::Validation(format!(
                "confidence_level for '{name}' must be between {MIN_CONFIDENCE} and {MAX_CONFIDENCE}"
            )));
        }
        let category = entry.category.unwrap_or_else(|| keywords::categorize(&name));
        resolved.push(TechnologyEntry {
            name,
            category,
            confidence_level: entry.confidence_level,
        });
    }
    Ok(resolved)
}
