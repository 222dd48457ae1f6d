use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::pipeline::analyze_match;
use crate::analysis::store::{delete_analysis, list_analyses, resume_hash, upsert_analysis};
use crate::errors::AppError;
use crate::models::analysis::{AnalysisRow, MatchResult};
use crate::state::AppState;

pub const MIN_RESUME_CHARS: usize = 100;
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: Uuid,
    pub resume_text: String,
    pub job_descriptions: Vec<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub id: Uuid,
    pub resume_hash: String,
    pub results: Vec<MatchResult>,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// POST /api/v1/analyses
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate_analyze(&req)?;

    let mut results = Vec::with_capacity(req.job_descriptions.len());
    for job_description in &req.job_descriptions {
        results.push(analyze_match(state.ai.as_ref(), &req.resume_text, job_description).await);
    }

    let hash = resume_hash(&req.resume_text);
    let row = upsert_analysis(&state.db, req.user_id, &hash, &results).await?;

    Ok(Json(AnalyzeResponse {
        id: row.id,
        resume_hash: hash,
        results,
    }))
}

/// GET /api/v1/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<AnalysisRow>>, AppError> {
    let rows = list_analyses(&state.db, params.user_id).await?;
    Ok(Json(rows))
}

/// DELETE /api/v1/analyses/:id
pub async fn handle_delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    delete_analysis(&state.db, id, params.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_analyze(req: &AnalyzeRequest) -> Result<(), AppError> {
    if req.resume_text.trim().chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "resume_text must be at least {MIN_RESUME_CHARS} characters"
        )));
    }
    if req.job_descriptions.is_empty() {
        return Err(AppError::Validation(
            "at least one job description is required".to_string(),
        ));
    }
    for jd in &req.job_descriptions {
        if jd.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
            return Err(AppError::Validation(format!(
                "each job description must be at least {MIN_JOB_DESCRIPTION_CHARS} characters"
            )));
        }
    }
    Ok(())
}
