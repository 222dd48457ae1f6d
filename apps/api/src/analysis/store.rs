//! Persistence for resume analyses, keyed by (user, resume hash).

use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{AnalysisRow, MatchResult};

/// Content hash identifying one uploaded resume. Leading and trailing
/// whitespace does not change identity.
pub fn resume_hash(resume_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(resume_text.trim().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Upserts the analysis record for (user, resume hash). Re-analyzing
/// the same resume replaces the stored results; last write wins.
pub async fn upsert_analysis(
    db: &PgPool,
    user_id: Uuid,
    resume_hash: &str,
    results: &[MatchResult],
) -> Result<AnalysisRow, AppError> {
    let results_json = serde_json::to_value(results)?;

    let row: AnalysisRow = sqlx::query_as(
        r#"
        INSERT INTO resume_analyses (id, user_id, resume_hash, results)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, resume_hash)
        DO UPDATE SET results = EXCLUDED.results, updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(resume_hash)
    .bind(&results_json)
    .fetch_one(db)
    .await?;

    Ok(row)
}

/// All analyses for a user, most recently updated first.
pub async fn list_analyses(db: &PgPool, user_id: Uuid) -> Result<Vec<AnalysisRow>, AppError> {
    let rows: Vec<AnalysisRow> = sqlx::query_as(
        "SELECT * FROM resume_analyses WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn delete_analysis(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM resume_analyses WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Analysis {id} not found")));
    }
    Ok(())
}
