use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::handlers::{MIN_JOB_DESCRIPTION_CHARS, MIN_RESUME_CHARS};
use crate::errors::AppError;
use crate::interview::session;
use crate::models::interview::{FeedbackResult, InterviewSession, SessionSummaryRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub user_id: Uuid,
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub user_id: Uuid,
    pub question_id: String,
    pub response_text: String,
    #[serde(default)]
    pub code: Option<String>,
    pub response_time_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct CompleteInterviewRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub feedback: FeedbackResult,
    pub current_question_index: usize,
    pub total_questions: usize,
    pub completed: bool,
}

/// POST /api/v1/interviews
///
/// Generates the question set up front; the session starts in `created`.
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(req): Json<CreateInterviewRequest>,
) -> Result<Json<InterviewSession>, AppError> {
    validate_create(&req)?;

    let session = session::create_session(
        &state.db,
        state.ai.as_ref(),
        req.user_id,
        &req.resume_text,
        &req.job_description,
    )
    .await?;

    Ok(Json(session))
}

/// GET /api/v1/interviews?user_id=<uuid>
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Vec<SessionSummaryRow>>, AppError> {
    let sessions = session::list_sessions(&state.db, query.user_id).await?;
    Ok(Json(sessions))
}

/// GET /api/v1/interviews/:id?user_id=<uuid>
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<InterviewSession>, AppError> {
    let session = session::load_session(&state.db, id, query.user_id).await?;
    Ok(Json(session))
}

/// POST /api/v1/interviews/:id/start
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<Json<InterviewSession>, AppError> {
    let lock = state.session_lock(id);
    let _guard = lock.lock().await;

    let result = session::start_session(&state.db, id, req.user_id).await;
    evict_lock_if_not_found(&state, id, &result);
    Ok(Json(result?))
}

/// POST /api/v1/interviews/:id/answers
///
/// Submissions for one session are serialized; two clients racing the
/// same question see one success and one conflict.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let lock = state.session_lock(id);
    let _guard = lock.lock().await;

    let result = session::submit_answer(
        &state.db,
        state.ai.as_ref(),
        id,
        req.user_id,
        &req.question_id,
        &req.response_text,
        req.code.as_deref(),
        req.response_time_secs,
    )
    .await;
    evict_lock_if_not_found(&state, id, &result);
    let outcome = result?;

    Ok(Json(AnswerResponse {
        feedback: outcome.feedback,
        current_question_index: outcome.current_question_index,
        total_questions: outcome.total_questions,
        completed: outcome.completed,
    }))
}

/// POST /api/v1/interviews/:id/complete
pub async fn handle_complete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteInterviewRequest>,
) -> Result<Json<InterviewSession>, AppError> {
    let lock = state.session_lock(id);
    let _guard = lock.lock().await;

    let result = session::complete_session(&state.db, state.ai.as_ref(), id, req.user_id).await;
    evict_lock_if_not_found(&state, id, &result);
    let session = result?;

    // Completed sessions reject every transition, so the lock entry
    // can go.
    drop(_guard);
    state.forget_session_lock(id);

    Ok(Json(session))
}

/// Releases the lock entry taken for an id that turned out not to
/// exist, so requests against unknown ids cannot accumulate entries
/// in the map.
fn evict_lock_if_not_found<T>(state: &AppState, id: Uuid, result: &Result<T, AppError>) {
    if matches!(result, Err(AppError::NotFound(_))) {
        state.forget_session_lock(id);
    }
}

fn validate_create(req: &CreateInterviewRequest) -> Result<(), AppError> {
    if req.resume_text.trim().chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "resume_text must be at least {MIN_RESUME_CHARS} characters"
        )));
    }
    if req.job_description.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "job_description must be at least {MIN_JOB_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use dashmap::DashMap;
    use sqlx::PgPool;

    use crate::ai::gateway::{AiGateway, GatewayError, InvokeOptions};
    use crate::config::Config;

    struct NoopGateway;

    #[async_trait]
    impl AiGateway for NoopGateway {
        async fn invoke(
            &self,
            _prompt: &str,
            _system: &str,
            _options: InvokeOptions,
        ) -> Result<String, GatewayError> {
            Err(GatewayError::EmptyCompletion)
        }
    }

    fn make_state() -> AppState {
        AppState {
            db: PgPool::connect_lazy("postgres://localhost/preppilot_test").unwrap(),
            ai: Arc::new(NoopGateway),
            config: Config {
                database_url: "postgres://localhost/preppilot_test".to_string(),
                ai_base_url: "http://localhost:9".to_string(),
                ai_api_key: "test-key".to_string(),
                ai_model: "test-model".to_string(),
                ai_fallback_model: "test-fallback".to_string(),
                ai_timeout_secs: 1,
                port: 0,
                rust_log: "info".to_string(),
            },
            session_locks: Arc::new(DashMap::new()),
        }
    }

    fn valid_request() -> CreateInterviewRequest {
        CreateInterviewRequest {
            user_id: Uuid::new_v4(),
            resume_text: "Backend engineer with six years of experience building REST APIs in \
                          Rust and Go, running PostgreSQL and Redis in production on AWS."
                .to_string(),
            job_description: "We are hiring a senior backend engineer to own our payments \
                              platform."
                .to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_reasonable_input() {
        assert!(validate_create(&valid_request()).is_ok());
    }

    #[test]
    fn test_validate_rejects_short_resume() {
        let mut req = valid_request();
        req.resume_text = "Engineer.".to_string();
        assert!(matches!(
            validate_create(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_short_job_description() {
        let mut req = valid_request();
        req.job_description = "Backend role.".to_string();
        assert!(matches!(
            validate_create(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_answer_request_code_defaults_to_none() {
        let req: AnswerRequest = serde_json::from_str(
            r#"{
                "user_id": "6f0c3f0e-2f4b-4b8e-9f3a-3a8d6c5b4a21",
                "question_id": "q1",
                "response_text": "I would profile the endpoint first.",
                "response_time_secs": 120
            }"#,
        )
        .unwrap();
        assert!(req.code.is_none());
        assert_eq!(req.question_id, "q1");
    }

    #[tokio::test]
    async fn test_session_lock_is_shared_until_forgotten() {
        let state = make_state();
        let id = Uuid::new_v4();

        let first = state.session_lock(id);
        let second = state.session_lock(id);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(state.session_locks.len(), 1);

        state.forget_session_lock(id);
        assert!(state.session_locks.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_id_does_not_pin_a_lock_entry() {
        let state = make_state();
        let id = Uuid::new_v4();
        let _lock = state.session_lock(id);

        let result: Result<(), AppError> =
            Err(AppError::NotFound(format!("Interview {id} not found")));
        evict_lock_if_not_found(&state, id, &result);
        assert!(state.session_locks.is_empty());
    }

    #[tokio::test]
    async fn test_live_session_errors_keep_the_lock_entry() {
        let state = make_state();
        let id = Uuid::new_v4();
        let _lock = state.session_lock(id);

        let conflict: Result<(), AppError> =
            Err(AppError::InvalidState("interview already started".to_string()));
        evict_lock_if_not_found(&state, id, &conflict);
        assert_eq!(state.session_locks.len(), 1);

        let ok: Result<(), AppError> = Ok(());
        evict_lock_if_not_found(&state, id, &ok);
        assert_eq!(state.session_locks.len(), 1);
    }
}
