//! Session lifecycle: create → start → answer* → complete.
//!
//! Transitions are pure functions over [`InterviewSession`] so the state
//! machine is testable without a database; the async wrappers compose
//! load, transition, and persist. Responses are append-only and the
//! question list never changes after creation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::ai::gateway::AiGateway;
use crate::ai::normalize::OverallNarrative;
use crate::errors::AppError;
use crate::interview::{feedback, questions};
use crate::models::interview::{
    CategoryScores, FeedbackResult, InterviewQuestion, InterviewResponse, InterviewSession,
    OverallFeedback, SessionRow, SessionStatus, SessionSummaryRow,
};

/// Assumed duration when a session is completed without ever being
/// started (no answers were submitted either, so no timestamps exist).
const DEFAULT_SESSION_DURATION_SECS: u64 = 1800;

/// What the client gets back after submitting one answer.
#[derive(Debug)]
pub struct AnswerOutcome {
    pub feedback: FeedbackResult,
    pub current_question_index: usize,
    pub total_questions: usize,
    pub completed: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

fn session_from_row(row: SessionRow) -> Result<InterviewSession, AppError> {
    let status = SessionStatus::parse(&row.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown session status: {}", row.status))
    })?;
    let questions: Vec<InterviewQuestion> = serde_json::from_value(row.questions)?;
    let responses: Vec<InterviewResponse> = serde_json::from_value(row.responses)?;
    let overall_feedback = row
        .overall_feedback
        .map(serde_json::from_value)
        .transpose()?;

    Ok(InterviewSession {
        id: row.id,
        user_id: row.user_id,
        job_description: row.job_description,
        status,
        questions,
        responses,
        started_at: row.started_at,
        completed_at: row.completed_at,
        overall_feedback,
    })
}

/// Generates the question set and stores a new `created` session.
pub async fn create_session(
    db: &PgPool,
    gateway: &dyn AiGateway,
    user_id: Uuid,
    resume_text: &str,
    job_description: &str,
) -> Result<InterviewSession, AppError> {
    let questions = questions::generate_questions(gateway, resume_text, job_description).await;

    let row: SessionRow = sqlx::query_as(
        "INSERT INTO interview_sessions (id, user_id, job_description, status, questions, responses)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(job_description)
    .bind(SessionStatus::Created.as_str())
    .bind(serde_json::to_value(&questions)?)
    .bind(serde_json::to_value(Vec::<InterviewResponse>::new())?)
    .fetch_one(db)
    .await?;

    session_from_row(row)
}

pub async fn load_session(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<InterviewSession, AppError> {
    let row: Option<SessionRow> =
        sqlx::query_as("SELECT * FROM interview_sessions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await?;

    match row {
        Some(row) => session_from_row(row),
        None => Err(AppError::NotFound(format!("Interview {id} not found"))),
    }
}

/// Listing projection, newest first. Counts come from the JSONB arrays
/// so the full payloads never leave the database.
pub async fn list_sessions(db: &PgPool, user_id: Uuid) -> Result<Vec<SessionSummaryRow>, AppError> {
    let rows: Vec<SessionSummaryRow> = sqlx::query_as(
        "SELECT id, user_id, status,
                jsonb_array_length(questions) AS question_count,
                jsonb_array_length(responses) AS answered_count,
                started_at, completed_at, created_at
         FROM interview_sessions
         WHERE user_id = $1
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

async fn persist(db: &PgPool, session: &InterviewSession) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE interview_sessions
         SET status = $3, responses = $4, started_at = $5, completed_at = $6,
             overall_feedback = $7, updated_at = now()
         WHERE id = $1 AND user_id = $2",
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(session.status.as_str())
    .bind(serde_json::to_value(&session.responses)?)
    .bind(session.started_at)
    .bind(session.completed_at)
    .bind(
        session
            .overall_feedback
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?,
    )
    .execute(db)
    .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Transitions
// ────────────────────────────────────────────────────────────────────────────

fn apply_start(session: &mut InterviewSession, now: DateTime<Utc>) -> Result<(), AppError> {
    if session.status != SessionStatus::Created {
        return Err(AppError::InvalidState(
            "interview already started".to_string(),
        ));
    }
    if session.questions.is_empty() {
        return Err(AppError::InvalidState(
            "interview has no questions".to_string(),
        ));
    }
    session.status = SessionStatus::InProgress;
    session.started_at = Some(now);
    Ok(())
}

/// Checks an answer submission against the session state and returns
/// the question being answered.
fn ensure_answerable(
    session: &InterviewSession,
    question_id: &str,
    response_text: &str,
) -> Result<InterviewQuestion, AppError> {
    if session.status == SessionStatus::Completed {
        return Err(AppError::InvalidState(
            "interview is already completed".to_string(),
        ));
    }
    if response_text.trim().is_empty() {
        return Err(AppError::Validation(
            "response_text must not be empty".to_string(),
        ));
    }
    let question = session.question(question_id).ok_or_else(|| {
        AppError::NotFound(format!("Question {question_id} not found in this interview"))
    })?;
    if session.is_answered(question_id) {
        return Err(AppError::InvalidState(format!(
            "Question {question_id} is already answered"
        )));
    }
    Ok(question.clone())
}

/// Appends the response. Answering a `created` session starts it
/// implicitly.
fn record_answer(session: &mut InterviewSession, response: InterviewResponse, now: DateTime<Utc>) {
    session.responses.push(response);
    if session.status == SessionStatus::Created {
        session.status = SessionStatus::InProgress;
        session.started_at.get_or_insert(now);
    }
}

/// Freezes the session with its aggregate results. Applying a second
/// completion leaves the stored record untouched.
fn apply_completion(
    session: &mut InterviewSession,
    overall_score: u8,
    category_scores: CategoryScores,
    narrative: OverallNarrative,
    completed_at: DateTime<Utc>,
) {
    if session.status == SessionStatus::Completed {
        return;
    }
    let total_duration_secs = session
        .started_at
        .map(|started| (completed_at - started).num_seconds().max(0) as u64)
        .unwrap_or(DEFAULT_SESSION_DURATION_SECS);

    session.overall_feedback = Some(OverallFeedback {
        overall_score,
        category_scores,
        summary: narrative.summary,
        key_strengths: narrative.key_strengths,
        areas_for_improvement: narrative.areas_for_improvement,
        recommendation: narrative.recommendation,
        total_duration_secs,
    });
    session.status = SessionStatus::Completed;
    session.completed_at = Some(completed_at);
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

pub async fn start_session(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<InterviewSession, AppError> {
    let mut session = load_session(db, id, user_id).await?;
    apply_start(&mut session, Utc::now())?;
    persist(db, &session).await?;
    Ok(session)
}

/// Scores one answer and appends it to the session.
pub async fn submit_answer(
    db: &PgPool,
    gateway: &dyn AiGateway,
    id: Uuid,
    user_id: Uuid,
    question_id: &str,
    response_text: &str,
    code: Option<&str>,
    response_time_secs: u64,
) -> Result<AnswerOutcome, AppError> {
    let mut session = load_session(db, id, user_id).await?;
    let question = ensure_answerable(&session, question_id, response_text)?;

    let feedback =
        feedback::answer_feedback(gateway, &question, response_text, code, response_time_secs)
            .await;

    let now = Utc::now();
    let response = InterviewResponse {
        question_id: question.question_id.clone(),
        response_text: response_text.to_string(),
        code: code.map(str::to_string),
        response_time_secs,
        feedback: feedback.clone(),
        submitted_at: now,
    };
    record_answer(&mut session, response, now);
    persist(db, &session).await?;

    Ok(AnswerOutcome {
        feedback,
        current_question_index: session.current_question_index(),
        total_questions: session.questions.len(),
        completed: session.all_answered(),
    })
}

/// Freezes the session with aggregate scores and a closing narrative.
/// Completing an already-completed session returns the stored result
/// unchanged, so repeated calls are safe.
pub async fn complete_session(
    db: &PgPool,
    gateway: &dyn AiGateway,
    id: Uuid,
    user_id: Uuid,
) -> Result<InterviewSession, AppError> {
    let mut session = load_session(db, id, user_id).await?;
    if session.status == SessionStatus::Completed {
        return Ok(session);
    }

    let (overall_score, category_scores) =
        feedback::aggregate_scores(&session.questions, &session.responses);
    let narrative = feedback::overall_narrative(
        gateway,
        &session.questions,
        &session.responses,
        overall_score,
    )
    .await;

    apply_completion(
        &mut session,
        overall_score,
        category_scores,
        narrative,
        Utc::now(),
    );
    persist(db, &session).await?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::{Difficulty, QuestionType};

    fn make_question(id: &str) -> InterviewQuestion {
        InterviewQuestion {
            question_id: id.to_string(),
            question_type: QuestionType::Behavioral,
            question: "Tell me about a time you disagreed with a teammate.".to_string(),
            category: "Teamwork".to_string(),
            difficulty: Difficulty::Medium,
            expected_duration_secs: 180,
            starter_code: None,
        }
    }

    fn make_feedback(score: u8) -> FeedbackResult {
        FeedbackResult {
            score,
            strengths: vec!["Concrete example".to_string()],
            improvements: vec!["Add the outcome".to_string()],
            detailed_analysis: "Reasonable answer.".to_string(),
            communication_clarity: 6,
            technical_accuracy: 5,
            structured_response: 6,
            code_quality: None,
            time_efficiency: Some(8),
        }
    }

    fn make_response(question_id: &str, now: DateTime<Utc>) -> InterviewResponse {
        InterviewResponse {
            question_id: question_id.to_string(),
            response_text: "We talked it through and ran an experiment.".to_string(),
            code: None,
            response_time_secs: 90,
            feedback: make_feedback(70),
            submitted_at: now,
        }
    }

    fn make_session(question_ids: &[&str]) -> InterviewSession {
        InterviewSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            job_description: "Backend engineer".to_string(),
            status: SessionStatus::Created,
            questions: question_ids.iter().map(|id| make_question(id)).collect(),
            responses: vec![],
            started_at: None,
            completed_at: None,
            overall_feedback: None,
        }
    }

    fn make_narrative() -> OverallNarrative {
        OverallNarrative {
            summary: "A solid interview.".to_string(),
            key_strengths: vec!["Concrete examples".to_string()],
            areas_for_improvement: vec!["Quantify outcomes".to_string()],
            recommendation: "Practice weekly.".to_string(),
        }
    }

    #[test]
    fn test_start_transitions_created_to_in_progress() {
        let mut session = make_session(&["q1"]);
        let now = Utc::now();
        apply_start(&mut session, now).unwrap();
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.started_at, Some(now));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut session = make_session(&["q1"]);
        apply_start(&mut session, Utc::now()).unwrap();
        let err = apply_start(&mut session, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_start_without_questions_is_rejected() {
        let mut session = make_session(&[]);
        let err = apply_start(&mut session, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_answer_requires_known_question() {
        let session = make_session(&["q1"]);
        let err = ensure_answerable(&session, "q9", "a real answer").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_answer_requires_non_empty_text() {
        let session = make_session(&["q1"]);
        let err = ensure_answerable(&session, "q1", "   ").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_duplicate_answer_is_rejected() {
        let mut session = make_session(&["q1", "q2"]);
        let now = Utc::now();
        record_answer(&mut session, make_response("q1", now), now);
        let err = ensure_answerable(&session, "q1", "second attempt").unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(session.responses.len(), 1);
        // q2 is still answerable.
        assert!(ensure_answerable(&session, "q2", "next answer").is_ok());
    }

    #[test]
    fn test_completed_session_rejects_answers() {
        let mut session = make_session(&["q1"]);
        apply_completion(
            &mut session,
            0,
            CategoryScores {
                behavioral: 0,
                technical: 0,
                coding: 0,
            },
            make_narrative(),
            Utc::now(),
        );
        let err = ensure_answerable(&session, "q1", "too late").unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_first_answer_auto_starts_session() {
        let mut session = make_session(&["q1", "q2"]);
        let now = Utc::now();
        record_answer(&mut session, make_response("q1", now), now);
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.started_at, Some(now));
        assert_eq!(session.current_question_index(), 1);

        // A later answer does not move started_at.
        let later = now + chrono::Duration::seconds(60);
        record_answer(&mut session, make_response("q2", later), later);
        assert_eq!(session.started_at, Some(now));
        assert_eq!(session.responses.len(), 2);
    }

    #[test]
    fn test_completion_freezes_session() {
        let mut session = make_session(&["q1"]);
        let started = Utc::now();
        apply_start(&mut session, started).unwrap();
        record_answer(&mut session, make_response("q1", started), started);

        let completed_at = started + chrono::Duration::seconds(600);
        apply_completion(
            &mut session,
            70,
            CategoryScores {
                behavioral: 70,
                technical: 70,
                coding: 70,
            },
            make_narrative(),
            completed_at,
        );

        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.completed_at, Some(completed_at));
        let overall = session.overall_feedback.as_ref().unwrap();
        assert_eq!(overall.overall_score, 70);
        assert_eq!(overall.total_duration_secs, 600);
        assert_eq!(overall.summary, "A solid interview.");
    }

    #[test]
    fn test_repeat_completion_keeps_first_results() {
        let mut session = make_session(&["q1"]);
        let started = Utc::now();
        apply_start(&mut session, started).unwrap();
        record_answer(&mut session, make_response("q1", started), started);

        let first_completed_at = started + chrono::Duration::seconds(300);
        apply_completion(
            &mut session,
            70,
            CategoryScores {
                behavioral: 70,
                technical: 70,
                coding: 70,
            },
            make_narrative(),
            first_completed_at,
        );
        let frozen_feedback = session.overall_feedback.clone();
        let frozen_responses = session.responses.clone();

        // A later completion attempt with different inputs changes nothing.
        apply_completion(
            &mut session,
            10,
            CategoryScores {
                behavioral: 10,
                technical: 10,
                coding: 10,
            },
            OverallNarrative {
                summary: "A different debrief.".to_string(),
                key_strengths: vec![],
                areas_for_improvement: vec![],
                recommendation: "Ignore this.".to_string(),
            },
            first_completed_at + chrono::Duration::seconds(900),
        );

        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.completed_at, Some(first_completed_at));
        assert_eq!(session.overall_feedback, frozen_feedback);
        assert_eq!(session.responses, frozen_responses);
    }

    #[test]
    fn test_completion_without_start_uses_default_duration() {
        let mut session = make_session(&["q1"]);
        apply_completion(
            &mut session,
            0,
            CategoryScores {
                behavioral: 0,
                technical: 0,
                coding: 0,
            },
            make_narrative(),
            Utc::now(),
        );
        let overall = session.overall_feedback.as_ref().unwrap();
        assert_eq!(overall.total_duration_secs, DEFAULT_SESSION_DURATION_SECS);
    }
}
