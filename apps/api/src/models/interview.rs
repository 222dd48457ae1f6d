use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Question kind. Creation policy is a fixed 3/4/3 split across the
/// three kinds, ten questions per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Behavioral,
    Technical,
    Coding,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Behavioral => "behavioral",
            QuestionType::Technical => "technical",
            QuestionType::Coding => "coding",
        }
    }

    /// Expected answer duration when the generator did not supply one.
    pub fn default_duration_secs(&self) -> u32 {
        match self {
            QuestionType::Behavioral => 180,
            QuestionType::Technical => 240,
            QuestionType::Coding => 900,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
}

/// A generated interview question. Immutable once the session exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question_id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub expected_duration_secs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<HashMap<String, String>>,
}

/// Feedback for one submitted answer. Sub-scores are 1..=10;
/// `code_quality`/`time_efficiency` are present only where they apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub detailed_analysis: String,
    pub communication_clarity: u8,
    pub technical_accuracy: u8,
    pub structured_response: u8,
    pub code_quality: Option<u8>,
    pub time_efficiency: Option<u8>,
}

/// One answered question. Appended in submission order, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub question_id: String,
    pub response_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub response_time_secs: u64,
    pub feedback: FeedbackResult,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(SessionStatus::Created),
            "in_progress" => Some(SessionStatus::InProgress),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

/// Per-category score averages for the completed-session summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub behavioral: u8,
    pub technical: u8,
    pub coding: u8,
}

/// Aggregate feedback computed at completion and frozen with the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallFeedback {
    pub overall_score: u8,
    pub category_scores: CategoryScores,
    pub summary: String,
    pub key_strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendation: String,
    pub total_duration_secs: u64,
}

/// Full interview session state. Lifecycle transitions live in
/// `interview::session`; this type only carries data and derived reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_description: String,
    pub status: SessionStatus,
    pub questions: Vec<InterviewQuestion>,
    pub responses: Vec<InterviewResponse>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub overall_feedback: Option<OverallFeedback>,
}

impl InterviewSession {
    /// Derived, never stored: the next question to answer is always at
    /// `responses.len()`.
    pub fn current_question_index(&self) -> usize {
        self.responses.len()
    }

    pub fn question(&self, question_id: &str) -> Option<&InterviewQuestion> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.responses.iter().any(|r| r.question_id == question_id)
    }

    pub fn all_answered(&self) -> bool {
        self.responses.len() >= self.questions.len()
    }
}

/// Database row for a session. `questions` / `responses` /
/// `overall_feedback` are JSONB payloads of the domain types above.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_description: String,
    pub status: String,
    pub questions: Value,
    pub responses: Value,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub overall_feedback: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection: counts instead of full question/response payloads.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionSummaryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub question_count: i32,
    pub answered_count: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_question(id: &str) -> InterviewQuestion {
        InterviewQuestion {
            question_id: id.to_string(),
            question_type: QuestionType::Technical,
            question: "Explain the difference between a process and a thread.".to_string(),
            category: "Operating Systems".to_string(),
            difficulty: Difficulty::Easy,
            expected_duration_secs: 180,
            starter_code: None,
        }
    }

    fn make_feedback(score: u8) -> FeedbackResult {
        FeedbackResult {
            score,
            strengths: vec!["Clear explanation".to_string()],
            improvements: vec![],
            detailed_analysis: "Solid answer.".to_string(),
            communication_clarity: 7,
            technical_accuracy: 7,
            structured_response: 6,
            code_quality: None,
            time_efficiency: Some(8),
        }
    }

    #[test]
    fn test_question_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&QuestionType::Behavioral).unwrap(),
            r#""behavioral""#
        );
        assert_eq!(
            serde_json::to_string(&QuestionType::Coding).unwrap(),
            r#""coding""#
        );
    }

    #[test]
    fn test_question_json_uses_type_field() {
        let q = make_question("q1");
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "technical");
        assert!(value.get("question_type").is_none());
        assert!(value.get("starter_code").is_none());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            SessionStatus::Created,
            SessionStatus::InProgress,
            SessionStatus::Completed,
        ] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_current_question_index_tracks_responses() {
        let mut session = InterviewSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            job_description: "Backend role".to_string(),
            status: SessionStatus::InProgress,
            questions: vec![make_question("q1"), make_question("q2")],
            responses: vec![],
            started_at: Some(Utc::now()),
            completed_at: None,
            overall_feedback: None,
        };
        assert_eq!(session.current_question_index(), 0);

        session.responses.push(InterviewResponse {
            question_id: "q1".to_string(),
            response_text: "A process has its own address space.".to_string(),
            code: None,
            response_time_secs: 90,
            feedback: make_feedback(70),
            submitted_at: Utc::now(),
        });
        assert_eq!(session.current_question_index(), 1);
        assert!(session.is_answered("q1"));
        assert!(!session.is_answered("q2"));
        assert!(!session.all_answered());
    }
}
