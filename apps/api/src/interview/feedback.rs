//! Answer feedback: model-backed first, deterministic heuristics when
//! the model fails or returns junk.
//!
//! The heuristic scorer is the compatibility-critical piece. It reads
//! fixed signals out of the answer text and code, accrues points per
//! signal, and applies hard caps: throwaway answers never score above
//! 15, placeholder code never above 25, and everything lands in [5, 95].

use tracing::warn;

use crate::ai::gateway::{AiGateway, InvokeOptions};
use crate::ai::normalize::{normalize_feedback, normalize_overall, OverallNarrative};
use crate::ai::prompts::{self, PromptKind};
use crate::keywords;
use crate::models::interview::{
    CategoryScores, FeedbackResult, InterviewQuestion, InterviewResponse, QuestionType,
};
use crate::scoring;

const RUBBISH_MAX_SCORE: u32 = 15;
const PLACEHOLDER_CODE_MAX_SCORE: u32 = 25;
const FLOOR_SCORE: u32 = 5;
const CEILING_SCORE: u32 = 95;
const NON_RUBBISH_FLOOR: u32 = 15;

const RUBBISH_MIN_CHARS: usize = 10;
const RUBBISH_MIN_WORDS: usize = 3;
const PLACEHOLDER_CODE_MIN_CHARS: usize = 20;

const LEARNING_TERMS: &[&str] = &[
    "learned",
    "learning",
    "improved",
    "realized",
    "grew",
    "took away",
    "adapted",
    "in hindsight",
];

const EXAMPLE_TERMS: &[&str] = &[
    "for example",
    "for instance",
    "in my previous",
    "at my last",
    "in one project",
    "one time",
    "specifically",
    "we had a",
];

const TEAMWORK_TERMS: &[&str] = &[
    "team",
    "collaborat",
    "together",
    "stakeholder",
    "pair",
    "mentor",
];

/// Computes feedback for one answer: a model call first, falling back
/// to [`basic_feedback`] on any gateway or normalization failure.
pub async fn answer_feedback(
    gateway: &dyn AiGateway,
    question: &InterviewQuestion,
    response_text: &str,
    code: Option<&str>,
    response_time_secs: u64,
) -> FeedbackResult {
    let built = prompts::build(PromptKind::AnswerFeedback {
        question,
        response_text,
        code,
        response_time_secs,
    });

    let is_coding = question.question_type == QuestionType::Coding;
    match gateway
        .invoke(&built.prompt, built.system, InvokeOptions::default())
        .await
    {
        Ok(raw) => match normalize_feedback(&raw, is_coding) {
            Some(feedback) => feedback,
            None => {
                warn!("feedback completion unusable, scoring with heuristics");
                basic_feedback(question, response_text, code, response_time_secs)
            }
        },
        Err(e) => {
            warn!(error = %e, "feedback call failed, scoring with heuristics");
            basic_feedback(question, response_text, code, response_time_secs)
        }
    }
}

/// Deterministic heuristic scorer. Same inputs always produce the same
/// feedback; no model involvement.
pub fn basic_feedback(
    question: &InterviewQuestion,
    response_text: &str,
    code: Option<&str>,
    response_time_secs: u64,
) -> FeedbackResult {
    let text = response_text.trim();
    let lower = text.to_lowercase();
    let char_count = text.chars().count();
    let word_count = text.split_whitespace().count();

    let is_rubbish = char_count < RUBBISH_MIN_CHARS || word_count < RUBBISH_MIN_WORDS;
    let is_coding = question.question_type == QuestionType::Coding;
    let code_text = code.map(str::trim).unwrap_or("");
    let code_lower = code_text.to_lowercase();
    let placeholder_code = is_coding && is_placeholder_code(code_text);

    // Signals.
    let length_points: u32 = if char_count >= 300 {
        30
    } else if char_count >= 150 {
        25
    } else if char_count >= 50 {
        15
    } else {
        0
    };
    let vocab_hits = keywords::extract(text).len();
    let vocab_points: u32 = if vocab_hits >= 3 {
        25
    } else if vocab_hits >= 1 {
        15
    } else {
        0
    };
    let has_learning = LEARNING_TERMS.iter().any(|t| lower.contains(t));
    let has_example = EXAMPLE_TERMS.iter().any(|t| lower.contains(t));
    let has_teamwork = TEAMWORK_TERMS.iter().any(|t| lower.contains(t));
    let within_time = response_time_secs <= u64::from(question.expected_duration_secs);

    let has_function = ["fn ", "def ", "function", "class ", "=>"]
        .iter()
        .any(|t| code_lower.contains(t));
    let has_comments = ["//", "#", "/*"].iter().any(|t| code_text.contains(t));
    let has_return_logic = code_lower.contains("return")
        && ["if", "for", "while", "match", "switch"]
            .iter()
            .any(|t| code_lower.contains(t));
    let has_iteration = ["for", "while", ".map(", ".foreach", "loop"]
        .iter()
        .any(|t| code_lower.contains(t));

    // Accrual.
    let mut score: u32 = length_points + vocab_points;
    if has_learning {
        score += 15;
    }
    if has_example {
        score += 15;
    }
    if has_teamwork {
        score += 8;
    }
    if is_coding && !placeholder_code {
        if has_function {
            score += 10;
        }
        if has_comments {
            score += 5;
        }
        if has_return_logic {
            score += 10;
        }
        if has_iteration {
            score += 5;
        }
    }
    if within_time {
        score += 10;
    }

    // Caps.
    if is_rubbish {
        score = score.min(RUBBISH_MAX_SCORE);
    } else {
        if placeholder_code {
            score = score.min(PLACEHOLDER_CODE_MAX_SCORE);
        }
        score = score.max(NON_RUBBISH_FLOOR);
    }
    let score = score.clamp(FLOOR_SCORE, CEILING_SCORE) as u8;

    // Sub-scores.
    let communication_clarity = if is_rubbish {
        2
    } else {
        let mut v = 5u8;
        if length_points >= 25 {
            v += 2;
        } else if length_points >= 15 {
            v += 1;
        }
        if has_example {
            v += 1;
        }
        v.min(10)
    };
    let technical_accuracy = if is_rubbish {
        2
    } else {
        let mut v = 4u8;
        if vocab_points >= 25 {
            v += 4;
        } else if vocab_points >= 15 {
            v += 2;
        }
        if is_coding && has_return_logic {
            v += 1;
        }
        v.min(10)
    };
    let structured_response = if is_rubbish {
        1
    } else {
        let mut v = 4u8;
        if has_example {
            v += 2;
        }
        if has_learning {
            v += 1;
        }
        if has_teamwork {
            v += 1;
        }
        v.min(10)
    };
    let code_quality = if !is_coding {
        None
    } else if placeholder_code {
        Some(2)
    } else {
        let mut v = 3u8;
        if has_function {
            v += 2;
        }
        if has_comments {
            v += 1;
        }
        if has_return_logic {
            v += 2;
        }
        if has_iteration {
            v += 1;
        }
        Some(v.min(10))
    };
    let expected = u64::from(question.expected_duration_secs);
    let time_efficiency = Some(if response_time_secs <= expected {
        8
    } else if response_time_secs <= expected.saturating_mul(2) {
        6
    } else {
        3
    });

    // Narrative.
    let mut strengths: Vec<String> = Vec::new();
    let mut improvements: Vec<String> = Vec::new();
    if is_rubbish {
        improvements.push(
            "Give a complete answer; a few words is not enough for an interviewer to evaluate."
                .to_string(),
        );
        improvements.push(
            "Structure your response around the situation, your actions, and the result."
                .to_string(),
        );
    } else {
        if length_points >= 15 {
            strengths.push("Gave a substantive, detailed response.".to_string());
        } else {
            improvements
                .push("Expand the answer with more detail about what you did and why.".to_string());
        }
        if vocab_points > 0 {
            strengths.push("Used relevant technical vocabulary.".to_string());
        } else {
            improvements.push("Name the specific technologies and tools you used.".to_string());
        }
        if has_example {
            strengths.push("Backed the answer with a concrete example.".to_string());
        } else {
            improvements.push("Add a concrete example from your own experience.".to_string());
        }
        if has_learning {
            strengths.push("Reflected on lessons learned.".to_string());
        }
        if has_teamwork {
            strengths.push("Highlighted collaboration with others.".to_string());
        }
        if is_coding {
            if placeholder_code {
                improvements.push(
                    "Write working code; a placeholder cannot be evaluated.".to_string(),
                );
            } else {
                if has_function {
                    strengths.push("Organized the code into functions.".to_string());
                }
                if !has_comments {
                    improvements.push("Comment the key steps of the solution.".to_string());
                }
            }
        }
        if within_time {
            strengths.push("Answered within the expected time.".to_string());
        } else {
            improvements.push("Practice delivering the same content more concisely.".to_string());
        }
    }

    let detailed_analysis = if is_rubbish {
        format!(
            "The response is too short to evaluate ({word_count} words). \
             Interviewers need enough substance to judge both your experience \
             and your communication."
        )
    } else {
        let mut analysis = format!(
            "The answer shows {} of the signals expected for a {} question.",
            strengths.len(),
            question.question_type.as_str()
        );
        if let Some(first) = improvements.first() {
            analysis.push_str(" Main gap: ");
            analysis.push_str(first);
        }
        analysis
    };

    FeedbackResult {
        score,
        strengths,
        improvements,
        detailed_analysis,
        communication_clarity,
        technical_accuracy,
        structured_response,
        code_quality,
        time_efficiency,
    }
}

/// Empty, trivially short, or comment-only code cannot be assessed.
fn is_placeholder_code(code: &str) -> bool {
    let trimmed = code.trim();
    if trimmed.is_empty() || trimmed.chars().count() < PLACEHOLDER_CODE_MIN_CHARS {
        return true;
    }
    trimmed.lines().filter(|l| !l.trim().is_empty()).all(|l| {
        let l = l.trim();
        l.starts_with("//") || l.starts_with('#') || l.starts_with("/*") || l.starts_with('*')
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregate (session completion)
// ────────────────────────────────────────────────────────────────────────────

/// Overall and per-category scores for a finished session, computed
/// locally from the stored per-answer feedback.
pub fn aggregate_scores(
    questions: &[InterviewQuestion],
    responses: &[InterviewResponse],
) -> (u8, CategoryScores) {
    let scored: Vec<(QuestionType, u8)> = responses
        .iter()
        .filter_map(|r| {
            questions
                .iter()
                .find(|q| q.question_id == r.question_id)
                .map(|q| (q.question_type, r.feedback.score))
        })
        .collect();

    (
        scoring::overall_average(&scored),
        scoring::category_rollups(&scored),
    )
}

/// Requests the closing narrative from the model; per-question results
/// go in as JSON, scores stay local either way.
pub async fn overall_narrative(
    gateway: &dyn AiGateway,
    questions: &[InterviewQuestion],
    responses: &[InterviewResponse],
    overall_score: u8,
) -> OverallNarrative {
    let digest: Vec<serde_json::Value> = responses
        .iter()
        .map(|r| {
            let question_type = questions
                .iter()
                .find(|q| q.question_id == r.question_id)
                .map(|q| q.question_type.as_str())
                .unwrap_or("technical");
            serde_json::json!({
                "question_id": r.question_id,
                "type": question_type,
                "score": r.feedback.score,
                "strengths": r.feedback.strengths,
                "improvements": r.feedback.improvements,
            })
        })
        .collect();
    let summary_json = serde_json::to_string(&digest).unwrap_or_else(|_| "[]".to_string());

    let built = prompts::build(PromptKind::OverallFeedback {
        summary_json: &summary_json,
    });
    match gateway
        .invoke(&built.prompt, built.system, InvokeOptions::default())
        .await
    {
        Ok(raw) => normalize_overall(&raw)
            .unwrap_or_else(|| fallback_narrative(overall_score, responses)),
        Err(e) => {
            warn!(error = %e, "debrief call failed, using banded narrative");
            fallback_narrative(overall_score, responses)
        }
    }
}

/// Deterministic closing narrative banded by the overall score, with
/// strengths and improvements pooled from the per-answer feedback.
pub fn fallback_narrative(overall_score: u8, responses: &[InterviewResponse]) -> OverallNarrative {
    let (summary, recommendation) = match overall_score {
        80..=100 => (
            "An excellent interview. Answers were consistently substantive and well grounded \
             in real experience.",
            "Keep the momentum with one full mock interview a week and start rehearsing \
             role-specific stories.",
        ),
        60..=79 => (
            "A solid interview with clear strengths and a few recurring gaps across answers.",
            "Target the recurring improvement areas below in your next two practice sessions.",
        ),
        40..=59 => (
            "A developing performance. Several answers landed, but depth and structure were \
             uneven across the session.",
            "Practice the STAR structure aloud and prepare three concrete project stories \
             before the next session.",
        ),
        _ => (
            "An early-stage performance. Most answers were too thin for an interviewer to \
             evaluate fairly.",
            "Start with written answers to common questions, then practice delivering them \
             aloud within the expected time.",
        ),
    };

    OverallNarrative {
        summary: summary.to_string(),
        key_strengths: pool_distinct(responses.iter().flat_map(|r| &r.feedback.strengths)),
        areas_for_improvement: pool_distinct(
            responses.iter().flat_map(|r| &r.feedback.improvements),
        ),
        recommendation: recommendation.to_string(),
    }
}

/// First-seen order, deduplicated, capped at four items.
fn pool_distinct<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
        if seen.len() == 4 {
            break;
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::Difficulty;
    use chrono::Utc;

    fn make_question(question_type: QuestionType) -> InterviewQuestion {
        InterviewQuestion {
            question_id: "q1".to_string(),
            question_type,
            question: "Tell me about a challenging project.".to_string(),
            category: "General".to_string(),
            difficulty: Difficulty::Medium,
            expected_duration_secs: question_type.default_duration_secs(),
            starter_code: None,
        }
    }

    fn make_response(question_id: &str, feedback: FeedbackResult) -> InterviewResponse {
        InterviewResponse {
            question_id: question_id.to_string(),
            response_text: "answer".to_string(),
            code: None,
            response_time_secs: 60,
            feedback,
            submitted_at: Utc::now(),
        }
    }

    const GOOD_BEHAVIORAL_ANSWER: &str = "In my previous role we had a production incident two days \
        before a release. I coordinated with the team to split the investigation, and together we \
        traced it to a misconfigured cache. For example, I wrote a script to replay traffic against \
        staging, which confirmed the fix. I learned to add configuration checks to our release \
        checklist, and we improved the deploy process afterwards.";

    #[test]
    fn test_rubbish_answer_capped_at_fifteen() {
        let question = make_question(QuestionType::Behavioral);
        let feedback = basic_feedback(&question, "ok", None, 30);
        assert!(feedback.score <= 15);
        assert!(feedback.score >= 5);
        assert!(!feedback.improvements.is_empty());
    }

    #[test]
    fn test_two_word_answer_is_rubbish_even_when_long_enough() {
        let question = make_question(QuestionType::Behavioral);
        let feedback = basic_feedback(&question, "absolutely wonderful", None, 30);
        assert!(feedback.score <= 15);
    }

    #[test]
    fn test_substantive_answer_scores_well() {
        let question = make_question(QuestionType::Behavioral);
        let feedback = basic_feedback(&question, GOOD_BEHAVIORAL_ANSWER, None, 120);
        assert!(feedback.score >= 50, "score was {}", feedback.score);
        assert!(feedback.score <= 95);
        assert!(feedback.strengths.len() >= 3);
        for sub in [
            feedback.communication_clarity,
            feedback.technical_accuracy,
            feedback.structured_response,
        ] {
            assert!((1..=10).contains(&sub));
        }
        assert!(feedback.code_quality.is_none());
    }

    #[test]
    fn test_placeholder_code_capped_at_twenty_five() {
        let question = make_question(QuestionType::Coding);
        let answer = "I would iterate over the characters and count occurrences in a map, \
            then scan again for the first count of one.";
        let feedback = basic_feedback(&question, answer, Some("// your code here"), 300);
        assert!(feedback.score <= 25);
        assert_eq!(feedback.code_quality, Some(2));
    }

    #[test]
    fn test_empty_code_is_placeholder() {
        let question = make_question(QuestionType::Coding);
        let answer = "The approach is a two pass scan with a frequency map over the string.";
        let feedback = basic_feedback(&question, answer, None, 300);
        assert_eq!(feedback.code_quality, Some(2));
        assert!(feedback.score <= 25);
    }

    #[test]
    fn test_real_code_earns_structural_points() {
        let question = make_question(QuestionType::Coding);
        let answer = "I count character frequencies in one pass, then return the first \
            character whose count is one. This keeps it linear in the string length.";
        let code = "def first_unique_char(s):\n    # count frequencies first\n    counts = {}\n    \
            for ch in s:\n        counts[ch] = counts.get(ch, 0) + 1\n    for ch in s:\n        \
            if counts[ch] == 1:\n            return ch\n    return None\n";
        let feedback = basic_feedback(&question, answer, Some(code), 400);
        assert!(feedback.code_quality.unwrap() >= 5);
        assert!(feedback.score > 25);
        assert!(feedback
            .strengths
            .iter()
            .any(|s| s.contains("Organized the code")));
    }

    #[test]
    fn test_time_bonus_rewards_staying_within_duration() {
        let question = make_question(QuestionType::Behavioral);
        let quick = basic_feedback(&question, GOOD_BEHAVIORAL_ANSWER, None, 100);
        let slow = basic_feedback(&question, GOOD_BEHAVIORAL_ANSWER, None, 900);
        assert!(quick.score > slow.score);
        assert!(quick.time_efficiency.unwrap() > slow.time_efficiency.unwrap());
    }

    #[test]
    fn test_determinism() {
        let question = make_question(QuestionType::Behavioral);
        let a = basic_feedback(&question, GOOD_BEHAVIORAL_ANSWER, None, 120);
        let b = basic_feedback(&question, GOOD_BEHAVIORAL_ANSWER, None, 120);
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_placeholder_code_variants() {
        assert!(is_placeholder_code(""));
        assert!(is_placeholder_code("   "));
        assert!(is_placeholder_code("x = 1"));
        assert!(is_placeholder_code(
            "// your code here\n// implement the function"
        ));
        assert!(!is_placeholder_code(
            "def solve(items):\n    return sorted(items)[0]"
        ));
    }

    #[test]
    fn test_aggregate_scores_rolls_up_by_category() {
        let mut q_behavioral = make_question(QuestionType::Behavioral);
        q_behavioral.question_id = "q1".to_string();
        let mut q_technical = make_question(QuestionType::Technical);
        q_technical.question_id = "q2".to_string();
        let questions = vec![q_behavioral.clone(), q_technical.clone()];

        let feedback_80 = basic_feedback(&q_behavioral, GOOD_BEHAVIORAL_ANSWER, None, 60);
        let mut fb_a = feedback_80.clone();
        fb_a.score = 80;
        let mut fb_b = feedback_80;
        fb_b.score = 60;

        let responses = vec![make_response("q1", fb_a), make_response("q2", fb_b)];
        let (overall, categories) = aggregate_scores(&questions, &responses);
        assert_eq!(overall, 70);
        assert_eq!(categories.behavioral, 80);
        assert_eq!(categories.technical, 60);
        // No coding answers: the rollup falls back to the overall mean.
        assert_eq!(categories.coding, 70);
    }

    #[test]
    fn test_fallback_narrative_bands() {
        assert!(fallback_narrative(85, &[]).summary.contains("excellent"));
        assert!(fallback_narrative(70, &[]).summary.contains("solid"));
        assert!(fallback_narrative(45, &[]).summary.contains("developing"));
        assert!(fallback_narrative(20, &[]).summary.contains("early-stage"));
    }

    #[test]
    fn test_fallback_narrative_pools_distinct_feedback() {
        let question = make_question(QuestionType::Behavioral);
        let feedback = basic_feedback(&question, GOOD_BEHAVIORAL_ANSWER, None, 60);
        let responses = vec![
            make_response("q1", feedback.clone()),
            make_response("q2", feedback),
        ];
        let narrative = fallback_narrative(70, &responses);
        assert!(!narrative.key_strengths.is_empty());
        assert!(narrative.key_strengths.len() <= 4);
        // Identical strengths from both answers collapse to one entry each.
        let mut sorted = narrative.key_strengths.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), narrative.key_strengths.len());
    }
}
