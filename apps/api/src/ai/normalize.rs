//! Response normalization — turns possibly-noisy model output into
//! well-formed domain values.
//!
//! Models wrap JSON in prose, fence it in markdown, or return junk.
//! Every function here is total over its input string: strip fences,
//! detect the non-technical sentinel before any parse, locate the first
//! balanced JSON candidate, and when parsing fails fall back to
//! rule-based text extraction or a static default. Nothing downstream
//! ever sees untyped data or a parse error.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::ai::prompts::NON_TECH_SENTINEL;
use crate::models::interview::{Difficulty, FeedbackResult, InterviewQuestion, QuestionType};

const MAX_LIST_ITEMS: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Match analysis
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of normalizing a match-analysis completion.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchAnalysisOutcome {
    NonTechnicalRole,
    Analysis(AnalysisContent),
}

/// The narrative half of a [`crate::models::analysis::MatchResult`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisContent {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub content_weaknesses: Vec<String>,
    #[serde(default)]
    pub structure_weaknesses: Vec<String>,
    #[serde(default)]
    pub content_recommendations: Vec<String>,
    #[serde(default)]
    pub structure_recommendations: Vec<String>,
}

impl AnalysisContent {
    fn is_empty(&self) -> bool {
        self.strengths.is_empty()
            && self.content_weaknesses.is_empty()
            && self.structure_weaknesses.is_empty()
            && self.content_recommendations.is_empty()
            && self.structure_recommendations.is_empty()
    }

    fn cleaned(mut self) -> Self {
        self.strengths = clean_list(self.strengths);
        self.content_weaknesses = clean_list(self.content_weaknesses);
        self.structure_weaknesses = clean_list(self.structure_weaknesses);
        self.content_recommendations = clean_list(self.content_recommendations);
        self.structure_recommendations = clean_list(self.structure_recommendations);
        self
    }

    /// Static last-resort payload when neither JSON nor bullet
    /// extraction produced anything usable.
    pub fn fallback() -> Self {
        Self {
            strengths: vec![
                "Your resume contains relevant professional experience.".to_string(),
            ],
            content_weaknesses: vec![
                "A detailed comparison could not be generated for this submission.".to_string(),
            ],
            structure_weaknesses: Vec::new(),
            content_recommendations: vec![
                "Mirror the key skills named in the job description in your resume wording."
                    .to_string(),
            ],
            structure_recommendations: vec![
                "Lead with a concise summary section followed by your most recent experience."
                    .to_string(),
            ],
        }
    }
}

/// Normalizes a match-analysis completion. Total: junk input yields the
/// static fallback content, never an error.
pub fn normalize_match_analysis(raw: &str) -> MatchAnalysisOutcome {
    let stripped = strip_code_fences(raw);

    if stripped.contains(NON_TECH_SENTINEL) {
        return MatchAnalysisOutcome::NonTechnicalRole;
    }

    if let Some(content) = parse_first_json::<AnalysisContent>(stripped) {
        let content = content.cleaned();
        if !content.is_empty() {
            return MatchAnalysisOutcome::Analysis(content);
        }
    }

    let extracted = extract_bulleted_sections(stripped);
    if !extracted.is_empty() {
        debug!("analysis JSON parse failed, recovered content from bullet lines");
        return MatchAnalysisOutcome::Analysis(extracted.cleaned());
    }

    debug!("analysis completion unusable, substituting static fallback");
    MatchAnalysisOutcome::Analysis(AnalysisContent::fallback())
}

// ────────────────────────────────────────────────────────────────────────────
// Similarity
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of normalizing a similarity completion. `Unusable` tells the
/// caller to fall back to keyword-overlap similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimilarityOutcome {
    NonTechnicalRole,
    Score(f64),
    Unusable,
}

#[derive(Debug, Deserialize)]
struct SimilarityPayload {
    similarity: f64,
}

pub fn normalize_similarity(raw: &str) -> SimilarityOutcome {
    let stripped = strip_code_fences(raw);

    if stripped.contains(NON_TECH_SENTINEL) {
        return SimilarityOutcome::NonTechnicalRole;
    }

    if let Some(payload) = parse_first_json::<SimilarityPayload>(stripped) {
        if payload.similarity.is_finite() {
            return SimilarityOutcome::Score(payload.similarity.clamp(0.0, 1.0));
        }
    }

    // Some models answer with the bare number despite instructions.
    if let Ok(value) = stripped.trim().parse::<f64>() {
        if value.is_finite() {
            return SimilarityOutcome::Score(value.clamp(0.0, 1.0));
        }
    }

    SimilarityOutcome::Unusable
}

// ────────────────────────────────────────────────────────────────────────────
// Interview questions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question_id: Option<String>,
    #[serde(default, rename = "type")]
    question_type: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    expected_duration_secs: Option<u32>,
    #[serde(default)]
    starter_code: Option<HashMap<String, String>>,
}

/// Normalizes a question-generation completion into zero or more usable
/// questions. Entries without question text are dropped; missing or
/// unrecognized fields are coerced to defaults. The caller owns the
/// exactly-ten guarantee and reassigns sequential ids, so ids here are
/// best-effort only.
pub fn normalize_questions(raw: &str) -> Vec<InterviewQuestion> {
    let stripped = strip_code_fences(raw);

    let Some(values) = parse_first_json::<Vec<serde_json::Value>>(stripped) else {
        return Vec::new();
    };

    values
        .into_iter()
        .filter_map(|value| serde_json::from_value::<RawQuestion>(value).ok())
        .filter_map(coerce_question)
        .collect()
}

fn coerce_question(raw: RawQuestion) -> Option<InterviewQuestion> {
    let question = raw.question?.trim().to_string();
    if question.is_empty() {
        return None;
    }

    let question_type = raw
        .question_type
        .as_deref()
        .and_then(parse_question_type)
        .unwrap_or(QuestionType::Technical);

    let difficulty = raw
        .difficulty
        .as_deref()
        .and_then(parse_difficulty)
        .unwrap_or(Difficulty::Medium);

    let expected_duration_secs = match raw.expected_duration_secs {
        Some(secs) if secs > 0 => secs,
        _ => question_type.default_duration_secs(),
    };

    let starter_code = match question_type {
        QuestionType::Coding => raw.starter_code.filter(|m| !m.is_empty()),
        _ => None,
    };

    Some(InterviewQuestion {
        question_id: raw.question_id.unwrap_or_default(),
        question_type,
        question,
        category: raw
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "General".to_string()),
        difficulty,
        expected_duration_secs,
        starter_code,
    })
}

fn parse_question_type(s: &str) -> Option<QuestionType> {
    match s.trim().to_lowercase().as_str() {
        "behavioral" => Some(QuestionType::Behavioral),
        "technical" => Some(QuestionType::Technical),
        "coding" => Some(QuestionType::Coding),
        _ => None,
    }
}

fn parse_difficulty(s: &str) -> Option<Difficulty> {
    match s.trim().to_lowercase().as_str() {
        "easy" => Some(Difficulty::Easy),
        "medium" => Some(Difficulty::Medium),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Answer feedback
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawFeedback {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    detailed_analysis: Option<String>,
    #[serde(default)]
    communication_clarity: Option<f64>,
    #[serde(default)]
    technical_accuracy: Option<f64>,
    #[serde(default)]
    structured_response: Option<f64>,
    #[serde(default)]
    code_quality: Option<f64>,
    #[serde(default)]
    time_efficiency: Option<f64>,
}

/// Normalizes an answer-feedback completion. Returns `None` when the
/// completion carries no usable score, which sends the caller to the
/// rule-based feedback generator.
pub fn normalize_feedback(raw: &str, is_coding: bool) -> Option<FeedbackResult> {
    let stripped = strip_code_fences(raw);
    let parsed = parse_first_json::<RawFeedback>(stripped)?;
    let score = clamp_score(parsed.score?);

    // Missing sub-scores are derived from the overall score.
    let derived = derive_subscore(score);
    let subscore = |value: Option<f64>| value.map(clamp_subscore).unwrap_or(derived);

    Some(FeedbackResult {
        score,
        strengths: clean_list(parsed.strengths),
        improvements: clean_list(parsed.improvements),
        detailed_analysis: parsed
            .detailed_analysis
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        communication_clarity: subscore(parsed.communication_clarity),
        technical_accuracy: subscore(parsed.technical_accuracy),
        structured_response: subscore(parsed.structured_response),
        code_quality: if is_coding {
            Some(subscore(parsed.code_quality))
        } else {
            None
        },
        time_efficiency: parsed.time_efficiency.map(clamp_subscore),
    })
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn clamp_subscore(value: f64) -> u8 {
    value.round().clamp(1.0, 10.0) as u8
}

fn derive_subscore(score: u8) -> u8 {
    (score / 10).clamp(1, 10)
}

// ────────────────────────────────────────────────────────────────────────────
// Overall debrief
// ────────────────────────────────────────────────────────────────────────────

/// Narrative half of the completion summary. Scores and durations are
/// computed locally, never taken from the model.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallNarrative {
    pub summary: String,
    pub key_strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Deserialize)]
struct RawOverall {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    key_strengths: Vec<String>,
    #[serde(default)]
    areas_for_improvement: Vec<String>,
    #[serde(default)]
    recommendation: Option<String>,
}

/// Returns `None` when the completion has no usable summary, sending
/// the caller to the rule-based aggregate.
pub fn normalize_overall(raw: &str) -> Option<OverallNarrative> {
    let stripped = strip_code_fences(raw);
    let parsed = parse_first_json::<RawOverall>(stripped)?;
    let summary = parsed.summary.map(|s| s.trim().to_string())?;
    if summary.is_empty() {
        return None;
    }

    Some(OverallNarrative {
        summary,
        key_strengths: clean_list(parsed.key_strengths),
        areas_for_improvement: clean_list(parsed.areas_for_improvement),
        recommendation: parsed
            .recommendation
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

/// Drops markdown code fences the model was told not to emit anyway.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("```").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Finds the first balanced JSON object or array in `raw` that parses
/// as `T`. Brace counting is string- and escape-aware so braces inside
/// string values do not break the scan. Candidates that fail to parse
/// are skipped and the scan continues, which also finds a usable inner
/// value inside an unusable outer wrapper.
fn parse_first_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let mut start = 0;
    while let Some(offset) = raw[start..].find(|c| c == '{' || c == '[') {
        let open = start + offset;
        if let Some(end) = balanced_end(raw, open) {
            if let Ok(parsed) = serde_json::from_str::<T>(&raw[open..=end]) {
                return Some(parsed);
            }
        }
        start = open + 1;
    }
    None
}

/// Byte index of the close bracket balancing the open bracket at
/// `open`, or `None` if the text ends first.
fn balanced_end(raw: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in raw[open..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}

#[derive(Clone, Copy)]
enum BulletTarget {
    Strengths,
    ContentWeaknesses,
    StructureWeaknesses,
    ContentRecommendations,
    StructureRecommendations,
}

/// Text-extraction fallback for the analysis shape: bullet lines are
/// routed to whichever list the nearest preceding heading names.
fn extract_bulleted_sections(text: &str) -> AnalysisContent {
    let mut content = AnalysisContent::default();
    let mut target: Option<BulletTarget> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(item) = strip_bullet_marker(line) {
            let list = match target {
                Some(BulletTarget::Strengths) => &mut content.strengths,
                Some(BulletTarget::ContentWeaknesses) => &mut content.content_weaknesses,
                Some(BulletTarget::StructureWeaknesses) => &mut content.structure_weaknesses,
                Some(BulletTarget::ContentRecommendations) => {
                    &mut content.content_recommendations
                }
                Some(BulletTarget::StructureRecommendations) => {
                    &mut content.structure_recommendations
                }
                None => continue,
            };
            if list.len() < MAX_LIST_ITEMS {
                list.push(item.to_string());
            }
            continue;
        }

        let lower = line.to_lowercase();
        let structural = lower.contains("structure") || lower.contains("format");
        if lower.contains("strength") {
            target = Some(BulletTarget::Strengths);
        } else if lower.contains("weakness") {
            target = Some(if structural {
                BulletTarget::StructureWeaknesses
            } else {
                BulletTarget::ContentWeaknesses
            });
        } else if lower.contains("recommend") {
            target = Some(if structural {
                BulletTarget::StructureRecommendations
            } else {
                BulletTarget::ContentRecommendations
            });
        }
    }

    content
}

fn strip_bullet_marker(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            let rest = rest.trim();
            if !rest.is_empty() {
                return Some(rest);
            }
        }
    }
    // Numbered form: "1. item"
    if let Some((number, rest)) = line.split_once('.') {
        if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
            let rest = rest.trim();
            if !rest.is_empty() {
                return Some(rest);
            }
        }
    }
    None
}
