//! Prompt construction for every model call the platform makes.
//!
//! Templates are plain consts with `{placeholder}` slots filled by
//! `.replace` — no templating engine. Each template embeds the exact
//! JSON shape the normalizer expects back, and the analysis prompts
//! carry the non-technical sentinel so an out-of-domain job description
//! short-circuits instead of producing junk scores.

use crate::models::interview::InterviewQuestion;

/// Marker the model emits (alone) when the job description is not a
/// technology role. Detected by the normalizer before any JSON parse.
pub const NON_TECH_SENTINEL: &str = "NON_TECHNICAL_ROLE";

/// Per-field character budget before truncation. Keeps the combined
/// prompt comfortably inside context limits for both models.
pub const MAX_FIELD_CHARS: usize = 4500;

const TRUNCATION_MARKER: &str = "...";

/// A ready-to-send prompt pair.
pub struct BuiltPrompt {
    pub system: &'static str,
    pub prompt: String,
}

/// Which call is being made, with the inputs it needs.
pub enum PromptKind<'a> {
    MatchAnalysis {
        resume_text: &'a str,
        job_description: &'a str,
    },
    Similarity {
        resume_text: &'a str,
        job_description: &'a str,
    },
    InterviewQuestions {
        resume_text: &'a str,
        job_description: &'a str,
        keywords: &'a [String],
    },
    AnswerFeedback {
        question: &'a InterviewQuestion,
        response_text: &'a str,
        code: Option<&'a str>,
        response_time_secs: u64,
    },
    OverallFeedback {
        summary_json: &'a str,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// System prompts
// ────────────────────────────────────────────────────────────────────────────

const ANALYSIS_SYSTEM: &str = "You are an expert technical recruiter and resume reviewer. \
You MUST respond with valid JSON only. Do NOT include markdown fences, commentary, or any \
text outside the JSON object. If the job description is not a technology role, respond with \
exactly NON_TECHNICAL_ROLE and nothing else.";

const SIMILARITY_SYSTEM: &str = "You are a resume screening engine. You MUST respond with \
valid JSON only. Do NOT include markdown fences, commentary, or any text outside the JSON \
object. If the job description is not a technology role, respond with exactly \
NON_TECHNICAL_ROLE and nothing else.";

const QUESTIONS_SYSTEM: &str = "You are a senior technical interviewer preparing a mock \
interview. You MUST respond with a valid JSON array only. Do NOT include markdown fences, \
commentary, or any text outside the JSON array.";

const FEEDBACK_SYSTEM: &str = "You are an experienced interview coach evaluating a \
candidate's answer. You MUST respond with valid JSON only. Do NOT include markdown fences, \
commentary, or any text outside the JSON object.";

const OVERALL_SYSTEM: &str = "You are an experienced interview coach writing a final \
debrief. You MUST respond with valid JSON only. Do NOT include markdown fences, commentary, \
or any text outside the JSON object.";

// ────────────────────────────────────────────────────────────────────────────
// User prompt templates
// ────────────────────────────────────────────────────────────────────────────

const MATCH_ANALYSIS_TEMPLATE: &str = r#"Compare the resume below against the job description and produce a structured review.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Respond with a JSON object of exactly this shape:
{
  "strengths": ["..."],
  "content_weaknesses": ["..."],
  "structure_weaknesses": ["..."],
  "content_recommendations": ["..."],
  "structure_recommendations": ["..."]
}

Rules:
- strengths: concrete ways the resume already matches this job (3 to 6 items).
- content_weaknesses: missing or weak skills and experience relative to the job (2 to 5 items).
- structure_weaknesses: formatting, ordering, or clarity problems in the resume itself (1 to 4 items).
- content_recommendations: specific content changes that would improve the match (2 to 5 items).
- structure_recommendations: specific formatting or layout changes (1 to 4 items).
- Every item is one plain sentence. No nested objects, no markdown."#;

const SIMILARITY_TEMPLATE: &str = r#"Rate how well the resume matches the job description.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Respond with a JSON object of exactly this shape:
{"similarity": 0.0}

Rules:
- similarity is a number between 0.0 and 1.0.
- 0.0 means no relevant overlap, 1.0 means an ideal candidate.
- Weigh required skills and seniority most heavily."#;

const QUESTIONS_TEMPLATE: &str = r#"Design a mock interview for the candidate below.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

KEY TECHNOLOGIES: {keywords}

Produce exactly 10 questions: 3 behavioral, 4 technical, 3 coding. Respond with a JSON array of exactly this shape:
[
  {
    "question_id": "q1",
    "type": "behavioral",
    "question": "...",
    "category": "...",
    "difficulty": "easy",
    "expected_duration_secs": 180
  }
]

Rules:
- type is one of "behavioral", "technical", "coding".
- difficulty is "easy" or "medium".
- category names the skill being probed (for example "Teamwork" or "React").
- Coding questions additionally carry "starter_code": an object mapping a language name to a small starter snippet.
- expected_duration_secs: about 180 for behavioral, 240 for technical, 900 for coding.
- Technical and coding questions must target the key technologies above.
- question_id values are "q1" through "q10" in order."#;

const FEEDBACK_TEMPLATE: &str = r#"Evaluate the candidate's answer to an interview question.

QUESTION ({question_type}, category {category}):
{question}

CANDIDATE ANSWER:
{response_text}
{code_section}
TIME TAKEN: {response_time_secs} seconds (expected about {expected_duration_secs}).

Respond with a JSON object of exactly this shape:
{
  "score": 0,
  "strengths": ["..."],
  "improvements": ["..."],
  "detailed_analysis": "...",
  "communication_clarity": 0,
  "technical_accuracy": 0,
  "structured_response": 0
}

Rules:
- score is an integer 0 to 100.
- communication_clarity, technical_accuracy, structured_response are integers 1 to 10.
- For coding questions also include "code_quality" and "time_efficiency" (integers 1 to 10).
- strengths: 2 to 4 items. improvements: 2 to 4 items.
- detailed_analysis: 2 to 4 sentences of plain prose."#;

const FEEDBACK_CODE_SECTION: &str = r#"
CANDIDATE CODE:
{code}
"#;

const OVERALL_TEMPLATE: &str = r#"Write a final debrief for a completed mock interview. The per-question results are below as JSON.

RESULTS:
{summary_json}

Respond with a JSON object of exactly this shape:
{
  "summary": "...",
  "key_strengths": ["..."],
  "areas_for_improvement": ["..."],
  "recommendation": "..."
}

Rules:
- summary: 2 to 4 sentences covering overall performance.
- key_strengths: 2 to 4 items. areas_for_improvement: 2 to 4 items.
- recommendation: one sentence of actionable next-step advice.
- Ground every point in the results given. No scores in the text."#;

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builds the system and user prompt for one model call. Long inputs are
/// truncated per field so a single oversized resume cannot blow the
/// context window.
pub fn build(kind: PromptKind<'_>) -> BuiltPrompt {
    match kind {
        PromptKind::MatchAnalysis {
            resume_text,
            job_description,
        } => BuiltPrompt {
            system: ANALYSIS_SYSTEM,
            prompt: MATCH_ANALYSIS_TEMPLATE
                .replace("{resume_text}", &truncate_for_prompt(resume_text, MAX_FIELD_CHARS))
                .replace(
                    "{job_description}",
                    &truncate_for_prompt(job_description, MAX_FIELD_CHARS),
                ),
        },
        PromptKind::Similarity {
            resume_text,
            job_description,
        } => BuiltPrompt {
            system: SIMILARITY_SYSTEM,
            prompt: SIMILARITY_TEMPLATE
                .replace("{resume_text}", &truncate_for_prompt(resume_text, MAX_FIELD_CHARS))
                .replace(
                    "{job_description}",
                    &truncate_for_prompt(job_description, MAX_FIELD_CHARS),
                ),
        },
        PromptKind::InterviewQuestions {
            resume_text,
            job_description,
            keywords,
        } => {
            let keyword_list = if keywords.is_empty() {
                "(none detected)".to_string()
            } else {
                keywords.join(", ")
            };
            BuiltPrompt {
                system: QUESTIONS_SYSTEM,
                prompt: QUESTIONS_TEMPLATE
                    .replace("{resume_text}", &truncate_for_prompt(resume_text, MAX_FIELD_CHARS))
                    .replace(
                        "{job_description}",
                        &truncate_for_prompt(job_description, MAX_FIELD_CHARS),
                    )
                    .replace("{keywords}", &keyword_list),
            }
        }
        PromptKind::AnswerFeedback {
            question,
            response_text,
            code,
            response_time_secs,
        } => {
            let code_section = match code {
                Some(code) if !code.trim().is_empty() => FEEDBACK_CODE_SECTION
                    .replace("{code}", &truncate_for_prompt(code, MAX_FIELD_CHARS)),
                _ => String::new(),
            };
            BuiltPrompt {
                system: FEEDBACK_SYSTEM,
                prompt: FEEDBACK_TEMPLATE
                    .replace("{question_type}", question.question_type.as_str())
                    .replace("{category}", &question.category)
                    .replace("{question}", &question.question)
                    .replace(
                        "{response_text}",
                        &truncate_for_prompt(response_text, MAX_FIELD_CHARS),
                    )
                    .replace("{code_section}", &code_section)
                    .replace("{response_time_secs}", &response_time_secs.to_string())
                    .replace(
                        "{expected_duration_secs}",
                        &question.expected_duration_secs.to_string(),
                    ),
            }
        }
        PromptKind::OverallFeedback { summary_json } => BuiltPrompt {
            system: OVERALL_SYSTEM,
            prompt: OVERALL_TEMPLATE.replace(
                "{summary_json}",
                &truncate_for_prompt(summary_json, MAX_FIELD_CHARS * 2),
            ),
        },
    }
}

/// Truncates to at most `max_chars` characters, appending a marker when
/// anything was cut. Counts chars, not bytes, so multibyte input never
/// splits mid-codepoint.
pub fn truncate_for_prompt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}
