//! Interview question generation.
//!
//! One model call produces candidate questions; whatever comes back is
//! shaped into exactly ten (three behavioral, four technical, three
//! coding) by topping up from deterministic templates keyed off the
//! extracted technologies. Generation therefore never fails: a dead
//! gateway still yields a full, answerable interview.

use std::collections::HashMap;

use tracing::warn;

use crate::ai::gateway::{AiGateway, InvokeOptions};
use crate::ai::normalize::normalize_questions;
use crate::ai::prompts::{self, PromptKind};
use crate::keywords;
use crate::models::interview::{Difficulty, InterviewQuestion, QuestionType};

pub const QUESTIONS_PER_SESSION: usize = 10;
pub const BEHAVIORAL_COUNT: usize = 3;
pub const TECHNICAL_COUNT: usize = 4;
pub const CODING_COUNT: usize = 3;

pub async fn generate_questions(
    gateway: &dyn AiGateway,
    resume_text: &str,
    job_description: &str,
) -> Vec<InterviewQuestion> {
    // Target the role's stack; fall back to the resume when the job
    // description names no known technology.
    let mut profile = keywords::extract(job_description);
    if profile.is_empty() {
        profile = keywords::extract(resume_text);
    }
    let keyword_names: Vec<String> = profile
        .technologies
        .iter()
        .map(|t| t.name.clone())
        .collect();

    let built = prompts::build(PromptKind::InterviewQuestions {
        resume_text,
        job_description,
        keywords: &keyword_names,
    });

    let generated = match gateway
        .invoke(&built.prompt, built.system, InvokeOptions::with_max_tokens(4096))
        .await
    {
        Ok(raw) => normalize_questions(&raw),
        Err(e) => {
            warn!(error = %e, "question generation failed, using template set");
            Vec::new()
        }
    };

    assemble(generated, &keyword_names)
}

/// Shapes candidate questions into the fixed session layout: quotas per
/// type, template top-up for shortfalls, behavioral then technical then
/// coding order, ids re-keyed q1..q10.
fn assemble(generated: Vec<InterviewQuestion>, keywords: &[String]) -> Vec<InterviewQuestion> {
    let mut behavioral = Vec::new();
    let mut technical = Vec::new();
    let mut coding = Vec::new();

    for q in generated {
        match q.question_type {
            QuestionType::Behavioral if behavioral.len() < BEHAVIORAL_COUNT => behavioral.push(q),
            QuestionType::Technical if technical.len() < TECHNICAL_COUNT => technical.push(q),
            QuestionType::Coding if coding.len() < CODING_COUNT => coding.push(q),
            _ => {}
        }
    }

    fill_behavioral(&mut behavioral);
    fill_technical(&mut technical, keywords);
    fill_coding(&mut coding);

    let mut questions: Vec<InterviewQuestion> = behavioral
        .into_iter()
        .chain(technical)
        .chain(coding)
        .collect();
    for (i, q) in questions.iter_mut().enumerate() {
        q.question_id = format!("q{}", i + 1);
    }
    questions
}

// ────────────────────────────────────────────────────────────────────────────
// Template fallbacks
// ────────────────────────────────────────────────────────────────────────────

const BEHAVIORAL_TEMPLATES: &[(&str, &str)] = &[
    (
        "Tell me about a time you had to deliver under a tight deadline. How did you decide what to cut?",
        "Prioritization",
    ),
    (
        "Describe a disagreement with a teammate about a technical decision. How was it resolved?",
        "Teamwork",
    ),
    (
        "Tell me about a project that missed its goals. What did you learn and change afterwards?",
        "Growth",
    ),
    (
        "Describe a time you had to pick up an unfamiliar technology quickly. How did you approach it?",
        "Learning",
    ),
];

const TECHNICAL_TEMPLATES: &[&str] = &[
    "How have you used {tech} in a recent project, and what tradeoffs did you run into?",
    "What are common pitfalls when working with {tech}, and how do you avoid them?",
    "How would you explain {tech} to a junior engineer joining your team?",
    "How do you test code that depends heavily on {tech}?",
];

const GENERIC_TECHNICAL: &[(&str, &str)] = &[
    (
        "Walk me through what happens between a browser sending a request and the server's response rendering.",
        "Web Fundamentals",
    ),
    (
        "What is the difference between authentication and authorization, and where does each belong in a web stack?",
        "Security",
    ),
    (
        "A production endpoint has become slow. How do you find whether the database is the bottleneck?",
        "Databases",
    ),
    (
        "How would you design a rate limiter for a public API?",
        "System Design",
    ),
];

struct CodingTemplate {
    question: &'static str,
    category: &'static str,
    difficulty: Difficulty,
    python: &'static str,
    javascript: &'static str,
}

const CODING_TEMPLATES: &[CodingTemplate] = &[
    CodingTemplate {
        question: "Write a function that returns the first non-repeating character in a string, or null/None when every character repeats.",
        category: "Strings",
        difficulty: Difficulty::Easy,
        python: "def first_unique_char(s):\n    # return the first non-repeating character\n    pass\n",
        javascript: "function firstUniqueChar(s) {\n  // return the first non-repeating character\n}\n",
    },
    CodingTemplate {
        question: "Given two sorted arrays of integers, merge them into one sorted array without using a built-in sort.",
        category: "Arrays",
        difficulty: Difficulty::Medium,
        python: "def merge_sorted(a, b):\n    # merge without sorting\n    pass\n",
        javascript: "function mergeSorted(a, b) {\n  // merge without sorting\n}\n",
    },
    CodingTemplate {
        question: "Write a function that checks whether a string of brackets ()[]{} is balanced.",
        category: "Stacks",
        difficulty: Difficulty::Medium,
        python: "def is_balanced(s):\n    # true when every bracket closes in order\n    pass\n",
        javascript: "function isBalanced(s) {\n  // true when every bracket closes in order\n}\n",
    },
];

fn template_question(
    question_type: QuestionType,
    question: String,
    category: String,
    difficulty: Difficulty,
    starter_code: Option<HashMap<String, String>>,
) -> InterviewQuestion {
    InterviewQuestion {
        question_id: String::new(), // re-keyed by assemble
        question_type,
        question,
        category,
        difficulty,
        expected_duration_secs: question_type.default_duration_secs(),
        starter_code,
    }
}

fn fill_behavioral(list: &mut Vec<InterviewQuestion>) {
    let mut idx = 0;
    while list.len() < BEHAVIORAL_COUNT {
        let (question, category) = BEHAVIORAL_TEMPLATES[idx % BEHAVIORAL_TEMPLATES.len()];
        idx += 1;
        list.push(template_question(
            QuestionType::Behavioral,
            question.to_string(),
            category.to_string(),
            Difficulty::Easy,
            None,
        ));
    }
}

fn fill_technical(list: &mut Vec<InterviewQuestion>, keywords: &[String]) {
    let mut template_idx = 0;
    let mut keyword_idx = 0;
    while list.len() < TECHNICAL_COUNT {
        let q = if keyword_idx < keywords.len() {
            let tech = &keywords[keyword_idx];
            keyword_idx += 1;
            let text = TECHNICAL_TEMPLATES[template_idx % TECHNICAL_TEMPLATES.len()]
                .replace("{tech}", tech);
            template_idx += 1;
            template_question(
                QuestionType::Technical,
                text,
                tech.clone(),
                Difficulty::Medium,
                None,
            )
        } else {
            let (text, category) = GENERIC_TECHNICAL[template_idx % GENERIC_TECHNICAL.len()];
            template_idx += 1;
            template_question(
                QuestionType::Technical,
                text.to_string(),
                category.to_string(),
                Difficulty::Medium,
                None,
            )
        };
        list.push(q);
    }
}

fn fill_coding(list: &mut Vec<InterviewQuestion>) {
    let mut idx = 0;
    while list.len() < CODING_COUNT {
        let template = &CODING_TEMPLATES[idx % CODING_TEMPLATES.len()];
        idx += 1;
        let starter: HashMap<String, String> = [
            ("python".to_string(), template.python.to_string()),
            ("javascript".to_string(), template.javascript.to_string()),
        ]
        .into_iter()
        .collect();
        list.push(template_question(
            QuestionType::Coding,
            template.question.to_string(),
            template.category.to_string(),
            template.difficulty,
            Some(starter),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gateway::GatewayError;
    use async_trait::async_trait;
    use std::collections::HashSet;

    struct FixedGateway {
        reply: Option<String>,
    }

    #[async_trait]
    impl AiGateway for FixedGateway {
        async fn invoke(
            &self,
            _prompt: &str,
            _system: &str,
            _options: InvokeOptions,
        ) -> Result<String, GatewayError> {
            self.reply.clone().ok_or(GatewayError::Timeout)
        }
    }

    fn assert_session_shape(questions: &[InterviewQuestion]) {
        assert_eq!(questions.len(), QUESTIONS_PER_SESSION);
        let behavioral = questions
            .iter()
            .filter(|q| q.question_type == QuestionType::Behavioral)
            .count();
        let technical = questions
            .iter()
            .filter(|q| q.question_type == QuestionType::Technical)
            .count();
        let coding = questions
            .iter()
            .filter(|q| q.question_type == QuestionType::Coding)
            .count();
        assert_eq!((behavioral, technical, coding), (3, 4, 3));

        let ids: HashSet<&str> = questions.iter().map(|q| q.question_id.as_str()).collect();
        assert_eq!(ids.len(), QUESTIONS_PER_SESSION);
        assert_eq!(questions[0].question_id, "q1");
        assert_eq!(questions[9].question_id, "q10");
    }

    #[tokio::test]
    async fn test_gateway_down_yields_full_template_session() {
        let gateway = FixedGateway { reply: None };
        let questions = generate_questions(
            &gateway,
            "Senior engineer, five years of React and Node.js.",
            "Frontend engineer role using React and TypeScript.",
        )
        .await;
        assert_session_shape(&questions);

        // Technical templates pick up the job description's stack.
        assert!(questions
            .iter()
            .any(|q| q.question_type == QuestionType::Technical && q.question.contains("React")));
        // Coding questions ship starter code in the fallback set.
        assert!(questions
            .iter()
            .filter(|q| q.question_type == QuestionType::Coding)
            .all(|q| q.starter_code.is_some()));
    }

    #[tokio::test]
    async fn test_generated_questions_are_kept_and_rekeyed() {
        let mut items = Vec::new();
        for i in 0..3 {
            items.push(format!(
                r#"{{"question_id": "weird-{i}", "type": "behavioral", "question": "B{i}?", "category": "Teamwork", "difficulty": "easy", "expected_duration_secs": 180}}"#
            ));
        }
        for i in 0..4 {
            items.push(format!(
                r#"{{"type": "technical", "question": "T{i}?", "category": "React", "difficulty": "medium", "expected_duration_secs": 240}}"#
            ));
        }
        for i in 0..3 {
            items.push(format!(
                r#"{{"type": "coding", "question": "C{i}?", "category": "Arrays", "difficulty": "medium", "expected_duration_secs": 900}}"#
            ));
        }
        let reply = format!("[{}]", items.join(","));

        let gateway = FixedGateway { reply: Some(reply) };
        let questions = generate_questions(&gateway, "resume", "job").await;
        assert_session_shape(&questions);
        assert_eq!(questions[0].question, "B0?");
        assert_eq!(questions[3].question, "T0?");
    }

    #[test]
    fn test_assemble_tops_up_partial_generation() {
        let partial = vec![InterviewQuestion {
            question_id: "x".to_string(),
            question_type: QuestionType::Technical,
            question: "Only one technical question came back?".to_string(),
            category: "React".to_string(),
            difficulty: Difficulty::Medium,
            expected_duration_secs: 240,
            starter_code: None,
        }];
        let questions = assemble(partial, &["React".to_string()]);
        assert_session_shape(&questions);
        assert!(questions
            .iter()
            .any(|q| q.question == "Only one technical question came back?"));
    }

    #[test]
    fn test_assemble_caps_overfull_types() {
        let mut many = Vec::new();
        for i in 0..8 {
            many.push(InterviewQuestion {
                question_id: format!("b{i}"),
                question_type: QuestionType::Behavioral,
                question: format!("B{i}?"),
                category: "Teamwork".to_string(),
                difficulty: Difficulty::Easy,
                expected_duration_secs: 180,
                starter_code: None,
            });
        }
        let questions = assemble(many, &[]);
        assert_session_shape(&questions);
    }

    #[test]
    fn test_fill_technical_without_keywords_uses_generic_set() {
        let mut list = Vec::new();
        fill_technical(&mut list, &[]);
        assert_eq!(list.len(), TECHNICAL_COUNT);
        let texts: HashSet<&str> = list.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts.len(), TECHNICAL_COUNT);
    }
}
