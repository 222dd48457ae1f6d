//! Resume-vs-job match pipeline.
//!
//! Two model calls per (resume, job description) pair: one for a raw
//! similarity figure, one for the structured review. They have no data
//! dependency, so they are dispatched together and joined. Every
//! failure path lands on a deterministic fallback, so this function
//! always returns a complete [`MatchResult`].

use tracing::warn;

use crate::ai::gateway::{AiGateway, InvokeOptions};
use crate::ai::normalize::{
    normalize_match_analysis, normalize_similarity, AnalysisContent, MatchAnalysisOutcome,
    SimilarityOutcome,
};
use crate::ai::prompts::{self, PromptKind};
use crate::keywords;
use crate::models::analysis::MatchResult;
use crate::models::profile::TechnologyProfile;
use crate::scoring;

pub async fn analyze_match(
    gateway: &dyn AiGateway,
    resume_text: &str,
    job_description: &str,
) -> MatchResult {
    let resume_profile = keywords::extract(resume_text);
    let jd_profile = keywords::extract(job_description);

    let similarity_prompt = prompts::build(PromptKind::Similarity {
        resume_text,
        job_description,
    });
    let analysis_prompt = prompts::build(PromptKind::MatchAnalysis {
        resume_text,
        job_description,
    });

    let (similarity_raw, analysis_raw) = tokio::join!(
        gateway.invoke(
            &similarity_prompt.prompt,
            similarity_prompt.system,
            InvokeOptions {
                temperature: 0.2,
                max_tokens: 128,
            },
        ),
        gateway.invoke(
            &analysis_prompt.prompt,
            analysis_prompt.system,
            InvokeOptions::default(),
        ),
    );

    let similarity_outcome = match similarity_raw {
        Ok(text) => normalize_similarity(&text),
        Err(e) => {
            warn!(error = %e, "similarity call failed, falling back to keyword overlap");
            SimilarityOutcome::Unusable
        }
    };

    let analysis_outcome = match analysis_raw {
        Ok(text) => normalize_match_analysis(&text),
        Err(e) => {
            warn!(error = %e, "analysis call failed, substituting fallback content");
            MatchAnalysisOutcome::Analysis(AnalysisContent::fallback())
        }
    };

    let content = match analysis_outcome {
        MatchAnalysisOutcome::NonTechnicalRole => return MatchResult::non_technical(),
        MatchAnalysisOutcome::Analysis(content) => content,
    };

    let raw_similarity = match similarity_outcome {
        SimilarityOutcome::NonTechnicalRole => return MatchResult::non_technical(),
        SimilarityOutcome::Score(score) => score,
        SimilarityOutcome::Unusable => match keyword_overlap(&resume_profile, &jd_profile) {
            Some(score) => score,
            // The job description names no known technology, so with the
            // model unavailable there is nothing to score against.
            None => return MatchResult::non_technical(),
        },
    };

    MatchResult {
        match_percentage: scoring::to_match_percentage(raw_similarity, false),
        is_non_tech_role: false,
        strengths: content.strengths,
        content_weaknesses: content.content_weaknesses,
        structure_weaknesses: content.structure_weaknesses,
        content_recommendations: content.content_recommendations,
        structure_recommendations: content.structure_recommendations,
        raw_similarity,
    }
}

/// Deterministic similarity when the model gave nothing usable: the
/// share of job-description technologies also present in the resume.
/// `None` when the job description names no known technology.
fn keyword_overlap(resume: &TechnologyProfile, jd: &TechnologyProfile) -> Option<f64> {
    if jd.is_empty() {
        return None;
    }
    let hits = jd
        .technologies
        .iter()
        .filter(|t| resume.contains(&t.name))
        .count();
    Some(hits as f64 / jd.technologies.len() as f64)
}
