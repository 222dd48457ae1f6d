//! Keyword Extractor — builds a technology profile from free text
//! without any model call. Pure and deterministic: the same text and
//! dictionary always produce the same profile.

mod dictionary;

use crate::models::profile::{TechCategory, TechnologyEntry, TechnologyProfile};
use dictionary::DICTIONARY;

/// Confidence assigned to freshly extracted technologies. The user
/// adjusts it afterwards; 1..=10 is the valid range.
pub const DEFAULT_CONFIDENCE: u8 = 5;

/// Scans free text for known technology terms.
///
/// Case-insensitive whole-word matching: a hit's neighbours must be
/// non-alphanumeric, so "React" never fires inside "reactive" and
/// "Java" never fires inside "JavaScript". Term edges that are
/// themselves non-alphanumeric ("C++", "C#") skip that side's check,
/// which lets "C++11" count as C++. Empty or whitespace-only input
/// yields an empty profile rather than an error.
pub fn extract(text: &str) -> TechnologyProfile {
    if text.trim().is_empty() {
        return TechnologyProfile::default();
    }

    let haystack = text.to_lowercase();
    let mut technologies = Vec::new();

    for (name, category) in DICTIONARY {
        if contains_term(&haystack, &name.to_lowercase()) {
            technologies.push(TechnologyEntry {
                name: (*name).to_string(),
                category: *category,
                confidence_level: DEFAULT_CONFIDENCE,
            });
        }
    }

    TechnologyProfile { technologies }
}

/// Category for a technology name, `General` when the name is not in
/// the dictionary (covers terms injected by an upstream AI step).
pub fn categorize(name: &str) -> TechCategory {
    DICTIONARY
        .iter()
        .find(|(dict_name, _)| dict_name.eq_ignore_ascii_case(name))
        .map(|(_, category)| *category)
        .unwrap_or(TechCategory::General)
}

/// Whole-word containment over lowercased text.
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let first_alnum = term.chars().next().is_some_and(|c| c.is_alphanumeric());
    let last_alnum = term.chars().next_back().is_some_and(|c| c.is_alphanumeric());

    for (idx, _) in haystack.match_indices(term) {
        let prev_ok = !first_alnum
            || haystack[..idx]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
        let next_ok = !last_alnum
            || haystack[idx + term.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
        if prev_ok && next_ok {
            return true;
        }
    }
    false
}
