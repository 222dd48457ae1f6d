//! Scoring Engine — similarity-to-percentage mapping and per-category
//! score rollups. Pure functions, no I/O.

use crate::models::interview::{CategoryScores, QuestionType};

/// Converts a raw similarity figure into a bucketed match percentage.
///
/// Non-tech roles score 0 unconditionally. Otherwise the mapping is
/// piecewise-linear with fixed breakpoints rather than `similarity*100`:
/// low-relevance matches compress toward zero while the upper range,
/// where hiring decisions differentiate, gets proportionally more
/// resolution. Input is clamped to [0,1], the result to [0,100].
pub fn to_match_percentage(similarity: f64, is_non_tech_role: bool) -> u8 {
    if is_non_tech_role {
        return 0;
    }

    let s = similarity.clamp(0.0, 1.0);
    let raw = if s < 0.2 {
        s * 25.0
    } else if s < 0.4 {
        5.0 + (s - 0.2) * 50.0
    } else if s < 0.6 {
        15.0 + (s - 0.4) * 87.5
    } else if s < 0.8 {
        32.0 + (s - 0.6) * 140.0
    } else if s < 0.9 {
        60.0 + (s - 0.8) * 200.0
    } else {
        80.0 + (s - 0.9) * 200.0
    };

    raw.round().clamp(0.0, 100.0) as u8
}

/// Average score per question category.
///
/// A category with no answered questions reports the overall average
/// instead of zero. That mirrors the long-standing behavior of this
/// pipeline: absent categories are not penalized, though the default can
/// mask missing data. With no scores at all, everything is 0.
pub fn category_rollups(scores: &[(QuestionType, u8)]) -> CategoryScores {
    if scores.is_empty() {
        return CategoryScores {
            behavioral: 0,
            technical: 0,
            coding: 0,
        };
    }

    let overall = mean(scores.iter().map(|(_, s)| *s));

    let for_type = |wanted: QuestionType| -> u8 {
        let member: Vec<u8> = scores
            .iter()
            .filter(|(t, _)| *t == wanted)
            .map(|(_, s)| *s)
            .collect();
        if member.is_empty() {
            overall
        } else {
            mean(member.into_iter())
        }
    };

    CategoryScores {
        behavioral: for_type(QuestionType::Behavioral),
        technical: for_type(QuestionType::Technical),
        coding: for_type(QuestionType::Coding),
    }
}

/// Overall average across all answered questions, 0 when empty.
pub fn overall_average(scores: &[(QuestionType, u8)]) -> u8 {
    if scores.is_empty() {
        0
    } else {
        mean(scores.iter().map(|(_, s)| *s))
    }
}

fn mean(scores: impl Iterator<Item = u8>) -> u8 {
    let values: Vec<u8> = scores.collect();
    if values.is_empty() {
        return 0;
    }
    let sum: u32 = values.iter().map(|&s| s as u32).sum();
    ((sum as f64 / values.len() as f64).round() as u32).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_values_exact() {
        assert_eq!(to_match_percentage(0.2, false), 5);
        assert_eq!(to_match_percentage(0.4, false), 15);
        assert_eq!(to_match_percentage(0.6, false), 32);
        assert_eq!(to_match_percentage(0.8, false), 60);
        assert_eq!(to_match_percentage(0.9, false), 80);
        assert_eq!(to_match_percentage(1.0, false), 100);
    }

    #[test]
    fn test_zero_similarity_is_zero() {
        assert_eq!(to_match_percentage(0.0, false), 0);
    }

    #[test]
    fn test_low_range_compresses() {
        // 0.1 raw would be 10% on a straight mapping; bucketed it is 2-3
        assert_eq!(to_match_percentage(0.1, false), 3);
        assert!(to_match_percentage(0.17, false) < 5);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let mut prev = 0;
        for i in 0..=1000 {
            let s = i as f64 / 1000.0;
            let pct = to_match_percentage(s, false);
            assert!(
                pct >= prev,
                "percentage dropped at s={s}: {pct} < {prev}"
            );
            prev = pct;
        }
    }

    #[test]
    fn test_bounded_0_to_100() {
        for i in 0..=100 {
            let s = i as f64 / 100.0;
            let pct = to_match_percentage(s, false);
            assert!(pct <= 100);
        }
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        assert_eq!(to_match_percentage(-0.3, false), 0);
        assert_eq!(to_match_percentage(1.7, false), 100);
    }

    #[test]
    fn test_non_tech_role_always_zero() {
        for s in [0.0, 0.3, 0.8, 1.0, 42.0] {
            assert_eq!(to_match_percentage(s, true), 0);
        }
    }

    #[test]
    fn test_rollups_average_members() {
        let scores = vec![
            (QuestionType::Behavioral, 80),
            (QuestionType::Behavioral, 60),
            (QuestionType::Technical, 90),
            (QuestionType::Coding, 50),
        ];
        let rollup = category_rollups(&scores);
        assert_eq!(rollup.behavioral, 70);
        assert_eq!(rollup.technical, 90);
        assert_eq!(rollup.coding, 50);
    }

    #[test]
    fn test_empty_category_defaults_to_overall_average() {
        // No coding answers: coding reports the overall average (70),
        // not zero.
        let scores = vec![
            (QuestionType::Behavioral, 80),
            (QuestionType::Technical, 60),
        ];
        let rollup = category_rollups(&scores);
        assert_eq!(rollup.behavioral, 80);
        assert_eq!(rollup.technical, 60);
        assert_eq!(rollup.coding, 70);
    }

    #[test]
    fn test_no_scores_is_all_zero() {
        let rollup = category_rollups(&[]);
        assert_eq!(rollup.behavioral, 0);
        assert_eq!(rollup.technical, 0);
        assert_eq!(rollup.coding, 0);
        assert_eq!(overall_average(&[]), 0);
    }

    #[test]
    fn test_overall_average_rounds() {
        let scores = vec![
            (QuestionType::Behavioral, 71),
            (QuestionType::Technical, 72),
        ];
        assert_eq!(overall_average(&scores), 72); // 71.5 rounds up
    }
}
