//! Reviewer trust grades
//!
//! A trust score is a weighted blend of a reviewer's activity, rating spread,
//! review length, helpfulness, verified-purchase share and recent activity,
//! each rescaled against the current batch. Grades give the leaderboard a
//! coarse, human-readable band on top of the raw score.

use std::collections::BTreeMap;

pub const GRADES: [&str; 6] = ["A+", "A", "B", "C", "D", "F"];

/// Format a trust score as a human-readable grade
pub fn score_to_grade(score: f64) -> &'static str {
    match score {
        s if s >= 0.9 => "A+",
        s if s >= 0.8 => "A",
        s if s >= 0.7 => "B",
        s if s >= 0.6 => "C",
        s if s >= 0.5 => "D",
        _ => "F",
    }
}

/// How many scores land in each grade. Every grade is present, possibly 0.
pub fn grade_counts(scores: &[f64]) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> = GRADES.iter().map(|g| (*g, 0)).collect();
    for &score in scores {
        *counts.entry(score_to_grade(score)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(score_to_grade(1.0), "A+");
        assert_eq!(score_to_grade(0.9), "A+");
        assert_eq!(score_to_grade(0.85), "A");
        assert_eq!(score_to_grade(0.7), "B");
        assert_eq!(score_to_grade(0.65), "C");
        assert_eq!(score_to_grade(0.5), "D");
        assert_eq!(score_to_grade(0.49), "F");
        assert_eq!(score_to_grade(0.0), "F");
    }

    #[test]
    fn test_grade_counts_cover_all_grades() {
        let counts = grade_counts(&[0.95, 0.1, 0.2, 0.75]);
        assert_eq!(counts.len(), GRADES.len());
        assert_eq!(counts["A+"], 1);
        assert_eq!(counts["B"], 1);
        assert_eq!(counts["F"], 2);
        assert_eq!(counts["A"], 0);
        assert_eq!(counts.values().sum::<usize>(), 4);
    }
}
