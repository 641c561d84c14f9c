use serde::Serialize;

use crate::aggregate::ReviewerStats;
use crate::score::ScoredReviewer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub reviewer_id: String,
    pub trust_score: f64,
    pub stats: ReviewerStats,
}

/// Reviewers ordered by descending trust score
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// First `k` entries (fewer if the board is shorter)
    pub fn top(&self, k: usize) -> &[LeaderboardEntry] {
        &self.entries[..k.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sort by score, highest first. Exact ties keep their input order.
pub fn rank(mut scored: Vec<ScoredReviewer>) -> Leaderboard {
    // sort_by is stable
    scored.sort_by(|a, b| b.trust_score.total_cmp(&a.trust_score));

    let entries = scored
        .into_iter()
        .enumerate()
        .map(|(i, s)| LeaderboardEntry {
            rank: i + 1,
            reviewer_id: s.reviewer_id,
            trust_score: s.trust_score,
            stats: s.stats,
        })
        .collect();
    Leaderboard { entries }
}
