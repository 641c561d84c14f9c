use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

use crate::review::Review;

/// Per-reviewer statistics, recomputed from scratch on every run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerStats {
    pub reviewer_id: String,
    pub num_reviews: usize,
    pub avg_rating: f64,
    /// Sample standard deviation (n-1). Zero for a single review.
    pub rating_stddev: f64,
    pub avg_review_length: f64,
    pub avg_helpful_votes: f64,
    pub verified_ratio: f64,
    pub last_review_date: NaiveDateTime,
    /// Reviews on or after the recency cutoff
    pub recent_reviews: usize,
}

/// The recency window resolved against a concrete batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecencyWindow {
    pub global_max_date: NaiveDateTime,
    pub cutoff: NaiveDateTime,
}

impl RecencyWindow {
    /// Scan the whole batch for its newest review. `None` for an empty batch.
    /// A lookback reaching past the earliest representable date counts
    /// everything as recent.
    pub fn from_reviews(reviews: &[Review], lookback: Duration) -> Option<Self> {
        let global_max_date = reviews.iter().map(|r| r.review_date).max()?;
        Some(Self {
            global_max_date,
            cutoff: global_max_date
                .checked_sub_signed(lookback)
                .unwrap_or(NaiveDateTime::MIN),
        })
    }

    pub fn contains(&self, date: NaiveDateTime) -> bool {
        date >= self.cutoff
    }
}

/// Running totals for one reviewer. Rating spread uses Welford's update so
/// constant ratings give exactly zero.
struct Accumulator {
    reviewer_id: String,
    count: usize,
    rating_mean: f64,
    rating_m2: f64,
    length_sum: usize,
    helpful_sum: u64,
    helpful_count: usize,
    verified: usize,
    last_review_date: NaiveDateTime,
    recent: usize,
}

impl Accumulator {
    fn new(review: &Review) -> Self {
        Self {
            reviewer_id: review.reviewer_id.clone(),
            count: 0,
            rating_mean: 0.0,
            rating_m2: 0.0,
            length_sum: 0,
            helpful_sum: 0,
            helpful_count: 0,
            verified: 0,
            last_review_date: review.review_date,
            recent: 0,
        }
    }

    fn push(&mut self, review: &Review, window: &RecencyWindow) {
        self.count += 1;
        let delta = review.rating - self.rating_mean;
        self.rating_mean += delta / self.count as f64;
        self.rating_m2 += delta * (review.rating - self.rating_mean);

        self.length_sum += review.review_length_words;
        if let Some(votes) = review.helpful_votes {
            self.helpful_sum += u64::from(votes);
            self.helpful_count += 1;
        }
        if review.verified_purchase {
            self.verified += 1;
        }
        self.last_review_date = self.last_review_date.max(review.review_date);
        if window.contains(review.review_date) {
            self.recent += 1;
        }
    }

    fn finish(self) -> ReviewerStats {
        let n = self.count as f64;
        let rating_stddev = if self.count > 1 {
            (self.rating_m2.max(0.0) / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let avg_helpful_votes = if self.helpful_count > 0 {
            self.helpful_sum as f64 / self.helpful_count as f64
        } else {
            0.0
        };

        ReviewerStats {
            reviewer_id: self.reviewer_id,
            num_reviews: self.count,
            avg_rating: self.rating_mean,
            rating_stddev,
            avg_review_length: self.length_sum as f64 / n,
            avg_helpful_votes,
            verified_ratio: self.verified as f64 / n,
            last_review_date: self.last_review_date,
            recent_reviews: self.recent,
        }
    }
}

/// Group reviews by reviewer and compute one `ReviewerStats` each.
///
/// `window` must come from the whole batch, not a subset. Output order is
/// the order in which each reviewer first appears in `reviews`.
pub fn aggregate(reviews: &[Review], window: &RecencyWindow) -> Vec<ReviewerStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accumulators: Vec<Accumulator> = Vec::new();

    for review in reviews {
        let slot = *index.entry(review.reviewer_id.as_str()).or_insert_with(|| {
            accumulators.push(Accumulator::new(review));
            accumulators.len() - 1
        });
        accumulators[slot].push(review, window);
    }

    accumulators.into_iter().map(Accumulator::finish).collect()
}
