use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{aggregate, RecencyWindow};
use crate::config::Config;
use crate::error::TrustError;
use crate::normalize::{normalize, parse_features, Feature};
use crate::rank::{rank, Leaderboard};
use crate::review::Review;
use crate::score::{score, WeightTable};

/// Aggregate → normalize → score → rank over one in-memory batch.
///
/// Configuration is validated in `new`, so a bad weight table or feature
/// list is reported before any data is touched.
#[derive(Debug, Clone)]
pub struct TrustPipeline {
    features: Vec<Feature>,
    weights: WeightTable,
    lookback: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub reviews: usize,
    pub reviewers: usize,
    /// Absent when the batch is empty
    pub recency: Option<RecencyWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustReport {
    pub summary: RunSummary,
    pub leaderboard: Leaderboard,
    /// Trust scores in reviewer first-seen order, unsorted
    pub distribution: Vec<f64>,
}

impl TrustPipeline {
    pub fn new(config: &Config) -> Result<Self, TrustError> {
        let features = parse_features(config.normalize.features.as_slice())?;
        let weights = match &config.weights {
            Some(table) => WeightTable::from_map(table)?,
            None => WeightTable::default(),
        };
        weights.check_scaled(&features)?;
        let days = config.recency.window_days;
        let lookback = match Duration::try_days(days) {
            Some(lookback) if days >= 0 => lookback,
            _ => return Err(TrustError::InvalidWindow { days }),
        };

        debug!(
            "Pipeline configured: features=[{}], weight total {:.2}, window {}d",
            features.iter().map(Feature::name).collect::<Vec<_>>().join(","),
            weights.total(),
            config.recency.window_days
        );

        Ok(Self {
            features,
            weights,
            lookback,
        })
    }

    pub fn run(&self, reviews: &[Review]) -> Result<TrustReport, TrustError> {
        let recency = RecencyWindow::from_reviews(reviews, self.lookback);
        let stats = match &recency {
            Some(window) => {
                info!(
                    "Recency cutoff {} (newest review {})",
                    window.cutoff, window.global_max_date
                );
                aggregate(reviews, window)
            }
            None => Vec::new(),
        };
        info!("Aggregated {} reviews into {} reviewers", reviews.len(), stats.len());

        let scaled = normalize(&stats, &self.features);
        let scored = score(&scaled, &self.weights)?;
        let distribution: Vec<f64> = scored.iter().map(|s| s.trust_score).collect();
        let leaderboard = rank(scored);

        if let Some(top) = leaderboard.entries().first() {
            info!("Top reviewer {} with trust score {:.4}", top.reviewer_id, top.trust_score);
        }

        Ok(TrustReport {
            summary: RunSummary {
                reviews: reviews.len(),
                reviewers: stats.len(),
                recency,
            },
            leaderboard,
            distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::collections::BTreeMap;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn sample_reviews() -> Vec<Review> {
        let base = day(2024, 6, 1);
        (0..45i64)
            .map(|i| {
                Review::new(
                    format!("user{}", (i * 5) % 9),
                    "this app works well enough ".repeat((i % 4 + 1) as usize),
                    1.0 + ((i * 3) % 5) as f64,
                    base + Duration::days(i * 11),
                    if i % 6 == 0 { None } else { Some((i % 7) as u32) },
                    i % 2 == 0,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_batch_is_not_an_error() {
        let report = TrustPipeline::new(&Config::default()).unwrap().run(&[]).unwrap();
        assert!(report.leaderboard.is_empty());
        assert!(report.distribution.is_empty());
        assert_eq!(report.summary.recency, None);
        assert_eq!(report.summary.reviewers, 0);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let pipeline = TrustPipeline::new(&Config::default()).unwrap();
        let reviews = sample_reviews();
        let first = pipeline.run(&reviews).unwrap();
        let second = pipeline.run(&reviews).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_one_row_per_reviewer_and_bounds() {
        let report = TrustPipeline::new(&Config::default()).unwrap().run(&sample_reviews()).unwrap();
        assert_eq!(report.summary.reviewers, 9);
        assert_eq!(report.leaderboard.len(), 9);
        assert_eq!(report.distribution.len(), 9);

        let mut ids: Vec<&str> = report.leaderboard.entries().iter().map(|e| e.reviewer_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 9);

        for entry in report.leaderboard.entries() {
            assert!(entry.stats.rating_stddev >= 0.0);
            assert!(entry.stats.recent_reviews <= entry.stats.num_reviews);
            assert!((0.0..=1.0).contains(&entry.stats.verified_ratio));
            assert!((0.0..=1.0 + 1e-12).contains(&entry.trust_score));
        }
    }

    #[test]
    fn test_identical_reviewers_tie_in_input_order() {
        let d = day(2025, 1, 1);
        let reviews = vec![
            Review::new("second", "same words here", 4.0, d, Some(1), true),
            Review::new("lead", "a much longer review with many more words", 4.0, d, Some(9), true),
            Review::new("first", "same words here", 2.0, d, Some(1), true),
        ];
        let report = TrustPipeline::new(&Config::default()).unwrap().run(&reviews).unwrap();
        let entries = report.leaderboard.entries();
        assert_eq!(entries[0].reviewer_id, "lead");
        // different avg_rating only, which carries no weight
        assert_eq!(entries[1].trust_score, entries[2].trust_score);
        assert_eq!(entries[1].reviewer_id, "second");
        assert_eq!(entries[2].reviewer_id, "first");
    }

    #[test]
    fn test_distribution_follows_first_seen_order() {
        let d = day(2025, 1, 1);
        let reviews = vec![
            Review::new("low", "x", 3.0, d, Some(0), false),
            Review::new("high", "x y z", 3.0, d, Some(5), true),
        ];
        let report = TrustPipeline::new(&Config::default()).unwrap().run(&reviews).unwrap();
        assert_eq!(report.distribution[0], 0.0);
        assert!(report.distribution[1] > 0.0);
        assert_eq!(report.leaderboard.entries()[0].reviewer_id, "high");
    }

    #[test]
    fn test_missing_weight_fails_at_construction() {
        let mut table = BTreeMap::new();
        table.insert("num_reviews".to_string(), 1.0);
        let config = Config { weights: Some(table), ..Config::default() };
        assert_eq!(
            TrustPipeline::new(&config).unwrap_err(),
            TrustError::MissingWeight { feature: "rating_stddev".into() }
        );
    }

    #[test]
    fn test_unscaled_weighted_feature_fails_at_construction() {
        let mut config = Config::default();
        config.normalize.features.retain(|f| f != "recent_reviews");
        assert_eq!(
            TrustPipeline::new(&config).unwrap_err(),
            TrustError::FeatureNotScaled { feature: "recent_reviews".into() }
        );
    }

    #[test]
    fn test_out_of_range_window_is_rejected() {
        let mut config = Config::default();
        config.recency.window_days = i64::MAX;
        assert_eq!(
            TrustPipeline::new(&config).unwrap_err(),
            TrustError::InvalidWindow { days: i64::MAX }
        );
        config.recency.window_days = -5;
        assert!(matches!(TrustPipeline::new(&config), Err(TrustError::InvalidWindow { .. })));
    }

    #[test]
    fn test_long_window_counts_every_review_as_recent() {
        let config = Config::parse("[recency]\nwindow_days = 200000000\n").unwrap();
        let reviews = vec![
            Review::new("a", "first", 4.0, day(2001, 1, 1), Some(1), true),
            Review::new("b", "second one", 2.0, day(2025, 1, 1), None, false),
        ];
        let report = TrustPipeline::new(&config).unwrap().run(&reviews).unwrap();
        for entry in report.leaderboard.entries() {
            assert_eq!(entry.stats.recent_reviews, 1);
        }
    }

    #[test]
    fn test_alternate_weight_table() {
        let table: BTreeMap<String, f64> = [
            ("num_reviews", 1.0),
            ("rating_stddev", 0.0),
            ("avg_review_length", 0.0),
            ("avg_helpful_votes", 0.0),
            ("verified_ratio", 0.0),
            ("recent_reviews", 0.0),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
        let config = Config { weights: Some(table), ..Config::default() };
        let d = day(2025, 1, 1);
        let reviews = vec![
            Review::new("one", "a b c d e f g", 5.0, d, Some(50), true),
            Review::new("two", "a", 1.0, d, Some(0), false),
            Review::new("two", "a", 2.0, d, Some(0), false),
        ];
        let report = TrustPipeline::new(&config).unwrap().run(&reviews).unwrap();
        assert_eq!(report.leaderboard.entries()[0].reviewer_id, "two");
        assert_eq!(report.leaderboard.entries()[0].trust_score, 1.0);
    }
}
