use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::aggregate::ReviewerStats;
use crate::error::TrustError;

/// Reviewer statistics that can be rescaled and weighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    NumReviews,
    AvgRating,
    RatingStddev,
    AvgReviewLength,
    AvgHelpfulVotes,
    VerifiedRatio,
    RecentReviews,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::NumReviews,
        Feature::AvgRating,
        Feature::RatingStddev,
        Feature::AvgReviewLength,
        Feature::AvgHelpfulVotes,
        Feature::VerifiedRatio,
        Feature::RecentReviews,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::NumReviews => "num_reviews",
            Feature::AvgRating => "avg_rating",
            Feature::RatingStddev => "rating_stddev",
            Feature::AvgReviewLength => "avg_review_length",
            Feature::AvgHelpfulVotes => "avg_helpful_votes",
            Feature::VerifiedRatio => "verified_ratio",
            Feature::RecentReviews => "recent_reviews",
        }
    }

    /// Raw (unscaled) value of this feature
    pub fn value(&self, stats: &ReviewerStats) -> f64 {
        match self {
            Feature::NumReviews => stats.num_reviews as f64,
            Feature::AvgRating => stats.avg_rating,
            Feature::RatingStddev => stats.rating_stddev,
            Feature::AvgReviewLength => stats.avg_review_length,
            Feature::AvgHelpfulVotes => stats.avg_helpful_votes,
            Feature::VerifiedRatio => stats.verified_ratio,
            Feature::RecentReviews => stats.recent_reviews as f64,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| TrustError::UnknownFeature { name: s.to_string() })
    }
}

/// Resolve a list of feature names, dropping repeats.
pub fn parse_features<S: AsRef<str>>(names: &[S]) -> Result<Vec<Feature>, TrustError> {
    let mut features = Vec::with_capacity(names.len());
    for name in names {
        let feature: Feature = name.as_ref().parse()?;
        if !features.contains(&feature) {
            features.push(feature);
        }
    }
    Ok(features)
}

/// A reviewer's untouched statistics alongside the rescaled features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledStats {
    pub stats: ReviewerStats,
    pub scaled: BTreeMap<Feature, f64>,
}

impl ScaledStats {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.scaled.get(&feature).copied()
    }
}

/// Observed range of one feature across the population
#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn scale(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Min-max rescale each named feature onto [0,1] across `stats`.
///
/// A feature that is constant across the population scales to 0 for every
/// reviewer. Ranges come from this population only.
pub fn normalize(stats: &[ReviewerStats], features: &[Feature]) -> Vec<ScaledStats> {
    let ranges: Vec<(Feature, Range)> = features
        .iter()
        .filter_map(|&feature| {
            let mut values = stats.iter().map(|s| feature.value(s));
            let first = values.next()?;
            let range = values.fold(Range { min: first, max: first }, |r, v| Range {
                min: r.min.min(v),
                max: r.max.max(v),
            });
            Some((feature, range))
        })
        .collect();

    stats
        .iter()
        .map(|s| ScaledStats {
            stats: s.clone(),
            scaled: ranges
                .iter()
                .map(|(feature, range)| (*feature, range.scale(feature.value(s))))
                .collect(),
        })
        .collect()
}
