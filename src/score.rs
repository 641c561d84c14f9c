use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::ReviewerStats;
use crate::error::TrustError;
use crate::normalize::{Feature, ScaledStats};

/// Features that carry a weight. `avg_rating` is normalized upstream but is
/// not part of the sum.
pub const WEIGHTED_FEATURES: [Feature; 6] = [
    Feature::NumReviews,
    Feature::RatingStddev,
    Feature::AvgReviewLength,
    Feature::AvgHelpfulVotes,
    Feature::VerifiedRatio,
    Feature::RecentReviews,
];

/// Validated weights, one per entry of [`WEIGHTED_FEATURES`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTable {
    weights: BTreeMap<Feature, f64>,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::canonical()
    }
}

impl WeightTable {
    /// Shipped defaults. Sums to 1.0.
    pub fn canonical() -> Self {
        let weights = [
            (Feature::NumReviews, 0.20),
            (Feature::RatingStddev, 0.15),
            (Feature::AvgReviewLength, 0.10),
            (Feature::AvgHelpfulVotes, 0.25),
            (Feature::VerifiedRatio, 0.15),
            (Feature::RecentReviews, 0.15),
        ];
        Self { weights: weights.into_iter().collect() }
    }

    /// Build from a name → weight table. Every weighted feature must be
    /// present, nothing else may be, and each weight must be finite and >= 0.
    pub fn from_map(table: &BTreeMap<String, f64>) -> Result<Self, TrustError> {
        for key in table.keys() {
            let known = key
                .parse::<Feature>()
                .map(|f| WEIGHTED_FEATURES.contains(&f))
                .unwrap_or(false);
            if !known {
                return Err(TrustError::UnknownWeight { key: key.clone() });
            }
        }

        let mut weights = BTreeMap::new();
        for feature in WEIGHTED_FEATURES {
            let value = *table
                .get(feature.name())
                .ok_or_else(|| TrustError::MissingWeight { feature: feature.name().to_string() })?;
            if !value.is_finite() || value < 0.0 {
                return Err(TrustError::InvalidWeight { feature: feature.name().to_string(), value });
            }
            weights.insert(feature, value);
        }
        Ok(Self { weights })
    }

    pub fn weight(&self, feature: Feature) -> f64 {
        self.weights.get(&feature).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Fail if a weighted feature is absent from the normalized set
    pub fn check_scaled(&self, scaled: &[Feature]) -> Result<(), TrustError> {
        match WEIGHTED_FEATURES.iter().find(|f| !scaled.contains(*f)) {
            Some(f) => Err(TrustError::FeatureNotScaled { feature: f.name().to_string() }),
            None => Ok(()),
        }
    }
}

/// A reviewer with its final score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReviewer {
    pub reviewer_id: String,
    pub trust_score: f64,
    pub stats: ReviewerStats,
    pub scaled: BTreeMap<Feature, f64>,
}

/// Weighted sum of each reviewer's scaled features. Order is preserved.
pub fn score(rows: &[ScaledStats], weights: &WeightTable) -> Result<Vec<ScoredReviewer>, TrustError> {
    rows.iter()
        .map(|row| {
            let mut trust_score = 0.0;
            for feature in WEIGHTED_FEATURES {
                let value = row
                    .get(feature)
                    .ok_or_else(|| TrustError::FeatureNotScaled { feature: feature.name().to_string() })?;
                trust_score += weights.weight(feature) * value;
            }
            Ok(ScoredReviewer {
                reviewer_id: row.stats.reviewer_id.clone(),
                trust_score,
                stats: row.stats.clone(),
                scaled: row.scaled.clone(),
            })
        })
        .collect()
}
