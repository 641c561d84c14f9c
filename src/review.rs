use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Ratings outside this range are clamped onto it
pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// A validated review. Every field the scoring stages read is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub reviewer_id: String,
    pub review_text: String,
    pub rating: f64,
    pub review_date: NaiveDateTime,
    pub helpful_votes: Option<u32>,
    pub verified_purchase: bool,
    pub review_length_words: usize,
}

impl Review {
    pub fn new(
        reviewer_id: impl Into<String>,
        review_text: impl Into<String>,
        rating: f64,
        review_date: NaiveDateTime,
        helpful_votes: Option<u32>,
        verified_purchase: bool,
    ) -> Self {
        let review_text = review_text.into();
        let review_length_words = review_text.split_whitespace().count();
        Self {
            reviewer_id: reviewer_id.into(),
            review_text,
            rating: rating.clamp(MIN_RATING, MAX_RATING),
            review_date,
            helpful_votes,
            verified_purchase,
            review_length_words,
        }
    }
}

/// Loosely typed cell value as it appears in exported review dumps
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Int(i) => *i as f64,
            Scalar::Float(f) => *f,
            Scalar::Text(s) => s.trim().parse::<f64>().ok()?,
            Scalar::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    fn as_count(&self) -> Option<u32> {
        let value = self.as_f64()?;
        if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return None;
        }
        Some(value as u32)
    }

    fn as_flag(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Int(0) => Some(false),
            Scalar::Int(1) => Some(true),
            Scalar::Float(f) if *f == 0.0 => Some(false),
            Scalar::Float(f) if *f == 1.0 => Some(true),
            Scalar::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// One line of input before validation. Source column names from the
/// upstream dataset export are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReview {
    #[serde(default, alias = "user_id")]
    pub reviewer_id: Option<Scalar>,
    #[serde(default)]
    pub review_text: Option<Scalar>,
    #[serde(default)]
    pub rating: Option<Scalar>,
    #[serde(default)]
    pub review_date: Option<String>,
    #[serde(default, alias = "num_helpful_votes")]
    pub helpful_votes: Option<Scalar>,
    #[serde(default)]
    pub verified_purchase: Option<Scalar>,
}

impl RawReview {
    /// Validate and coerce. `None` when a required field is missing or
    /// unparseable.
    pub fn clean(&self) -> Option<Review> {
        let reviewer_id = self.reviewer_id.as_ref()?.as_text();
        let review_text = self.review_text.as_ref()?.as_text();
        let rating = self.rating.as_ref()?.as_f64()?;
        let review_date = parse_date(self.review_date.as_deref()?)?;
        let helpful_votes = self.helpful_votes.as_ref().and_then(Scalar::as_count);
        let verified_purchase = self
            .verified_purchase
            .as_ref()
            .and_then(Scalar::as_flag)
            .unwrap_or(false);

        Some(Review::new(
            reviewer_id,
            review_text,
            rating,
            review_date,
            helpful_votes,
            verified_purchase,
        ))
    }
}

/// Parse a review timestamp. Zoned inputs are converted to UTC and the zone
/// dropped; bare dates land on midnight.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Output of the cleaning pass
#[derive(Debug, Clone, Default)]
pub struct CleanedBatch {
    pub reviews: Vec<Review>,
    /// Parsed rows rejected for missing or unparseable required fields
    pub dropped: usize,
    /// Lines that were not valid JSON objects
    pub malformed: usize,
}

/// Clean a JSON Lines document. Blank lines are skipped.
pub fn clean_lines(content: &str) -> CleanedBatch {
    let mut batch = CleanedBatch::default();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw: RawReview = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Line {}: malformed record: {}", idx + 1, e);
                batch.malformed += 1;
                continue;
            }
        };
        match raw.clean() {
            Some(review) => batch.reviews.push(review),
            None => {
                debug!("Line {}: dropped, missing required field", idx + 1);
                batch.dropped += 1;
            }
        }
    }

    if batch.dropped + batch.malformed > 0 {
        warn!(
            "Cleaner dropped {} rows ({} incomplete, {} malformed)",
            batch.dropped + batch.malformed,
            batch.dropped,
            batch.malformed
        );
    }
    batch
}

pub fn load_jsonl(path: impl AsRef<Path>) -> anyhow::Result<CleanedBatch> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read reviews '{}': {}", path.display(), e))?;
    let batch = clean_lines(&content);
    info!("Loaded {} reviews from {}", batch.reviews.len(), path.display());
    Ok(batch)
}
