use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Feature name → weight. Absent means the canonical table.
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub recency: RecencyConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NormalizeConfig {
    /// Features rescaled onto [0,1] before scoring
    #[serde(default = "default_features")]
    pub features: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecencyConfig {
    /// Lookback from the newest review in the batch (inclusive)
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeaderboardConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Width in characters of a full-score bar in the top-K table
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self { features: default_features() }
    }
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self { window_days: default_window_days() }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { top_k: default_top_k() }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            histogram_bins: default_histogram_bins(),
            bar_width: default_bar_width(),
        }
    }
}

// Default value functions
fn default_features() -> Vec<String> {
    [
        "num_reviews",
        "avg_rating",
        "rating_stddev",
        "avg_review_length",
        "avg_helpful_votes",
        "verified_ratio",
        "recent_reviews",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_window_days() -> i64 { 180 }
fn default_top_k() -> usize { 10 }
fn default_histogram_bins() -> usize { 30 }
fn default_bar_width() -> usize { 40 }

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config '{}': {}", path, e))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.recency.window_days < 0 {
            anyhow::bail!("recency.window_days must be >= 0, got {}", config.recency.window_days);
        }
        if config.report.histogram_bins == 0 {
            anyhow::bail!("report.histogram_bins must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.weights.is_none());
        assert_eq!(config.normalize.features.len(), 7);
        assert_eq!(config.recency.window_days, 180);
        assert_eq!(config.leaderboard.top_k, 10);
        assert_eq!(config.report.histogram_bins, 30);
    }

    #[test]
    fn test_weights_table_is_read_verbatim() {
        let config = Config::parse(
            r#"
            [weights]
            num_reviews = 0.5
            recent_reviews = 0.5
            "#,
        )
        .unwrap();
        let weights = config.weights.unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights["num_reviews"], 0.5);
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config = Config::parse("[leaderboard]\ntop_k = 3\n[report]\nbar_width = 10\n").unwrap();
        assert_eq!(config.leaderboard.top_k, 3);
        assert_eq!(config.report.bar_width, 10);
        assert_eq!(config.report.histogram_bins, 30);
    }

    #[test]
    fn test_rejects_negative_window() {
        assert!(Config::parse("[recency]\nwindow_days = -1\n").is_err());
    }

    #[test]
    fn test_rejects_zero_bins() {
        let err = Config::parse("[report]\nhistogram_bins = 0\n").unwrap_err();
        assert!(err.to_string().contains("histogram_bins"));
    }

    #[test]
    fn test_load_reports_path_on_missing_file() {
        let err = Config::load("/nonexistent/reviewer-trust.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/reviewer-trust.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[recency]\nwindow_days = 30").unwrap();
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.recency.window_days, 30);
    }
}
