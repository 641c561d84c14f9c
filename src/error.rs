use thiserror::Error;

/// Failures raised by the scoring stages. Configuration problems only;
/// the stages themselves have no failing data paths.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrustError {
    #[error("Weight table is missing required feature '{feature}'")]
    MissingWeight { feature: String },

    #[error("Weight table has unrecognized key '{key}'")]
    UnknownWeight { key: String },

    #[error("Weight for '{feature}' must be a finite non-negative number, got {value}")]
    InvalidWeight { feature: String, value: f64 },

    #[error("Unknown feature '{name}'")]
    UnknownFeature { name: String },

    #[error("Recency window of {days} days is out of range")]
    InvalidWindow { days: i64 },

    #[error("Feature '{feature}' is weighted but was not normalized")]
    FeatureNotScaled { feature: String },
}
