//! Error types for statistical estimators

use thiserror::Error;

/// Errors raised by the estimators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("No observations supplied")]
    EmptyInput,

    #[error("At least {needed} observations required, got {actual}")]
    TooFewObservations { needed: usize, actual: usize },

    #[error("At least two repetitions required for a cross-repetition interval, got {0}")]
    InsufficientRepetitions(usize),

    #[error("Repetitions are not balanced: lengths range from {min} to {max}")]
    Unbalanced { min: usize, max: usize },

    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("{context}: value {value} outside [{min}, {max}]")]
    NumericRange {
        context: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Order statistic position {position} outside 0..{n}")]
    RankOutOfRange { position: i64, n: usize },

    #[error("Unsupported reference distribution: {0}")]
    UnsupportedDistribution(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

/// Result type for estimator operations
pub type StatsResult<T> = Result<T, StatsError>;
