//! Error types for scenario analyses

use queuestat_erlang::LossError;
use queuestat_io::IoError;
use queuestat_stats::StatsError;
use thiserror::Error;

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),
    /// Related values disagree with each other
    #[error("Inconsistent configuration: {0}")]
    Inconsistent(String),
    /// Required field is missing
    #[error("Missing field: {0}")]
    MissingField(String),
    /// The configuration text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors raised by scenario-level analyses
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Loss(#[from] LossError),

    #[error(transparent)]
    Ingest(#[from] IoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No data for statistic {statistic:?} in scenario {scenario}")]
    ScenarioNotFound { statistic: String, scenario: String },

    #[error("Run {0} carries no recording times")]
    MissingTimes(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for analyses
pub type AnalysisResult<T> = Result<T, AnalysisError>;
