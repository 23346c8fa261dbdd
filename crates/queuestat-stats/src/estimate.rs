//! Point estimates with confidence intervals
//!
//! Intervals are stored as distances from the estimate so that renderers
//! can add and subtract them directly as error bars.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{StatsError, StatsResult};

/// Observation count below which a confidence interval is flagged as unreliable
pub const MIN_CI_OBSERVATIONS: usize = 30;

/// A point estimate with an (optionally asymmetric) confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Point estimate
    pub value: f64,
    /// Distance from the estimate to the lower CI bound
    pub lower_error: f64,
    /// Distance from the estimate to the upper CI bound
    pub upper_error: f64,
    /// Number of observations the estimate was computed from
    pub sample_size: usize,
}

impl Estimate {
    /// Create an estimate with a symmetric interval
    pub fn symmetric(value: f64, error: f64, sample_size: usize) -> Self {
        Self {
            value,
            lower_error: error,
            upper_error: error,
            sample_size,
        }
    }

    /// Create an estimate from absolute interval bounds
    pub fn from_bounds(value: f64, lower: f64, upper: f64, sample_size: usize) -> Self {
        Self {
            value,
            lower_error: value - lower,
            upper_error: upper - value,
            sample_size,
        }
    }

    /// Absolute lower bound of the interval
    pub fn lower_bound(&self) -> f64 {
        self.value - self.lower_error
    }

    /// Absolute upper bound of the interval
    pub fn upper_bound(&self) -> f64 {
        self.value + self.upper_error
    }

    /// Total width of the interval
    pub fn width(&self) -> f64 {
        self.lower_error + self.upper_error
    }

    /// Whether enough observations backed the interval
    pub fn is_sufficient(&self) -> bool {
        self.sample_size >= MIN_CI_OBSERVATIONS
    }

    /// Attach a label, producing the tuple handed to renderers
    pub fn labelled(&self, label: impl Into<String>) -> SummaryTuple {
        SummaryTuple {
            label: label.into(),
            estimate: self.value,
            lower_error: self.lower_error,
            upper_error: self.upper_error,
        }
    }
}

/// Labelled estimate: `(label, point_estimate, [lower_error, upper_error])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTuple {
    pub label: String,
    pub estimate: f64,
    pub lower_error: f64,
    pub upper_error: f64,
}

/// Two-sided standard normal quantile for a confidence level
///
/// Returns `z` such that `P(|Z| <= z) = confidence_level`,
/// e.g. 0.99 gives roughly 2.576.
pub fn standard_normal_quantile(confidence_level: f64) -> StatsResult<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(StatsError::InvalidParameter(format!(
            "confidence level must lie in (0, 1), got {confidence_level}"
        )));
    }

    let alpha = 1.0 - confidence_level;
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| StatsError::InvalidParameter(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - alpha / 2.0))
}

/// Log a data-sufficiency warning when a CI rests on too few observations
pub(crate) fn warn_if_insufficient(sample_size: usize, estimator: &str) {
    if sample_size < MIN_CI_OBSERVATIONS {
        tracing::warn!(
            observations = sample_size,
            minimum = MIN_CI_OBSERVATIONS,
            "too few observations for a reliable {} confidence interval",
            estimator
        );
    }
}
