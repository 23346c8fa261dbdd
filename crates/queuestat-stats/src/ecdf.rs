//! Empirical Cumulative Distribution Function (ECDF)
//!
//! The ECDF is a step function that estimates the underlying CDF of a sample.
//! For a sample of n values, ECDF(x) = (number of values <= x) / n.
//!
//! Points are produced once per distinct value, so tied observations collapse
//! into a single taller step. When the observations are column means across
//! repetitions, each point can carry the CI half-width of its x position.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// ECDF step points, one per distinct observed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcdfPoints {
    /// Distinct values, ascending
    pub x: Vec<f64>,
    /// Cumulative probability at each distinct value; the last is exactly 1
    pub y: Vec<f64>,
    /// CI half-width of each x position, if supplied
    pub error: Option<Vec<f64>>,
    /// Number of observations the ECDF was built from
    pub sample_size: usize,
}

impl EcdfPoints {
    /// Build ECDF points from observations
    ///
    /// Time complexity: O(n log n) for sorting
    pub fn from_observations(observations: &[f64]) -> StatsResult<Self> {
        Self::build(observations, None)
    }

    /// Build ECDF points carrying a per-observation error bar
    ///
    /// Each distinct value keeps the largest error among its tied observations.
    pub fn with_errors(observations: &[f64], errors: &[f64]) -> StatsResult<Self> {
        if observations.len() != errors.len() {
            return Err(StatsError::LengthMismatch {
                expected: observations.len(),
                actual: errors.len(),
            });
        }
        Self::build(observations, Some(errors))
    }

    fn build(observations: &[f64], errors: Option<&[f64]>) -> StatsResult<Self> {
        let n = observations.len();
        if n == 0 {
            return Err(StatsError::EmptyInput);
        }
        if let Some(index) = observations.iter().position(|v| !v.is_finite()) {
            return Err(StatsError::InvalidParameter(format!(
                "non-finite observation at index {index}"
            )));
        }

        let mut pairs: Vec<(f64, f64)> = match errors {
            Some(errors) => observations.iter().copied().zip(errors.iter().copied()).collect(),
            None => observations.iter().map(|&v| (v, 0.0)).collect(),
        };
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let step_height = 1.0 / n as f64;
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut err = Vec::new();
        let mut cumulative = 0.0;

        let mut i = 0;
        while i < pairs.len() {
            let value = pairs[i].0;
            let mut max_error = pairs[i].1;
            let mut count = 0usize;

            while i < pairs.len() && pairs[i].0 == value {
                max_error = max_error.max(pairs[i].1);
                count += 1;
                i += 1;
            }

            cumulative += count as f64 * step_height;
            x.push(value);
            y.push(cumulative);
            err.push(max_error);
        }

        // Remove accumulated rounding drift
        if let Some(last) = y.last_mut() {
            *last = 1.0;
        }

        Ok(Self {
            x,
            y,
            error: errors.map(|_| err),
            sample_size: n,
        })
    }

    /// Evaluate the ECDF at a point
    ///
    /// Returns the proportion of observations <= `value`.
    /// Time complexity: O(log n)
    pub fn evaluate(&self, value: f64) -> f64 {
        match self.x.partition_point(|&v| v <= value) {
            0 => 0.0,
            idx => self.y[idx - 1],
        }
    }

    /// Number of distinct points
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if there are no points
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
