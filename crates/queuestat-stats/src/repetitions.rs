//! Cross-repetition aggregation
//!
//! A scenario is simulated several times (repetitions). Each repetition yields
//! an observation vector; together they form a repetition matrix whose rows may
//! have different lengths. Column-wise statistics require the matrix to be
//! balanced first:
//!
//! ```text
//!                X11 X12 X13 ... X1n   ||
//!                X21 X22 X23 ... X2n   ||   column mean
//!                ... ... ...     ...   ||
//!                Xr1 Xr2 Xr3 ... Xrn   \/
//!                ___________________
//!                X'1 X'2 X'3 ... X'n
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::estimate::{standard_normal_quantile, Estimate};
use crate::summary::{mean, sample_std};

/// Truncate every repetition to a common length, keeping prefixes
///
/// The common length is the shortest repetition, further limited by `cap`.
pub fn balance(matrix: &[Vec<f64>], cap: Option<usize>) -> StatsResult<Vec<Vec<f64>>> {
    let shortest = matrix
        .iter()
        .map(Vec::len)
        .min()
        .ok_or(StatsError::EmptyInput)?;

    let level = match cap {
        Some(cap) => shortest.min(cap),
        None => shortest,
    };

    Ok(matrix.iter().map(|row| row[..level].to_vec()).collect())
}

/// Check whether all repetitions have the same length
pub fn is_balanced(matrix: &[Vec<f64>]) -> bool {
    match matrix.first() {
        Some(first) => matrix.iter().all(|row| row.len() == first.len()),
        None => true,
    }
}

/// Concatenate all repetitions into one flat observation vector
pub fn pool(matrix: &[Vec<f64>]) -> Vec<f64> {
    matrix.iter().flatten().copied().collect()
}

/// Column-wise means across repetitions with their CI half-widths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnwiseMean {
    /// Mean of each column
    pub means: Vec<f64>,
    /// CI half-width of each column mean
    pub errors: Vec<f64>,
    /// Number of repetitions (rows) aggregated
    pub repetitions: usize,
}

impl ColumnwiseMean {
    /// Number of columns
    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// Check if there are no columns
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }
}

/// Mean and CI of each column of a balanced repetition matrix
///
/// For column `j`: `error_j = std_j / sqrt(r) * z`, with the sample standard
/// deviation (n - 1 denominator) taken across the `r` repetitions.
pub fn columnwise_mean(matrix: &[Vec<f64>], confidence_level: f64) -> StatsResult<ColumnwiseMean> {
    if matrix.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    if !is_balanced(matrix) {
        let min = matrix.iter().map(Vec::len).min().unwrap_or(0);
        let max = matrix.iter().map(Vec::len).max().unwrap_or(0);
        return Err(StatsError::Unbalanced { min, max });
    }

    let repetitions = matrix.len();
    if repetitions < 2 {
        return Err(StatsError::InsufficientRepetitions(repetitions));
    }

    let z = standard_normal_quantile(confidence_level)?;
    let scale = z / (repetitions as f64).sqrt();
    let columns = matrix[0].len();

    let mut means = Vec::with_capacity(columns);
    let mut errors = Vec::with_capacity(columns);
    let mut column = Vec::with_capacity(repetitions);

    for j in 0..columns {
        column.clear();
        column.extend(matrix.iter().map(|row| row[j]));
        means.push(mean(&column));
        errors.push(sample_std(&column) * scale);
    }

    Ok(ColumnwiseMean {
        means,
        errors,
        repetitions,
    })
}

/// An observation vector paired with the simulation times it was recorded at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedObservations {
    pub values: Vec<f64>,
    pub times: Vec<f64>,
}

impl TimedObservations {
    /// Pair values with their time stamps
    pub fn new(values: Vec<f64>, times: Vec<f64>) -> StatsResult<Self> {
        if values.len() != times.len() {
            return Err(StatsError::LengthMismatch {
                expected: values.len(),
                actual: times.len(),
            });
        }
        Ok(Self { values, times })
    }

    /// Number of recorded points
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Time-weighted average of the piecewise-constant signal
    pub fn time_average(&self) -> StatsResult<f64> {
        time_average(&self.values, &self.times)
    }
}

/// Time-weighted average of a piecewise-constant signal
///
/// Each value holds from its own time stamp until the next one; the last
/// value only closes the observation window.
pub fn time_average(values: &[f64], times: &[f64]) -> StatsResult<f64> {
    if values.len() != times.len() {
        return Err(StatsError::LengthMismatch {
            expected: values.len(),
            actual: times.len(),
        });
    }
    if values.len() < 2 {
        return Err(StatsError::TooFewObservations {
            needed: 2,
            actual: values.len(),
        });
    }

    let span = times[times.len() - 1] - times[0];
    if span == 0.0 || !span.is_finite() {
        return Err(StatsError::DegenerateInput(format!(
            "observation window has length {span}"
        )));
    }

    let weighted: f64 = values
        .iter()
        .zip(times.windows(2))
        .map(|(value, t)| value * (t[1] - t[0]))
        .sum();

    Ok(weighted / span)
}

/// Time averages of every repetition, in input order
pub fn time_averages(repetitions: &[TimedObservations]) -> StatsResult<Vec<f64>> {
    repetitions.iter().map(TimedObservations::time_average).collect()
}

/// Mean of the per-repetition time averages with a normal-approximation CI
///
/// Each repetition contributes one observation, so no data-sufficiency
/// warning is raised for small repetition counts.
pub fn time_average_mean(repetitions: &[TimedObservations], confidence_level: f64) -> StatsResult<Estimate> {
    let averages = time_averages(repetitions)?;
    let r = averages.len();
    if r < 2 {
        return Err(StatsError::InsufficientRepetitions(r));
    }

    let z = standard_normal_quantile(confidence_level)?;
    let error = sample_std(&averages) / (r as f64).sqrt() * z;
    Ok(Estimate::symmetric(mean(&averages), error, r))
}
