//! Lorenz curve points
//!
//! The Lorenz curve plots the cumulative share of the total against the
//! cumulative share of observations. For waiting times it shows how much of
//! the total waiting is concentrated in the longest waits.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Lorenz curve points, starting at the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LorenzPoints {
    /// Cumulative observation share `k / n`
    pub x: Vec<f64>,
    /// Cumulative value share
    pub y: Vec<f64>,
}

impl LorenzPoints {
    /// Build the curve from observations in the order given
    ///
    /// The observations are not sorted here; pass them ascending for the
    /// classical curve.
    pub fn from_observations(observations: &[f64]) -> StatsResult<Self> {
        let n = observations.len();
        if n == 0 {
            return Err(StatsError::EmptyInput);
        }

        let total: f64 = observations.iter().sum();
        if total == 0.0 || !total.is_finite() {
            return Err(StatsError::DegenerateInput(format!(
                "Lorenz curve needs a finite non-zero total, got {total}"
            )));
        }

        let mut x = Vec::with_capacity(n + 1);
        let mut y = Vec::with_capacity(n + 1);
        x.push(0.0);
        y.push(0.0);

        let mut cumulative = 0.0;
        for (k, value) in observations.iter().enumerate() {
            cumulative += value;
            x.push((k + 1) as f64 / n as f64);
            y.push(cumulative / total);
        }

        Ok(Self { x, y })
    }

    /// Number of points, including the origin
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if there are no points
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lorenz_basic() {
        let curve = LorenzPoints::from_observations(&[1.0, 2.0, 3.0, 4.0]).unwrap();

        assert_eq!(curve.len(), 5);
        assert_eq!(curve.x, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!((curve.y[1] - 0.1).abs() < 1e-12);
        assert!((curve.y[2] - 0.3).abs() < 1e-12);
        assert!((curve.y[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lorenz_endpoints_and_monotone() {
        let data: Vec<f64> = (0..200).map(|i| (i as f64).sqrt()).collect();
        let curve = LorenzPoints::from_observations(&data).unwrap();

        assert_eq!((curve.x[0], curve.y[0]), (0.0, 0.0));
        assert!(curve.x.windows(2).all(|w| w[0] <= w[1]));
        assert!(curve.y.windows(2).all(|w| w[0] <= w[1]));
        assert!((curve.x.last().unwrap() - 1.0).abs() < 1e-12);
        assert!((curve.y.last().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lorenz_keeps_input_order() {
        let curve = LorenzPoints::from_observations(&[3.0, 1.0]).unwrap();
        assert!((curve.y[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_lorenz_errors() {
        assert_eq!(LorenzPoints::from_observations(&[]), Err(StatsError::EmptyInput));
        assert!(matches!(
            LorenzPoints::from_observations(&[0.0, 0.0]),
            Err(StatsError::DegenerateInput(_))
        ));
    }
}
