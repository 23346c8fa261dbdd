//! Mean throughput curve across runs
//!
//! Used to choose the warm-up period: each run records throughput only when
//! it changes, so runs are first aligned on the union of all their time
//! stamps by holding the last recorded value, then averaged point by point.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::repetitions::TimedObservations;

/// Mean step-held signal across runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputCurve {
    /// Sorted union of all run time stamps, starting at 0
    pub sampling_times: Vec<f64>,
    /// Mean across runs at each sampling time
    pub mean: Vec<f64>,
    /// Number of runs averaged
    pub runs: usize,
}

impl ThroughputCurve {
    /// Align runs on a common time grid and average them
    pub fn from_runs(runs: &[TimedObservations]) -> StatsResult<Self> {
        if runs.is_empty() {
            return Err(StatsError::EmptyInput);
        }

        let sampling_times = sampling_times(runs);
        let mut sum = vec![0.0; sampling_times.len()];

        for run in runs {
            for (total, value) in sum.iter_mut().zip(step_hold(run, &sampling_times)) {
                *total += value;
            }
        }

        let count = runs.len() as f64;
        let mean = sum.into_iter().map(|total| total / count).collect();

        Ok(Self {
            sampling_times,
            mean,
            runs: runs.len(),
        })
    }

    /// Number of sampling points
    pub fn len(&self) -> usize {
        self.sampling_times.len()
    }

    /// Check if the curve has no points
    pub fn is_empty(&self) -> bool {
        self.sampling_times.is_empty()
    }
}

fn sampling_times(runs: &[TimedObservations]) -> Vec<f64> {
    let mut times: Vec<f64> = std::iter::once(0.0)
        .chain(runs.iter().flat_map(|run| run.times.iter().copied()))
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup();
    times
}

/// Value of the run's latest event at or before each sampling time (0 before the first)
fn step_hold(run: &TimedObservations, sampling_times: &[f64]) -> Vec<f64> {
    let mut held = Vec::with_capacity(sampling_times.len());
    let mut current = 0.0;
    let mut next = 0;

    for &t in sampling_times {
        while next < run.times.len() && run.times[next] <= t {
            current = run.values[next];
            next += 1;
        }
        held.push(current);
    }

    held
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_curve_aligns_runs() {
        let runs = vec![
            TimedObservations::new(vec![1.0, 3.0], vec![10.0, 30.0]).unwrap(),
            TimedObservations::new(vec![2.0], vec![20.0]).unwrap(),
        ];
        let curve = ThroughputCurve::from_runs(&runs).unwrap();

        assert_eq!(curve.sampling_times, vec![0.0, 10.0, 20.0, 30.0]);
        // run 1: 0, 1, 1, 3   run 2: 0, 0, 2, 2
        assert_eq!(curve.mean, vec![0.0, 0.5, 1.5, 2.5]);
        assert_eq!(curve.runs, 2);
    }

    #[test]
    fn test_throughput_curve_single_run_is_itself() {
        let run = TimedObservations::new(vec![0.2, 0.4, 0.3], vec![0.0, 5.0, 9.0]).unwrap();
        let curve = ThroughputCurve::from_runs(&[run]).unwrap();

        assert_eq!(curve.sampling_times, vec![0.0, 5.0, 9.0]);
        assert_eq!(curve.mean, vec![0.2, 0.4, 0.3]);
    }

    #[test]
    fn test_throughput_curve_empty() {
        assert_eq!(ThroughputCurve::from_runs(&[]), Err(StatsError::EmptyInput));
    }
}
