//! Summary statistics with confidence intervals
//!
//! Provides the estimators used on pooled simulation observations:
//! - Sample mean with a normal-approximation CI
//! - Sample median and sample quantile with order-statistic CIs
//! - Coefficient of variation (with its theoretical sanity bound)
//! - Index of dispersion for queue occupancy
//! - Partial (running) variance for the finite-variance check

use crate::error::{StatsError, StatsResult};
use crate::estimate::{standard_normal_quantile, warn_if_insufficient, Estimate};
use crate::repetitions::{time_averages, TimedObservations};

/// Arithmetic mean (NaN for empty input)
pub fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance with an `n - 1` denominator
pub fn sample_variance(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() as f64 - 1.0)
}

/// Sample standard deviation with an `n - 1` denominator
pub fn sample_std(data: &[f64]) -> f64 {
    sample_variance(data).sqrt()
}

/// Sorted copy of the data (ascending, NaN last)
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut values = data.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

/// Median of already-sorted data, averaging the middle pair for even n
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Quantile of already-sorted data, interpolating linearly at rank `q * (n - 1)`
fn interpolated_quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    let rank = q * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let fraction = rank - lower as f64;

    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// 1-indexed ranks `(j, k)` of the order statistics bounding a CI for the p-quantile
///
/// `j = floor(n p - z sqrt(n p (1 - p)))`, `k = ceil(n p + z sqrt(n p (1 - p))) + 1`
fn order_statistic_ranks(n: usize, p: f64, z: f64) -> (i64, i64) {
    let n = n as f64;
    let spread = z * (n * p * (1.0 - p)).sqrt();
    let lower = (n * p - spread).floor() as i64;
    let upper = (n * p + spread).ceil() as i64 + 1;
    (lower, upper)
}

fn order_statistic(sorted: &[f64], position: i64) -> StatsResult<f64> {
    usize::try_from(position)
        .ok()
        .and_then(|index| sorted.get(index).copied())
        .ok_or(StatsError::RankOutOfRange {
            position,
            n: sorted.len(),
        })
}

fn require_observations(data: &[f64], needed: usize) -> StatsResult<()> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    if data.len() < needed {
        return Err(StatsError::TooFewObservations {
            needed,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Sample mean with a symmetric normal-approximation CI
///
/// `error = s / sqrt(n) * z`. Fewer than 30 observations only log a warning.
pub fn sample_mean(observations: &[f64], confidence_level: f64) -> StatsResult<Estimate> {
    require_observations(observations, 2)?;
    let z = standard_normal_quantile(confidence_level)?;
    let n = observations.len();
    warn_if_insufficient(n, "mean");

    let error = sample_std(observations) / (n as f64).sqrt() * z;
    Ok(Estimate::symmetric(mean(observations), error, n))
}

/// Sample median with an asymmetric order-statistic CI
///
/// The 1-indexed ranks from the CI formula are converted to array positions
/// by subtracting one.
pub fn sample_median(observations: &[f64], confidence_level: f64) -> StatsResult<Estimate> {
    require_observations(observations, 1)?;
    let z = standard_normal_quantile(confidence_level)?;
    let n = observations.len();
    warn_if_insufficient(n, "median");

    let ordered = sorted(observations);
    let (lower_rank, upper_rank) = order_statistic_ranks(n, 0.5, z);
    let lower = order_statistic(&ordered, lower_rank - 1)?;
    let upper = order_statistic(&ordered, upper_rank - 1)?;

    Ok(Estimate::from_bounds(
        median_of_sorted(&ordered),
        lower,
        upper,
        n,
    ))
}

/// Sample q-quantile with an asymmetric order-statistic CI
///
/// The point estimate interpolates linearly between order statistics. The CI
/// bounds are read at array positions `rank + 1`, two places above the
/// `rank - 1` positions used by [`sample_median`].
pub fn sample_quantile(
    observations: &[f64],
    q: f64,
    confidence_level: f64,
) -> StatsResult<Estimate> {
    if !(q > 0.0 && q < 1.0) {
        return Err(StatsError::InvalidParameter(format!(
            "quantile must lie in (0, 1), got {q}"
        )));
    }
    require_observations(observations, 1)?;
    let z = standard_normal_quantile(confidence_level)?;
    let n = observations.len();
    warn_if_insufficient(n, "quantile");

    let ordered = sorted(observations);
    let (lower_rank, upper_rank) = order_statistic_ranks(n, q, z);
    let lower = order_statistic(&ordered, lower_rank + 1)?;
    let upper = order_statistic(&ordered, upper_rank + 1)?;

    Ok(Estimate::from_bounds(
        interpolated_quantile(&ordered, q),
        lower,
        upper,
        n,
    ))
}

/// Sample coefficient of variation `s / mean`
///
/// For non-negative data the CoV cannot exceed `sqrt(n - 1)`; a value outside
/// `[0, sqrt(n - 1)]` means the data violates the modelling assumptions.
pub fn coefficient_of_variation(observations: &[f64]) -> StatsResult<f64> {
    require_observations(observations, 2)?;

    let cov = sample_std(observations) / mean(observations);
    let bound = ((observations.len() - 1) as f64).sqrt();

    if !cov.is_finite() || cov < 0.0 || cov > bound {
        return Err(StatsError::NumericRange {
            context: "coefficient of variation".to_string(),
            value: cov,
            min: 0.0,
            max: bound,
        });
    }

    Ok(cov)
}

/// Index of dispersion of a queue-occupancy signal
///
/// The numerator is the sample variance of the pooled observations, while the
/// denominator is the mean of the per-repetition time averages.
pub fn index_of_dispersion(
    observations: &[f64],
    repetitions: &[TimedObservations],
) -> StatsResult<f64> {
    require_observations(observations, 2)?;
    if repetitions.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let averages = time_averages(repetitions)?;
    let average_occupancy = mean(&averages);
    if average_occupancy == 0.0 {
        return Err(StatsError::DegenerateInput(
            "mean time-averaged occupancy is zero".to_string(),
        ));
    }

    Ok(sample_variance(observations) / average_occupancy)
}

/// Running sample variance after each prefix of the data
///
/// The first entry is defined as 0. A sequence that keeps growing instead of
/// settling hints at an infinite-variance distribution.
pub fn partial_variance(observations: &[f64]) -> Vec<f64> {
    let mut result = Vec::with_capacity(observations.len());
    let mut running_mean = 0.0;
    let mut m2 = 0.0;

    for (i, &x) in observations.iter().enumerate() {
        let count = (i + 1) as f64;
        let delta = x - running_mean;
        running_mean += delta / count;
        m2 += delta * (x - running_mean);

        if i == 0 {
            result.push(0.0);
        } else {
            result.push(m2 / (count - 1.0));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_hundred() -> Vec<f64> {
        (1..=100).map(|x| x as f64).collect()
    }

    #[test]
    fn test_mean_and_variance() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert!((mean(&data) - 2.5).abs() < 1e-12);
        assert!((sample_variance(&data) - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_mean() {
        let data = one_to_hundred();
        let est = sample_mean(&data, 0.95).unwrap();

        let expected_std = (100.0_f64 * 101.0 / 12.0).sqrt();
        let z = standard_normal_quantile(0.95).unwrap();
        assert!((est.value - 50.5).abs() < 1e-12);
        assert!((est.lower_error - expected_std / 10.0 * z).abs() < 1e-9);
        assert_eq!(est.lower_error, est.upper_error);
        assert!(est.is_sufficient());
    }

    #[test]
    fn test_sample_mean_small_sample_still_computes() {
        let est = sample_mean(&[1.0, 2.0, 3.0], 0.95).unwrap();
        assert!((est.value - 2.0).abs() < 1e-12);
        assert!(!est.is_sufficient());
    }

    #[test]
    fn test_sample_mean_empty() {
        assert_eq!(sample_mean(&[], 0.95), Err(StatsError::EmptyInput));
    }

    #[test]
    fn test_sample_median() {
        let data = one_to_hundred();
        let est = sample_median(&data, 0.95).unwrap();

        // ranks 40 and 61 -> positions 39 and 60
        assert!((est.value - 50.5).abs() < 1e-12);
        assert!((est.lower_bound() - 40.0).abs() < 1e-12);
        assert!((est.upper_bound() - 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_median_odd_count() {
        let data: Vec<f64> = (1..=101).rev().map(|x| x as f64).collect();
        let est = sample_median(&data, 0.9).unwrap();
        assert_eq!(est.value, 51.0);
    }

    #[test]
    fn test_sample_median_rank_out_of_range() {
        let result = sample_median(&[1.0, 2.0, 3.0], 0.99);
        assert!(matches!(result, Err(StatsError::RankOutOfRange { .. })));
    }

    #[test]
    fn test_sample_quantile() {
        let data = one_to_hundred();
        let est = sample_quantile(&data, 0.9, 0.95).unwrap();

        // ranks 84 and 97 -> positions 85 and 98
        assert!((est.value - 90.1).abs() < 1e-9);
        assert!((est.lower_bound() - 86.0).abs() < 1e-9);
        assert!((est.upper_bound() - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_quantile_rejects_bad_q() {
        let data = one_to_hundred();
        assert!(sample_quantile(&data, 0.0, 0.95).is_err());
        assert!(sample_quantile(&data, 1.0, 0.95).is_err());
    }

    #[test]
    fn test_interval_width_grows_with_confidence() {
        let data: Vec<f64> = (0..500).map(|i| ((i * 37) % 101) as f64).collect();
        let levels = [0.8, 0.9, 0.95, 0.99];

        for pair in levels.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            assert!(
                sample_mean(&data, low).unwrap().width()
                    <= sample_mean(&data, high).unwrap().width()
            );
            assert!(
                sample_median(&data, low).unwrap().width()
                    <= sample_median(&data, high).unwrap().width()
            );
            assert!(
                sample_quantile(&data, 0.75, low).unwrap().width()
                    <= sample_quantile(&data, 0.75, high).unwrap().width()
            );
        }
    }

    #[test]
    fn test_coefficient_of_variation() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let cov = coefficient_of_variation(&data).unwrap();
        let expected = sample_std(&data) / 5.0;
        assert!((cov - expected).abs() < 1e-12);
    }

    #[test]
    fn test_coefficient_of_variation_above_bound() {
        // CoV = 2 > sqrt(3)
        let result = coefficient_of_variation(&[0.0, 0.0, 0.0, 10.0]);
        assert!(matches!(result, Err(StatsError::NumericRange { .. })));
    }

    #[test]
    fn test_coefficient_of_variation_negative_mean() {
        let result = coefficient_of_variation(&[-1.0, -2.0, -3.0]);
        assert!(matches!(result, Err(StatsError::NumericRange { .. })));
    }

    #[test]
    fn test_index_of_dispersion() {
        let observations = vec![1.0, 2.0, 3.0, 4.0];
        let repetitions = vec![
            TimedObservations::new(vec![2.0, 4.0, 0.0], vec![0.0, 10.0, 40.0]).unwrap(),
            TimedObservations::new(vec![1.0, 1.0], vec![0.0, 1.0]).unwrap(),
        ];

        // variance 5/3 over mean time average (3.5 + 1.0) / 2
        let iod = index_of_dispersion(&observations, &repetitions).unwrap();
        assert!((iod - (5.0 / 3.0) / 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_index_of_dispersion_without_repetitions() {
        assert_eq!(
            index_of_dispersion(&[1.0, 2.0], &[]),
            Err(StatsError::EmptyInput)
        );
    }

    #[test]
    fn test_partial_variance() {
        let pv = partial_variance(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(pv[0], 0.0);
        assert!((pv[1] - 0.5).abs() < 1e-12);
        assert!((pv[2] - 1.0).abs() < 1e-12);
        assert!((pv[3] - 5.0 / 3.0).abs() < 1e-12);
    }
}
