//! Quantile-quantile comparison against a reference distribution
//!
//! Sorted observations are paired with reference quantiles at the plotting
//! positions `(i - 0.5) / n`. An ordinary least-squares line through the
//! points measures how well the reference explains the sample: a straight
//! line with R^2 close to 1 means the shapes agree up to location and scale.

use serde::{Deserialize, Serialize};
use statrs::distribution::{
    Binomial, ContinuousCDF, DiscreteCDF, Exp, Geometric, Normal, Poisson, Uniform, Weibull,
};

use crate::error::{StatsError, StatsResult};
use crate::summary::{mean, sorted};

/// Number of points the regression line is sampled at
pub const REGRESSION_LINE_POINTS: usize = 50;

/// Reference distribution for QQ comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ReferenceDistribution {
    /// Standard normal
    Normal,
    /// Exponential with unit rate
    Exponential,
    /// Uniform on [0, 1]
    Uniform,
    /// Weibull with unit scale
    Weibull { shape: f64 },
    /// Poisson counts
    Poisson { mean: f64 },
    /// Binomial counts
    Binomial { trials: u64, probability: f64 },
    /// Geometric number of trials until the first success (support starts at 1)
    Geometric { probability: f64 },
    /// Weibull quantiles rounded down to integers
    DiscreteWeibull { shape: f64 },
}

/// Distribution name plus optional parameters, as read from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSpec {
    pub name: String,
    #[serde(default)]
    pub shape: Option<f64>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub trials: Option<u64>,
    #[serde(default)]
    pub probability: Option<f64>,
}

impl ReferenceSpec {
    /// Spec with only a name, for parameter-free references
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolve the spec into a concrete distribution
    pub fn resolve(&self) -> StatsResult<ReferenceDistribution> {
        ReferenceDistribution::from_spec(self)
    }
}

fn required<T>(value: Option<T>, distribution: &str, parameter: &str) -> StatsResult<T> {
    value.ok_or_else(|| {
        StatsError::InvalidParameter(format!("{distribution} reference needs '{parameter}'"))
    })
}

impl ReferenceDistribution {
    /// Resolve a named reference with its parameters
    pub fn from_spec(spec: &ReferenceSpec) -> StatsResult<Self> {
        let name = spec.name.trim().to_lowercase();
        let distribution = match name.as_str() {
            "normal" => Self::Normal,
            "exponential" => Self::Exponential,
            "uniform" => Self::Uniform,
            "weibull" => Self::Weibull {
                shape: required(spec.shape, "weibull", "shape")?,
            },
            "poisson" => Self::Poisson {
                mean: required(spec.mean, "poisson", "mean")?,
            },
            "binomial" => Self::Binomial {
                trials: required(spec.trials, "binomial", "trials")?,
                probability: required(spec.probability, "binomial", "probability")?,
            },
            "geometric" => Self::Geometric {
                probability: required(spec.probability, "geometric", "probability")?,
            },
            "discrete_weibull" => Self::DiscreteWeibull {
                shape: required(spec.shape, "discrete_weibull", "shape")?,
            },
            _ => return Err(StatsError::UnsupportedDistribution(spec.name.clone())),
        };
        Ok(distribution)
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Exponential => "exponential",
            Self::Uniform => "uniform",
            Self::Weibull { .. } => "weibull",
            Self::Poisson { .. } => "poisson",
            Self::Binomial { .. } => "binomial",
            Self::Geometric { .. } => "geometric",
            Self::DiscreteWeibull { .. } => "discrete_weibull",
        }
    }

    /// Whether the reference has integer support
    pub fn is_discrete(&self) -> bool {
        matches!(
            self,
            Self::Poisson { .. }
                | Self::Binomial { .. }
                | Self::Geometric { .. }
                | Self::DiscreteWeibull { .. }
        )
    }

    /// Inverse CDF evaluated at each probability in (0, 1)
    pub fn quantiles(&self, probabilities: &[f64]) -> StatsResult<Vec<f64>> {
        let invalid = |e: &dyn std::fmt::Display| StatsError::InvalidParameter(e.to_string());

        let values = match *self {
            Self::Normal => {
                let dist = Normal::new(0.0, 1.0).map_err(|e| invalid(&e))?;
                continuous_quantiles(&dist, probabilities)
            }
            Self::Exponential => {
                let dist = Exp::new(1.0).map_err(|e| invalid(&e))?;
                continuous_quantiles(&dist, probabilities)
            }
            Self::Uniform => {
                let dist = Uniform::new(0.0, 1.0).map_err(|e| invalid(&e))?;
                continuous_quantiles(&dist, probabilities)
            }
            Self::Weibull { shape } => {
                let dist = Weibull::new(shape, 1.0).map_err(|e| invalid(&e))?;
                continuous_quantiles(&dist, probabilities)
            }
            Self::DiscreteWeibull { shape } => {
                let dist = Weibull::new(shape, 1.0).map_err(|e| invalid(&e))?;
                continuous_quantiles(&dist, probabilities)
                    .into_iter()
                    .map(f64::floor)
                    .collect()
            }
            Self::Poisson { mean } => {
                let dist = Poisson::new(mean).map_err(|e| invalid(&e))?;
                discrete_quantiles(&dist, probabilities)
            }
            Self::Binomial {
                trials,
                probability,
            } => {
                let dist = Binomial::new(probability, trials).map_err(|e| invalid(&e))?;
                discrete_quantiles(&dist, probabilities)
            }
            Self::Geometric { probability } => {
                let dist = Geometric::new(probability).map_err(|e| invalid(&e))?;
                discrete_quantiles(&dist, probabilities)
            }
        };

        Ok(values)
    }
}

fn continuous_quantiles<D: ContinuousCDF<f64, f64>>(dist: &D, probabilities: &[f64]) -> Vec<f64> {
    probabilities.iter().map(|&p| dist.inverse_cdf(p)).collect()
}

/// Smallest support point `k` with `cdf(k) >= p`, for each p
fn discrete_quantiles<D: DiscreteCDF<u64, f64>>(dist: &D, probabilities: &[f64]) -> Vec<f64> {
    probabilities.iter().map(|&p| dist.inverse_cdf(p) as f64).collect()
}

/// Plotting positions `(i - 0.5) / n` for `i = 1..=n`
pub fn plotting_positions(n: usize) -> Vec<f64> {
    (1..=n).map(|i| (i as f64 - 0.5) / n as f64).collect()
}

/// Result of an ordinary least-squares fit `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination
    pub r_squared: f64,
}

impl LinearFit {
    /// Evaluate the fitted line
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Human-readable equation with four decimals, e.g. `y = 1.0000x + 0.0000`
    pub fn equation(&self) -> String {
        let sign = if self.intercept < 0.0 { '-' } else { '+' };
        format!(
            "y = {:.4}x {} {:.4}\nR^2 = {:.4}",
            self.slope,
            sign,
            self.intercept.abs(),
            self.r_squared
        )
    }
}

/// Ordinary least squares of `y` on `x` with an intercept term
pub fn linear_regression(x: &[f64], y: &[f64]) -> StatsResult<LinearFit> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        sxx += (xi - mean_x).powi(2);
        sxy += (xi - mean_x) * (yi - mean_y);
        syy += (yi - mean_y).powi(2);
    }

    if sxx == 0.0 {
        return Err(StatsError::NumericRange {
            context: "regressor variance".to_string(),
            value: sxx,
            min: f64::MIN_POSITIVE,
            max: f64::INFINITY,
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let residual: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - (slope * xi + intercept)).powi(2))
        .sum();

    // A constant response is fitted exactly by a flat line
    let r_squared = if syy == 0.0 { 1.0 } else { 1.0 - residual / syy };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

/// `count` evenly spaced values from `start` to `end`, both included
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = end;
            values
        }
    }
}

/// QQ plot data with its regression line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QqPoints {
    /// Reference quantiles at the plotting positions
    pub theoretical: Vec<f64>,
    /// Sorted observations
    pub ordered: Vec<f64>,
    /// Regression line abscissae spanning the theoretical range
    pub regression_x: Vec<f64>,
    /// Regression line ordinates
    pub regression_y: Vec<f64>,
    /// Least-squares fit of ordered on theoretical
    pub fit: LinearFit,
    /// Printable fit equation and R^2
    pub equation: String,
}

impl QqPoints {
    /// Compare observations against a reference distribution
    pub fn compute(observations: &[f64], reference: &ReferenceDistribution) -> StatsResult<Self> {
        if observations.is_empty() {
            return Err(StatsError::EmptyInput);
        }

        let ordered = sorted(observations);
        let positions = plotting_positions(ordered.len());
        let theoretical = reference.quantiles(&positions)?;

        let fit = linear_regression(&theoretical, &ordered)?;

        let first = theoretical[0];
        let last = theoretical[theoretical.len() - 1];
        let regression_x = linspace(first, last, REGRESSION_LINE_POINTS);
        let regression_y = regression_x.iter().map(|&x| fit.predict(x)).collect();

        Ok(Self {
            theoretical,
            ordered,
            regression_x,
            regression_y,
            equation: fit.equation(),
            fit,
        })
    }
}
