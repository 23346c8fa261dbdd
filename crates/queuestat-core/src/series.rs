//! Labelled series handed to external renderers

use std::collections::BTreeMap;

use queuestat_stats::{EcdfPoints, LinearFit, LorenzPoints, QqPoints};
use serde::{Deserialize, Serialize};

/// Analysis output: primary grouping key to one series per secondary grouping
pub type SeriesMap<T> = BTreeMap<String, Vec<T>>;

/// Legend label for a cashier service-time level
pub fn cashier_label(level: &str) -> String {
    format!("T_CASHIER = {level}")
}

/// Legend label for a customer inter-arrival level
pub fn customer_label(class: &str, level: &str) -> String {
    format!("T_{class} = {level}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcdfSeries {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Per-point CI half-width, when computed across repetitions
    pub error: Option<Vec<f64>>,
}

impl EcdfSeries {
    pub fn new(label: String, points: EcdfPoints) -> Self {
        Self {
            label,
            x: points.x,
            y: points.y,
            error: points.error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LorenzSeries {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl LorenzSeries {
    pub fn new(label: String, points: LorenzPoints) -> Self {
        Self {
            label,
            x: points.x,
            y: points.y,
        }
    }
}

/// Raw observations plus the bin count a renderer should use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    pub label: String,
    pub observations: Vec<f64>,
    pub bins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QqSeries {
    pub label: String,
    /// Regression equation and R^2, printable as a second legend line
    pub equation: String,
    pub theoretical: Vec<f64>,
    pub ordered: Vec<f64>,
    pub regression_x: Vec<f64>,
    pub regression_y: Vec<f64>,
    pub fit: LinearFit,
}

impl QqSeries {
    pub fn new(label: String, points: QqPoints) -> Self {
        Self {
            label,
            equation: points.equation,
            theoretical: points.theoretical,
            ordered: points.ordered,
            regression_x: points.regression_x,
            regression_y: points.regression_y,
            fit: points.fit,
        }
    }
}

/// A single labelled scalar, e.g. a coefficient of variation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledValue {
    pub label: String,
    pub value: f64,
}

/// A labelled series of values over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSeries {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
