//! Simulation-setup diagnostics
//!
//! Two checks run before the main analyses: the mean throughput curve shows
//! when the system leaves its initial transient (the warm-up period), and the
//! running variance of a statistic shows whether its variance is finite.

use queuestat_io::{statistic_name, ScenarioTable};
use queuestat_stats::{partial_variance, ThroughputCurve};
use tracing::info;

use crate::error::{AnalysisError, AnalysisResult};
use crate::occupancy::timed;
use crate::response::pooled;
use crate::series::{cashier_label, CurveSeries};

/// Mean throughput across every run recording `statistic`
pub fn warmup_curve(table: &ScenarioTable, statistic: &str) -> AnalysisResult<ThroughputCurve> {
    let name = statistic_name(statistic);
    let rows: Vec<_> = table.rows().iter().filter(|row| row.statistic == name).collect();
    if rows.is_empty() {
        return Err(AnalysisError::ScenarioNotFound {
            statistic: name.to_string(),
            scenario: "any run".to_string(),
        });
    }

    let curve = ThroughputCurve::from_runs(&timed(&rows)?)?;
    info!(runs = curve.runs, points = curve.len(), "Throughput curve ready");
    Ok(curve)
}

/// Running variance of the pooled observations of one scenario
///
/// `x` counts observations from 1; the first variance is 0.
pub fn finite_variance_check(table: &ScenarioTable, statistic: &str, cashier: &str) -> AnalysisResult<CurveSeries> {
    let rows = table.select(Some(statistic), cashier, None);
    if rows.is_empty() {
        return Err(AnalysisError::ScenarioNotFound {
            statistic: statistic_name(statistic).to_string(),
            scenario: cashier_label(cashier),
        });
    }

    let y = partial_variance(&pooled(&rows));
    let x = (1..=y.len()).map(|n| n as f64).collect();

    Ok(CurveSeries {
        label: cashier_label(cashier),
        x,
        y,
    })
}
