//! Queue-occupancy analysis
//!
//! Occupancy vectors record the number of customers in a queue each time it
//! changes, so means are taken over time rather than over samples. Results
//! are keyed by cashier label, with one series per customer level.

use queuestat_io::{ScenarioTable, StatisticRow};
use queuestat_stats::{
    index_of_dispersion, sample_quantile, time_average_mean, QqPoints, ReferenceSpec, SummaryTuple,
    TimedObservations,
};
use tracing::{debug, info};

use crate::config::AnalysisSettings;
use crate::error::{AnalysisError, AnalysisResult};
use crate::response::pooled;
use crate::series::{cashier_label, customer_label, HistogramSeries, LabelledValue, QqSeries, SeriesMap};

/// Occupancy analyses over the (cashier, customer) grid
#[derive(Debug, Clone)]
pub struct OccupancyAnalysis<'a> {
    table: &'a ScenarioTable,
    statistic: Option<String>,
    cashier_levels: Vec<String>,
    customer_levels: Vec<String>,
    customer_class: String,
}

impl<'a> OccupancyAnalysis<'a> {
    pub fn new(
        table: &'a ScenarioTable,
        statistic: Option<String>,
        cashier_levels: Vec<String>,
        customer_levels: Vec<String>,
        customer_class: impl Into<String>,
    ) -> Self {
        Self {
            table,
            statistic,
            cashier_levels,
            customer_levels,
            customer_class: customer_class.into(),
        }
    }

    /// Analysis over the levels of a configuration, falling back to the table's levels
    pub fn from_settings(table: &'a ScenarioTable, settings: &AnalysisSettings) -> Self {
        let or_table = |configured: &[String], present: Vec<&str>| {
            if configured.is_empty() {
                present.into_iter().map(str::to_string).collect()
            } else {
                configured.to_vec()
            }
        };

        Self::new(
            table,
            settings.occupancy_statistic.clone(),
            or_table(&settings.cashier_levels, table.cashier_levels()),
            or_table(&settings.customer_levels, table.customer_levels()),
            settings.customer_class(),
        )
    }

    /// Mean across repetitions of the time-averaged occupancy
    pub fn sample_mean(&self, confidence_level: f64) -> AnalysisResult<SeriesMap<SummaryTuple>> {
        self.collect(|label, rows| {
            let repetitions = timed(rows)?;
            Ok(time_average_mean(&repetitions, confidence_level)?.labelled(label))
        })
    }

    /// Variance of pooled samples over the mean time-averaged occupancy
    pub fn index_of_dispersion(&self) -> AnalysisResult<SeriesMap<LabelledValue>> {
        self.collect(|label, rows| {
            let repetitions = timed(rows)?;
            Ok(LabelledValue {
                label,
                value: index_of_dispersion(&pooled(rows), &repetitions)?,
            })
        })
    }

    /// Sample quantile of the pooled samples with an order-statistic CI
    pub fn sample_quantile(&self, quantile: f64, confidence_level: f64) -> AnalysisResult<SeriesMap<SummaryTuple>> {
        self.collect(|label, rows| {
            Ok(sample_quantile(&pooled(rows), quantile, confidence_level)?.labelled(label))
        })
    }

    pub fn histogram(&self, bins: usize) -> AnalysisResult<SeriesMap<HistogramSeries>> {
        self.collect(|label, rows| {
            Ok(HistogramSeries {
                label,
                observations: pooled(rows),
                bins,
            })
        })
    }

    /// QQ points, typically against a discrete reference
    pub fn qq(&self, reference: &ReferenceSpec) -> AnalysisResult<SeriesMap<QqSeries>> {
        let reference = reference.resolve()?;
        self.collect(|label, rows| {
            let points = QqPoints::compute(&pooled(rows), &reference)?;
            Ok(QqSeries::new(label, points))
        })
    }

    fn collect<T>(
        &self,
        mut build: impl FnMut(String, &[&StatisticRow]) -> AnalysisResult<T>,
    ) -> AnalysisResult<SeriesMap<T>> {
        let mut result = SeriesMap::new();

        for cashier in &self.cashier_levels {
            let mut series = Vec::with_capacity(self.customer_levels.len());

            for customer in &self.customer_levels {
                let label = customer_label(&self.customer_class, customer);
                let rows = self
                    .table
                    .select(self.statistic.as_deref(), cashier, Some(customer));
                if rows.is_empty() {
                    return Err(AnalysisError::ScenarioNotFound {
                        statistic: self.statistic.clone().unwrap_or_default(),
                        scenario: format!("{}, {}", cashier_label(cashier), label),
                    });
                }

                debug!(
                    cashier = %cashier,
                    customer = %customer,
                    repetitions = rows.len(),
                    "Analysing occupancy scenario"
                );
                series.push(build(label, &rows)?);
            }

            result.insert(cashier_label(cashier), series);
        }

        info!(cashiers = result.len(), "Occupancy analysis complete");
        Ok(result)
    }
}

/// Pair each repetition's values with its recording times
pub(crate) fn timed(rows: &[&StatisticRow]) -> AnalysisResult<Vec<TimedObservations>> {
    rows.iter()
        .map(|row| -> AnalysisResult<TimedObservations> {
            let times = row
                .times
                .clone()
                .ok_or_else(|| AnalysisError::MissingTimes(row.run.clone()))?;
            Ok(TimedObservations::new(row.values.clone(), times)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuestat_io::{IngestOptions, RunRecord};

    fn attr(run: &str, name: &str, value: &str) -> RunRecord {
        RunRecord {
            run: run.to_string(),
            attrname: Some(name.to_string()),
            attrvalue: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn vector(run: &str, values: &str, times: Option<&str>) -> RunRecord {
        RunRecord {
            run: run.to_string(),
            name: Some("queueLength:vector".to_string()),
            vecvalue: Some(values.to_string()),
            vectime: times.map(str::to_string),
            ..Default::default()
        }
    }

    fn table(with_times: bool) -> ScenarioTable {
        let mut records = Vec::new();
        // time averages 1 and 3; pooled samples [2, 0, 0, 3, 3, 0]
        let runs = [("r0", "0", "2 0 0", "0 5 10"), ("r1", "1", "3 3 0", "0 5 10")];
        for (run, repetition, values, times) in runs {
            records.push(attr(run, "CASH", "1min"));
            records.push(attr(run, "VOP", "6min"));
            records.push(attr(run, "repetition", repetition));
            records.push(vector(run, values, with_times.then_some(times)));
        }
        let options = IngestOptions::default().with_customer_attribute("VOP");
        ScenarioTable::from_records(&records, &options).unwrap()
    }

    fn analysis(table: &ScenarioTable) -> OccupancyAnalysis<'_> {
        OccupancyAnalysis::new(
            table,
            Some("queueLength".to_string()),
            vec!["1min".into()],
            vec!["6min".into()],
            "VIP",
        )
    }

    #[test]
    fn test_time_averaged_mean() {
        let table = table(true);
        let result = analysis(&table).sample_mean(0.95).unwrap();

        let tuple = &result["T_CASHIER = 1min"][0];
        assert_eq!(tuple.label, "T_VIP = 6min");
        assert!((tuple.estimate - 2.0).abs() < 1e-12);
        assert!((tuple.lower_error - tuple.upper_error).abs() < 1e-12);
    }

    #[test]
    fn test_index_of_dispersion_mixes_bases() {
        let table = table(true);
        let result = analysis(&table).index_of_dispersion().unwrap();

        // pooled variance 34/15 over mean time average 2
        let value = result["T_CASHIER = 1min"][0].value;
        assert!((value - 17.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_times() {
        let table = table(false);
        assert!(matches!(
            analysis(&table).sample_mean(0.95),
            Err(AnalysisError::MissingTimes(_))
        ));
        // Sample-based estimators do not need times
        assert!(analysis(&table).histogram(10).is_ok());
    }

    #[test]
    fn test_quantile_needs_enough_data() {
        let table = table(true);
        // Six samples cannot hold the order-statistic CI at 0.99
        assert!(matches!(
            analysis(&table).sample_quantile(0.9, 0.99),
            Err(AnalysisError::Stats(_))
        ));
    }

    #[test]
    fn test_unknown_customer_level() {
        let table = table(true);
        let analysis = OccupancyAnalysis::new(&table, None, vec!["1min".into()], vec!["2min".into()], "VIP");
        assert!(matches!(
            analysis.histogram(10),
            Err(AnalysisError::ScenarioNotFound { .. })
        ));
    }

    #[test]
    fn test_from_settings() {
        let table = table(true);
        let analysis = OccupancyAnalysis::from_settings(&table, &AnalysisSettings::default());
        let result = analysis.histogram(5).unwrap();
        assert_eq!(result["T_CASHIER = 1min"][0].observations.len(), 6);
    }
}
