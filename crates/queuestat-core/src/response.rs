//! Waiting- and response-time analysis
//!
//! Results are keyed by statistic name, with one series per cashier level.
//! Estimators that do not need repetition structure pool every repetition of
//! a scenario into one observation vector.

use queuestat_io::{ScenarioTable, StatisticRow};
use queuestat_stats::{
    balance, coefficient_of_variation, columnwise_mean, sample_mean, sample_median, sorted, EcdfPoints,
    LorenzPoints, QqPoints, ReferenceSpec, SummaryTuple,
};
use tracing::{debug, info};

use crate::config::AnalysisSettings;
use crate::error::{AnalysisError, AnalysisResult};
use crate::series::{
    cashier_label, EcdfSeries, HistogramSeries, LabelledValue, LorenzSeries, QqSeries, SeriesMap,
};

/// Time-metric analyses over the (statistic, cashier) grid
#[derive(Debug, Clone)]
pub struct ResponseTimeAnalysis<'a> {
    table: &'a ScenarioTable,
    statistics: Vec<String>,
    cashier_levels: Vec<String>,
    max_observations: Option<usize>,
}

impl<'a> ResponseTimeAnalysis<'a> {
    pub fn new(table: &'a ScenarioTable, statistics: Vec<String>, cashier_levels: Vec<String>) -> Self {
        Self {
            table,
            statistics,
            cashier_levels,
            max_observations: None,
        }
    }

    /// Analysis over the statistics and cashier levels of a configuration
    ///
    /// Empty level lists fall back to everything present in the table.
    pub fn from_settings(table: &'a ScenarioTable, settings: &AnalysisSettings) -> Self {
        let statistics = if settings.statistics.is_empty() {
            table.statistics().into_iter().map(str::to_string).collect()
        } else {
            settings.statistics.clone()
        };
        let cashier_levels = if settings.cashier_levels.is_empty() {
            table.cashier_levels().into_iter().map(str::to_string).collect()
        } else {
            settings.cashier_levels.clone()
        };

        Self::new(table, statistics, cashier_levels).with_max_observations(settings.max_observations)
    }

    /// Cap on observations per repetition for the cross-repetition ECDF
    pub fn with_max_observations(mut self, cap: Option<usize>) -> Self {
        self.max_observations = cap;
        self
    }

    /// ECDF per scenario
    ///
    /// Without a confidence level the ECDF is built from the pooled sorted
    /// observations. With one, each repetition is sorted, the repetitions are
    /// balanced, and the ECDF is built from the column-wise means with their
    /// CI half-widths as error bars.
    pub fn ecdf(&self, confidence_level: Option<f64>) -> AnalysisResult<SeriesMap<EcdfSeries>> {
        self.collect(|label, rows| {
            let points = match confidence_level {
                None => EcdfPoints::from_observations(&sorted(&pooled(rows)))?,
                Some(level) => {
                    let repetitions: Vec<Vec<f64>> = rows.iter().map(|row| sorted(&row.values)).collect();
                    let balanced = balance(&repetitions, self.max_observations)?;
                    let means = columnwise_mean(&balanced, level)?;
                    EcdfPoints::with_errors(&means.means, &means.errors)?
                }
            };
            Ok(EcdfSeries::new(label, points))
        })
    }

    /// Lorenz curve of the pooled sorted observations
    pub fn lorenz(&self) -> AnalysisResult<SeriesMap<LorenzSeries>> {
        self.collect(|label, rows| {
            let points = LorenzPoints::from_observations(&sorted(&pooled(rows)))?;
            Ok(LorenzSeries::new(label, points))
        })
    }

    /// Pooled observations for histogram rendering
    pub fn histogram(&self, bins: usize) -> AnalysisResult<SeriesMap<HistogramSeries>> {
        self.collect(|label, rows| {
            Ok(HistogramSeries {
                label,
                observations: pooled(rows),
                bins,
            })
        })
    }

    /// Sample mean with a symmetric CI
    pub fn sample_mean(&self, confidence_level: f64) -> AnalysisResult<SeriesMap<SummaryTuple>> {
        self.collect(|label, rows| Ok(sample_mean(&pooled(rows), confidence_level)?.labelled(label)))
    }

    /// Sample median with an order-statistic CI
    pub fn sample_median(&self, confidence_level: f64) -> AnalysisResult<SeriesMap<SummaryTuple>> {
        self.collect(|label, rows| Ok(sample_median(&pooled(rows), confidence_level)?.labelled(label)))
    }

    pub fn coefficient_of_variation(&self) -> AnalysisResult<SeriesMap<LabelledValue>> {
        self.collect(|label, rows| {
            Ok(LabelledValue {
                label,
                value: coefficient_of_variation(&pooled(rows))?,
            })
        })
    }

    /// QQ points against a reference distribution
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

        for statistic in &self.statistics {
            let mut series = Vec::with_capacity(self.cashier_levels.len());

            for cashier in &self.cashier_levels {
                let rows = self.table.select(Some(statistic), cashier, None);
                if rows.is_empty() {
                    return Err(AnalysisError::ScenarioNotFound {
                        statistic: statistic.clone(),
                        scenario: cashier_label(cashier),
                    });
                }

                debug!(
                    statistic = %statistic,
                    cashier = %cashier,
                    repetitions = rows.len(),
                    "Analysing scenario"
                );
                series.push(build(cashier_label(cashier), &rows)?);
            }

            result.insert(statistic.clone(), series);
        }

        info!(statistics = result.len(), "Response-time analysis complete");
        Ok(result)
    }
}

/// All observations of a scenario in repetition order
pub(crate) fn pooled(rows: &[&StatisticRow]) -> Vec<f64> {
    rows.iter().flat_map(|row| row.values.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuestat_io::{IngestOptions, RunRecord};

    fn record(run: &str, attrname: Option<(&str, &str)>, vector: Option<(&str, &str)>) -> RunRecord {
        RunRecord {
            run: run.to_string(),
            attrname: attrname.map(|(name, _)| name.to_string()),
            attrvalue: attrname.map(|(_, value)| value.to_string()),
            name: vector.map(|(name, _)| name.to_string()),
            vecvalue: vector.map(|(_, values)| values.to_string()),
            ..Default::default()
        }
    }

    fn table() -> ScenarioTable {
        let mut records = Vec::new();
        let runs = [
            ("a0", "1min", "0", "3 1 2 4"),
            ("a1", "1min", "1", "6 5 8 7 9"),
            ("b0", "2min", "0", "10 30 20 40"),
            ("b1", "2min", "1", "50 70 60 80"),
        ];
        for (run, cashier, repetition, values) in runs {
            records.push(record(run, Some(("CASH", cashier)), None));
            records.push(record(run, Some(("repetition", repetition)), None));
            records.push(record(run, None, Some(("wait:vector", values))));
        }
        ScenarioTable::from_records(&records, &IngestOptions::default()).unwrap()
    }

    fn analysis(table: &ScenarioTable) -> ResponseTimeAnalysis<'_> {
        ResponseTimeAnalysis::new(table, vec!["wait".into()], vec!["1min".into(), "2min".into()])
    }

    #[test]
    fn test_ecdf_pooled() {
        let table = table();
        let result = analysis(&table).ecdf(None).unwrap();

        let series = &result["wait"];
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "T_CASHIER = 1min");
        assert_eq!(series[0].x, (1..=9).map(f64::from).collect::<Vec<_>>());
        assert_eq!(series[0].y.last(), Some(&1.0));
        assert!(series[0].error.is_none());
    }

    #[test]
    fn test_ecdf_across_repetitions() {
        let table = table();
        let result = analysis(&table).ecdf(Some(0.95)).unwrap();

        // sorted and balanced to 4: [1 2 3 4] and [5 6 7 8]
        let series = &result["wait"][0];
        assert_eq!(series.x, vec![3.0, 4.0, 5.0, 6.0]);
        let errors = series.error.as_ref().unwrap();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| (e - errors[0]).abs() < 1e-12));
    }

    #[test]
    fn test_ecdf_respects_observation_cap() {
        let table = table();
        let result = analysis(&table)
            .with_max_observations(Some(2))
            .ecdf(Some(0.95))
            .unwrap();
        assert_eq!(result["wait"][1].x, vec![30.0, 40.0]);
    }

    #[test]
    fn test_lorenz_and_histogram() {
        let table = table();
        let lorenz = analysis(&table).lorenz().unwrap();
        let curve = &lorenz["wait"][1];
        assert_eq!(curve.x.len(), 9);
        assert!((curve.y[1] - 10.0 / 360.0).abs() < 1e-12);

        let histogram = analysis(&table).histogram(50).unwrap();
        assert_eq!(histogram["wait"][0].observations, vec![3.0, 1.0, 2.0, 4.0, 6.0, 5.0, 8.0, 7.0, 9.0]);
        assert_eq!(histogram["wait"][0].bins, 50);
    }

    #[test]
    fn test_summaries() {
        let table = table();
        let analysis = analysis(&table);

        let means = analysis.sample_mean(0.95).unwrap();
        assert_eq!(means["wait"][0].label, "T_CASHIER = 1min");
        assert!((means["wait"][0].estimate - 5.0).abs() < 1e-12);
        assert!((means["wait"][1].estimate - 45.0).abs() < 1e-12);

        let cov = analysis.coefficient_of_variation().unwrap();
        assert!(cov["wait"][0].value > 0.0);
    }

    #[test]
    fn test_qq_uses_reference() {
        let table = table();
        let result = analysis(&table).qq(&ReferenceSpec::named("uniform")).unwrap();
        let series = &result["wait"][0];
        assert_eq!(series.ordered, (1..=9).map(f64::from).collect::<Vec<_>>());
        // uniform plotting positions against 1..9 are exactly linear
        assert!((series.fit.r_squared - 1.0).abs() < 1e-9);
        assert!(series.equation.contains("R^2"));

        assert!(matches!(
            analysis(&table).qq(&ReferenceSpec::named("cauchy")),
            Err(AnalysisError::Stats(_))
        ));
    }

    #[test]
    fn test_unknown_scenario() {
        let table = table();
        let analysis = ResponseTimeAnalysis::new(&table, vec!["wait".into()], vec!["9min".into()]);
        assert!(matches!(
            analysis.sample_mean(0.95),
            Err(AnalysisError::ScenarioNotFound { .. })
        ));
    }

    #[test]
    fn test_from_settings_defaults_to_table_levels() {
        let table = table();
        let analysis = ResponseTimeAnalysis::from_settings(&table, &AnalysisSettings::default());
        assert_eq!(analysis.lorenz().unwrap()["wait"].len(), 2);
    }
}
