//! Scenario table built from run attributes and vector rows
//!
//! A run is labelled by its cashier attribute, an optional customer-class
//! attribute and its repetition index. Every vector row of the run inherits
//! those labels.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reader::{read_records, IoError, IoResult, RunRecord};
use crate::vector::parse_vector;

/// Suffix scavetool appends to vector statistic names
pub const VECTOR_SUFFIX: &str = ":vector";

/// Strip the scavetool vector suffix from a statistic name
pub fn statistic_name(raw: &str) -> &str {
    raw.strip_suffix(VECTOR_SUFFIX).unwrap_or(raw)
}

/// Scenario labels of a run
///
/// `cashier` is empty when the table was built without a cashier attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScenarioKey {
    pub cashier: String,
    pub customer: Option<String>,
}

impl ScenarioKey {
    pub fn new(cashier: impl Into<String>, customer: Option<String>) -> Self {
        Self {
            cashier: cashier.into(),
            customer,
        }
    }
}

/// Which run attributes label a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Cashier attribute; `None` for exports of a single static scenario
    pub cashier_attribute: Option<String>,
    pub repetition_attribute: String,
    /// Customer-class attribute (`"VOP"` or `"NOP"`); `None` for cashier-only scenarios
    pub customer_attribute: Option<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            cashier_attribute: Some("CASH".to_string()),
            repetition_attribute: "repetition".to_string(),
            customer_attribute: None,
        }
    }
}

impl IngestOptions {
    /// Label runs by repetition only
    pub fn repetitions_only() -> Self {
        Self {
            cashier_attribute: None,
            ..Self::default()
        }
    }

    pub fn with_customer_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.customer_attribute = Some(attribute.into());
        self
    }
}

/// One vector statistic recorded by one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticRow {
    pub run: String,
    /// Statistic name without the `:vector` suffix
    pub statistic: String,
    pub key: ScenarioKey,
    pub repetition: u32,
    pub values: Vec<f64>,
    /// Recording times, when the export carried them
    pub times: Option<Vec<f64>>,
}

#[derive(Debug, Default)]
struct RunAttributes<'a> {
    cashier: Option<&'a str>,
    customer: Option<&'a str>,
    repetition: Option<&'a str>,
}

impl<'a> RunAttributes<'a> {
    fn set(slot: &mut Option<&'a str>, run: &str, attribute: &str, value: &'a str) -> IoResult<()> {
        if slot.is_some() {
            return Err(IoError::DuplicateAttribute {
                run: run.to_string(),
                attribute: attribute.to_string(),
            });
        }
        *slot = Some(value);
        Ok(())
    }
}

/// All vector rows of an export, ordered by cashier, customer, repetition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    rows: Vec<StatisticRow>,
}

impl ScenarioTable {
    /// Read and reshape a scavetool CSV export
    pub fn load(path: impl AsRef<Path>, options: &IngestOptions) -> IoResult<Self> {
        let records = read_records(path)?;
        Self::from_records(&records, options)
    }

    /// Join run attributes with vector rows
    pub fn from_records(records: &[RunRecord], options: &IngestOptions) -> IoResult<Self> {
        let mut attributes: BTreeMap<&str, RunAttributes> = BTreeMap::new();

        for record in records {
            let Some((name, value)) = record.attribute() else {
                continue;
            };
            let run = record.run.as_str();
            let entry = attributes.entry(run).or_default();

            if options.cashier_attribute.as_deref() == Some(name) {
                RunAttributes::set(&mut entry.cashier, run, name, value)?;
            } else if name == options.repetition_attribute {
                RunAttributes::set(&mut entry.repetition, run, name, value)?;
            } else if options.customer_attribute.as_deref() == Some(name) {
                RunAttributes::set(&mut entry.customer, run, name, value)?;
            }
        }

        let mut rows = Vec::new();
        for record in records.iter().filter(|r| r.is_vector()) {
            rows.push(build_row(record, attributes.get(record.run.as_str()), options)?);
        }

        rows.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then(a.repetition.cmp(&b.repetition))
                .then_with(|| a.statistic.cmp(&b.statistic))
        });

        debug!(
            runs = attributes.len(),
            vectors = rows.len(),
            "Built scenario table"
        );

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[StatisticRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct statistic names, sorted
    pub fn statistics(&self) -> Vec<&str> {
        self.distinct(|row| Some(row.statistic.as_str()))
    }

    /// Distinct cashier labels, sorted
    pub fn cashier_levels(&self) -> Vec<&str> {
        self.distinct(|row| Some(row.key.cashier.as_str()))
    }

    /// Distinct customer-class labels, sorted
    pub fn customer_levels(&self) -> Vec<&str> {
        self.distinct(|row| row.key.customer.as_deref())
    }

    /// Rows of one scenario, in repetition order
    ///
    /// `statistic` may carry the `:vector` suffix; `None` matches every
    /// statistic and `customer = None` matches every customer class.
    pub fn select(&self, statistic: Option<&str>, cashier: &str, customer: Option<&str>) -> Vec<&StatisticRow> {
        let statistic = statistic.map(statistic_name);
        self.rows
            .iter()
            .filter(|row| statistic.map_or(true, |s| row.statistic == s))
            .filter(|row| row.key.cashier == cashier)
            .filter(|row| customer.map_or(true, |c| row.key.customer.as_deref() == Some(c)))
            .collect()
    }

    fn distinct<'a>(&'a self, field: impl Fn(&'a StatisticRow) -> Option<&'a str>) -> Vec<&'a str> {
        self.rows
            .iter()
            .filter_map(field)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn build_row(record: &RunRecord, attributes: Option<&RunAttributes>, options: &IngestOptions) -> IoResult<StatisticRow> {
    let run = record.run.as_str();
    let missing = |attribute: &str| IoError::MissingAttribute {
        run: run.to_string(),
        attribute: attribute.to_string(),
    };

    let cashier = match &options.cashier_attribute {
        Some(attribute) => attributes
            .and_then(|a| a.cashier)
            .ok_or_else(|| missing(attribute.as_str()))?,
        None => "",
    };
    let repetition_cell = attributes
        .and_then(|a| a.repetition)
        .ok_or_else(|| missing(options.repetition_attribute.as_str()))?;
    let customer = match &options.customer_attribute {
        Some(attribute) => Some(
            attributes
                .and_then(|a| a.customer)
                .ok_or_else(|| missing(attribute.as_str()))?
                .to_string(),
        ),
        None => None,
    };

    let repetition = repetition_cell
        .trim()
        .parse::<u32>()
        .map_err(|_| IoError::InvalidNumber {
            run: run.to_string(),
            column: options.repetition_attribute.clone(),
            value: repetition_cell.to_string(),
        })?;

    let raw_name = record.name.as_deref().unwrap_or_default().trim();
    let values = parse_vector(record.vecvalue.as_deref().unwrap_or_default(), run, "vecvalue")?;
    let times = match record.vectime.as_deref().filter(|cell| !cell.trim().is_empty()) {
        Some(cell) => {
            let times = parse_vector(cell, run, "vectime")?;
            if times.len() != values.len() {
                return Err(IoError::InvalidFormat(format!(
                    "run {run}, {raw_name}: {} times for {} values",
                    times.len(),
                    values.len()
                )));
            }
            Some(times)
        }
        None => None,
    };

    Ok(StatisticRow {
        run: run.to_string(),
        statistic: statistic_name(raw_name).to_string(),
        key: ScenarioKey::new(cashier, customer),
        repetition,
        values,
        times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(run: &str, name: &str, value: &str) -> RunRecord {
        RunRecord {
            run: run.to_string(),
            kind: Some("runattr".to_string()),
            attrname: Some(name.to_string()),
            attrvalue: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn vector(run: &str, name: &str, values: &str, times: Option<&str>) -> RunRecord {
        RunRecord {
            run: run.to_string(),
            kind: Some("vector".to_string()),
            name: Some(name.to_string()),
            vecvalue: Some(values.to_string()),
            vectime: times.map(str::to_string),
            ..Default::default()
        }
    }

    fn two_cashier_records() -> Vec<RunRecord> {
        vec![
            attr("b-1", "CASH", "2min"),
            attr("b-1", "repetition", "1"),
            vector("b-1", "wait:vector", "4 5", None),
            attr("a-1", "CASH", "1min"),
            attr("a-1", "repetition", "1"),
            vector("a-1", "wait:vector", "2 3", None),
            attr("a-0", "CASH", "1min"),
            attr("a-0", "repetition", "0"),
            vector("a-0", "wait:vector", "1", None),
            vector("a-0", "response:vector", "9", None),
        ]
    }

    #[test]
    fn test_rows_ordered_by_cashier_then_repetition() {
        let table = ScenarioTable::from_records(&two_cashier_records(), &IngestOptions::default()).unwrap();

        let wait = table
            .rows()
            .iter()
            .filter(|r| r.statistic == "wait")
            .map(|r| (r.key.cashier.as_str(), r.repetition))
            .collect::<Vec<_>>();
        assert_eq!(wait, vec![("1min", 0), ("1min", 1), ("2min", 1)]);

        assert_eq!(table.statistics(), vec!["response", "wait"]);
        assert_eq!(table.cashier_levels(), vec!["1min", "2min"]);
        assert!(table.customer_levels().is_empty());
    }

    #[test]
    fn test_select() {
        let table = ScenarioTable::from_records(&two_cashier_records(), &IngestOptions::default()).unwrap();

        let rows = table.select(Some("wait:vector"), "1min", None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values, vec![1.0]);
        assert_eq!(rows[1].values, vec![2.0, 3.0]);

        assert_eq!(table.select(None, "1min", None).len(), 3);
        assert!(table.select(Some("wait"), "3min", None).is_empty());
    }

    #[test]
    fn test_customer_attribute_and_times() {
        let records = vec![
            attr("r0", "CASH", "1min"),
            attr("r0", "VOP", "3min"),
            attr("r0", "repetition", "0"),
            vector("r0", "queueLength:vector", "0 1 0", Some("0 2 5")),
        ];
        let options = IngestOptions::default().with_customer_attribute("VOP");
        let table = ScenarioTable::from_records(&records, &options).unwrap();

        let row = &table.rows()[0];
        assert_eq!(row.key, ScenarioKey::new("1min", Some("3min".to_string())));
        assert_eq!(row.times.as_deref(), Some(&[0.0, 2.0, 5.0][..]));
        assert_eq!(table.customer_levels(), vec!["3min"]);
        assert_eq!(table.select(None, "1min", Some("3min")).len(), 1);
        assert!(table.select(None, "1min", Some("2min")).is_empty());
    }

    #[test]
    fn test_duplicate_attribute() {
        let records = vec![attr("r0", "CASH", "1min"), attr("r0", "CASH", "2min")];
        assert!(matches!(
            ScenarioTable::from_records(&records, &IngestOptions::default()),
            Err(IoError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn test_missing_attribute_only_matters_for_vectors() {
        let options = IngestOptions::default();

        // A run without vectors may lack attributes
        let records = vec![attr("r0", "CASH", "1min")];
        assert!(ScenarioTable::from_records(&records, &options).unwrap().is_empty());

        let records = vec![attr("r0", "CASH", "1min"), vector("r0", "wait:vector", "1", None)];
        match ScenarioTable::from_records(&records, &options) {
            Err(IoError::MissingAttribute { run, attribute }) => {
                assert_eq!(run, "r0");
                assert_eq!(attribute, "repetition");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_repetition_and_time_mismatch() {
        let records = vec![
            attr("r0", "CASH", "1min"),
            attr("r0", "repetition", "first"),
            vector("r0", "wait:vector", "1", None),
        ];
        assert!(matches!(
            ScenarioTable::from_records(&records, &IngestOptions::default()),
            Err(IoError::InvalidNumber { .. })
        ));

        let records = vec![
            attr("r0", "CASH", "1min"),
            attr("r0", "repetition", "0"),
            vector("r0", "wait:vector", "1 2", Some("0")),
        ];
        assert!(matches!(
            ScenarioTable::from_records(&records, &IngestOptions::default()),
            Err(IoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_repetitions_only() {
        let records = vec![
            attr("r1", "repetition", "1"),
            vector("r1", "throughput:vector", "0.1 0.2", Some("5 9")),
            attr("r0", "repetition", "0"),
            vector("r0", "throughput:vector", "0.3", Some("4")),
        ];
        let table = ScenarioTable::from_records(&records, &IngestOptions::repetitions_only()).unwrap();

        let rows = table.select(Some("throughput"), "", None);
        assert_eq!(rows.iter().map(|r| r.run.as_str()).collect::<Vec<_>>(), vec!["r0", "r1"]);
    }

    #[test]
    fn test_statistic_name() {
        assert_eq!(statistic_name("wait:vector"), "wait");
        assert_eq!(statistic_name("wait"), "wait");
    }
}
