//! Configuration for queuestat analyses
//!
//! One file describes the simulation export, the scenario levels to analyse,
//! the customer load and the seating-node capacities. Every section has
//! defaults, so a file only needs the values it changes.

use std::path::{Path, PathBuf};

use queuestat_erlang::{
    capacities_from_lists, check_unbounded_stability, queue_sweep, seat_sweep, CapacityConfiguration,
    LoadConfiguration, LossResult,
};
use queuestat_io::IngestOptions;
use queuestat_stats::ReferenceSpec;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisResult, ConfigError};

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input and output locations
    pub general: GeneralConfig,
    /// Scenario levels and estimator settings
    pub analysis: AnalysisSettings,
    /// Customer arrival and eating times
    pub customer: CustomerConfig,
    /// Seating-node capacities
    pub seating: SeatingConfig,
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// scavetool CSV export to analyse
    pub working_csv: PathBuf,
    /// Directory receiving exported series and tables
    pub export_directory: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            working_csv: PathBuf::from("results.csv"),
            export_directory: PathBuf::from("out"),
        }
    }
}

/// Scenario levels and estimator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Cashier service-time labels, as written in the `CASH` attribute
    pub cashier_levels: Vec<String>,
    /// Customer inter-arrival labels, as written in the customer attribute
    pub customer_levels: Vec<String>,
    /// Run attribute holding the customer label (`"VOP"` or `"NOP"`)
    pub customer_attribute: String,
    /// Vector statistics analysed by the response-time analysis
    pub statistics: Vec<String>,
    /// Vector statistic analysed by the occupancy analysis; `None` takes every vector of a scenario
    pub occupancy_statistic: Option<String>,
    pub confidence_level: f64,
    pub quantile: f64,
    pub histogram_bins: usize,
    /// Cap on observations per repetition when balancing
    pub max_observations: Option<usize>,
    /// Reference distribution for response-time QQ plots
    pub reference: ReferenceSpec,
    /// Reference distribution for occupancy QQ plots; occupancy counts are integers
    pub occupancy_reference: ReferenceSpec,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            cashier_levels: Vec::new(),
            customer_levels: Vec::new(),
            customer_attribute: "VOP".to_string(),
            statistics: Vec::new(),
            occupancy_statistic: None,
            confidence_level: 0.99,
            quantile: 0.9,
            histogram_bins: 200,
            max_observations: None,
            reference: ReferenceSpec::named("normal"),
            occupancy_reference: ReferenceSpec {
                probability: Some(0.5),
                ..ReferenceSpec::named("geometric")
            },
        }
    }
}

impl AnalysisSettings {
    /// Ingestion options for cashier-only scenarios
    pub fn cashier_ingest(&self) -> IngestOptions {
        IngestOptions::default()
    }

    /// Ingestion options for cashier and customer-class scenarios
    pub fn customer_ingest(&self) -> IngestOptions {
        IngestOptions::default().with_customer_attribute(self.customer_attribute.clone())
    }

    /// Printable customer class for the configured attribute
    pub fn customer_class(&self) -> &'static str {
        if self.customer_attribute == "VOP" {
            "VIP"
        } else {
            "NORMAL"
        }
    }
}

/// Mean customer times, in minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerConfig {
    pub vip_interarrival_time: f64,
    pub normal_interarrival_time: f64,
    pub eating_time: f64,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            vip_interarrival_time: 6.0,
            normal_interarrival_time: 3.0,
            eating_time: 20.0,
        }
    }
}

impl CustomerConfig {
    /// Arrival and service rates per second
    pub fn load(&self) -> LossResult<LoadConfiguration> {
        LoadConfiguration::from_minutes(
            self.vip_interarrival_time,
            self.normal_interarrival_time,
            self.eating_time,
        )
    }
}

/// Seating-node capacities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatingConfig {
    /// Seats of each configuration in the loss table
    pub number_of_seats: Vec<u32>,
    /// Waiting places of each configuration, index-aligned with `number_of_seats`
    pub queue_size: Vec<u32>,
    /// Seats of the first point of both dimensioning sweeps
    pub sweep_seats: u32,
    /// Points per dimensioning sweep
    pub sweep_length: u32,
    /// Reject configurations that would be unstable with an unbounded queue
    pub require_unbounded_stability: bool,
}

impl Default for SeatingConfig {
    fn default() -> Self {
        Self {
            number_of_seats: vec![10, 11],
            queue_size: vec![0, 2],
            sweep_seats: 6,
            sweep_length: 25,
            require_unbounded_stability: false,
        }
    }
}

impl SeatingConfig {
    /// Capacity configurations of the loss table
    pub fn capacities(&self) -> LossResult<Vec<CapacityConfiguration>> {
        capacities_from_lists(&self.number_of_seats, &self.queue_size)
    }

    /// Capacities for the loss table, after the optional stability check
    pub fn checked_capacities(&self, load: &LoadConfiguration) -> LossResult<Vec<CapacityConfiguration>> {
        let capacities = self.capacities()?;
        if self.require_unbounded_stability {
            check_unbounded_stability(load, &capacities)?;
        }
        Ok(capacities)
    }

    /// Seats grow, no waiting room
    pub fn seat_sweep(&self) -> LossResult<Vec<CapacityConfiguration>> {
        seat_sweep(self.sweep_seats, self.sweep_length)
    }

    /// Seats fixed, waiting room grows
    pub fn queue_sweep(&self) -> LossResult<Vec<CapacityConfiguration>> {
        queue_sweep(self.sweep_seats, self.sweep_length)
    }
}

impl AnalysisConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a TOML (or `.json`) file and validate it
    pub fn load(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            Self::from_toml(&text)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;

        if !(analysis.confidence_level > 0.0 && analysis.confidence_level < 1.0) {
            return Err(ConfigError::OutOfRange(format!(
                "confidence_level must lie in (0, 1), got {}",
                analysis.confidence_level
            )));
        }

        if !(analysis.quantile > 0.0 && analysis.quantile < 1.0) {
            return Err(ConfigError::OutOfRange(format!(
                "quantile must lie in (0, 1), got {}",
                analysis.quantile
            )));
        }

        if analysis.histogram_bins == 0 {
            return Err(ConfigError::OutOfRange("histogram_bins must be positive".to_string()));
        }

        if analysis.max_observations == Some(0) {
            return Err(ConfigError::OutOfRange("max_observations must be positive".to_string()));
        }

        if analysis.reference.name.trim().is_empty() {
            return Err(ConfigError::MissingField("analysis.reference.name".to_string()));
        }

        if analysis.occupancy_reference.name.trim().is_empty() {
            return Err(ConfigError::MissingField("analysis.occupancy_reference.name".to_string()));
        }

        let customer = &self.customer;
        for (name, minutes) in [
            ("vip_interarrival_time", customer.vip_interarrival_time),
            ("normal_interarrival_time", customer.normal_interarrival_time),
            ("eating_time", customer.eating_time),
        ] {
            if !minutes.is_finite() || minutes <= 0.0 {
                return Err(ConfigError::OutOfRange(format!("{name} must be positive, got {minutes}")));
            }
        }

        let seating = &self.seating;
        if seating.number_of_seats.len() != seating.queue_size.len() {
            return Err(ConfigError::Inconsistent(format!(
                "number_of_seats has {} entries but queue_size has {}",
                seating.number_of_seats.len(),
                seating.queue_size.len()
            )));
        }

        if seating.number_of_seats.contains(&0) || seating.sweep_seats == 0 {
            return Err(ConfigError::OutOfRange("seat counts must be positive".to_string()));
        }

        Ok(())
    }
}
