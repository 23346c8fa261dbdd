//! queuestat-core - Scenario-level analyses of queueing-simulation output
//!
//! Ties ingestion, aggregation and the loss engine together:
//!
//! - **config**: `AnalysisConfig` (TOML/JSON) with validation
//! - **response**: waiting/response-time statistics grouped by cashier
//! - **occupancy**: queue-occupancy statistics grouped by cashier and customer class
//! - **dimensioning**: seating-node loss tables and capacity sweeps
//! - **diagnostics**: warm-up throughput curve and finite-variance check
//! - **export**: JSON series and CSV loss tables for external renderers
//!
//! Every analysis returns plain data; plotting is left to the consumer.

pub mod config;
pub mod diagnostics;
pub mod dimensioning;
pub mod error;
pub mod export;
pub mod occupancy;
pub mod response;
pub mod series;

pub use config::*;
pub use diagnostics::*;
pub use dimensioning::*;
pub use error::*;
pub use export::*;
pub use occupancy::*;
pub use response::*;
pub use series::*;
