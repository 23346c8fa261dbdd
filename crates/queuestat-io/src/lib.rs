//! queuestat-io - Simulation output ingestion
//!
//! Reads the long-format CSV written by OMNeT++ `scavetool export` and
//! reshapes it into a [`ScenarioTable`]: one row per (run, vector statistic)
//! carrying the scenario labels taken from the run's attributes.
//!
//! - **reader**: raw record access and error types
//! - **vector**: whitespace-separated `vecvalue`/`vectime` cells
//! - **scenario**: run attributes joined with vector rows

pub mod reader;
pub mod scenario;
pub mod vector;

pub use reader::*;
pub use scenario::*;
pub use vector::*;
