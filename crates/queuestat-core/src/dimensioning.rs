//! Seating-node dimensioning
//!
//! The seating area is modelled as an M/M/c/K node: seats are servers and
//! the waiting room holds `K - c` customers. Customers that find the node
//! full leave, so the loss probability sizes the node.

use queuestat_erlang::{LoadConfiguration, LossEngine, LossRow, NumericBackend};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::AnalysisResult;

/// Loss table for the configured seat and queue lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossReport {
    pub load: LoadConfiguration,
    /// Offered load in Erlang
    pub offered_load: f64,
    pub rows: Vec<LossRow>,
}

/// Loss probability along the two ways of growing capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensioningSweeps {
    pub offered_load: f64,
    /// One more seat per point, no waiting room
    pub more_seats: Vec<LossRow>,
    /// Fixed seats, one more waiting place per point
    pub more_queue: Vec<LossRow>,
}

impl DimensioningSweeps {
    /// Smallest capacity of each sweep whose loss does not exceed `max_loss`
    pub fn minimum_capacities(&self, max_loss: f64) -> (Option<&LossRow>, Option<&LossRow>) {
        (
            minimum_capacity(&self.more_seats, max_loss),
            minimum_capacity(&self.more_queue, max_loss),
        )
    }
}

/// First row, by capacity, whose loss probability is at most `max_loss`
pub fn minimum_capacity(rows: &[LossRow], max_loss: f64) -> Option<&LossRow> {
    rows.iter()
        .filter(|row| row.loss_probability <= max_loss)
        .min_by_key(|row| row.capacity)
}

/// Evaluate the configured capacities
pub fn loss_report<B: NumericBackend>(engine: &LossEngine<B>, config: &AnalysisConfig) -> AnalysisResult<LossReport> {
    let load = config.customer.load()?;
    let capacities = config.seating.checked_capacities(&load)?;
    let rows = engine.loss_table(&load, &capacities)?;

    info!(rows = rows.len(), offered_load = load.offered_load(), "Loss table ready");
    Ok(LossReport {
        load,
        offered_load: load.offered_load(),
        rows,
    })
}

/// Evaluate both dimensioning sweeps
pub fn dimensioning_sweeps<B: NumericBackend>(
    engine: &LossEngine<B>,
    config: &AnalysisConfig,
) -> AnalysisResult<DimensioningSweeps> {
    let load = config.customer.load()?;
    let more_seats = engine.loss_table(&load, &config.seating.seat_sweep()?)?;
    let more_queue = engine.loss_table(&load, &config.seating.queue_sweep()?)?;

    info!(
        points = config.seating.sweep_length,
        first_seats = config.seating.sweep_seats,
        "Dimensioning sweeps ready"
    );
    Ok(DimensioningSweeps {
        offered_load: load.offered_load(),
        more_seats,
        more_queue,
    })
}
