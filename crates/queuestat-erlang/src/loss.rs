//! M/M/c/K loss probability
//!
//! With offered load `u`, `c` servers, capacity `K` and `rho = u / c`:
//!
//! ```text
//! S1   = sum_{n=0}^{c-1} u^n / n!
//! S2   = u^c / c! * (1 - rho^(K-c+1)) / (1 - rho)     rho != 1
//!      = u^c / c! * (K - c + 1)                         rho == 1
//! P0   = 1 / (S1 + S2)
//! Loss = u^K / (c! * c^(K-c)) * P0
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{ExactBackend, NumericBackend};
use crate::error::{LossError, LossResult};
use crate::load::{CapacityConfiguration, LoadConfiguration};

/// The two parts of the normalizing sum, before inversion
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationTerms<R> {
    /// States with an idle server, `S1`
    pub below_servers: R,
    /// States with all servers busy, `S2`
    pub all_busy: R,
}

/// One line of a loss table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossRow {
    pub servers: u32,
    pub queue_size: u32,
    pub capacity: u32,
    pub loss_probability: f64,
}

/// Evaluates loss formulas on a chosen numeric backend
#[derive(Debug, Clone, Default)]
pub struct LossEngine<B: NumericBackend> {
    backend: B,
}

impl LossEngine<ExactBackend> {
    /// Engine on exact rational arithmetic
    pub fn exact() -> Self {
        Self::new(ExactBackend)
    }
}

impl<B: NumericBackend> LossEngine<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compute `S1` and `S2` for offered load `u`
    pub fn normalization_terms(
        &self,
        offered_load: &B::Real,
        servers: u32,
        capacity: u32,
    ) -> LossResult<NormalizationTerms<B::Real>> {
        validate(servers, capacity)?;
        let b = &self.backend;

        let mut below_servers = b.from_u64(0);
        for n in 0..servers {
            let term = b.divide(&b.power(offered_load, n), &b.factorial(n), "S1")?;
            below_servers = b.add(&below_servers, &term);
        }

        let c = b.from_u64(servers as u64);
        let rho = b.divide(offered_load, &c, "utilization")?;
        let head = b.divide(&b.power(offered_load, servers), &b.factorial(servers), "S2")?;
        let waiting_states = capacity - servers + 1;

        let tail = if b.is_one(&rho) {
            b.from_u64(waiting_states as u64)
        } else {
            let one = b.from_u64(1);
            let numerator = b.subtract(&one, &b.power(&rho, waiting_states));
            b.divide(&numerator, &b.subtract(&one, &rho), "S2")?
        };

        Ok(NormalizationTerms {
            below_servers,
            all_busy: b.multiply(&head, &tail),
        })
    }

    /// Probability of an empty system, `P0 = 1 / (S1 + S2)`
    pub fn p0(&self, offered_load: &B::Real, servers: u32, capacity: u32) -> LossResult<B::Real> {
        let terms = self.normalization_terms(offered_load, servers, capacity)?;
        let b = &self.backend;
        b.divide(
            &b.from_u64(1),
            &b.add(&terms.below_servers, &terms.all_busy),
            "P0",
        )
    }

    /// Blocking probability in the backend's own representation
    pub fn loss_probability_real(&self, offered_load: &B::Real, servers: u32, capacity: u32) -> LossResult<B::Real> {
        let p0 = self.p0(offered_load, servers, capacity)?;
        let b = &self.backend;

        let c = b.from_u64(servers as u64);
        let denominator = b.multiply(&b.factorial(servers), &b.power(&c, capacity - servers));
        let state_weight = b.divide(&b.power(offered_load, capacity), &denominator, "loss probability")?;

        Ok(b.multiply(&state_weight, &p0))
    }

    /// Blocking probability for one capacity configuration, as `f64`
    pub fn loss_probability(&self, offered_load: f64, config: &CapacityConfiguration) -> LossResult<f64> {
        if !offered_load.is_finite() || offered_load < 0.0 {
            return Err(LossError::InvalidLoad(format!(
                "offered load must be finite and >= 0, got {offered_load}"
            )));
        }
        let u = self.backend.from_f64(offered_load)?;
        self.evaluate(&u, config).map(|row| row.loss_probability)
    }

    /// Loss probability for each capacity configuration, in input order
    pub fn loss_table(&self, load: &LoadConfiguration, capacities: &[CapacityConfiguration]) -> LossResult<Vec<LossRow>> {
        let offered_load = load.offered_load();
        info!(
            backend = self.backend.name(),
            offered_load,
            configurations = capacities.len(),
            "Computing loss table"
        );
        let u = self.backend.from_f64(offered_load)?;

        #[cfg(feature = "parallel")]
        let rows = capacities
            .par_iter()
            .map(|config| self.evaluate(&u, config))
            .collect::<LossResult<Vec<_>>>();

        #[cfg(not(feature = "parallel"))]
        let rows = capacities
            .iter()
            .map(|config| self.evaluate(&u, config))
            .collect::<LossResult<Vec<_>>>();

        rows
    }

    fn evaluate(&self, offered_load: &B::Real, config: &CapacityConfiguration) -> LossResult<LossRow> {
        let capacity = config.capacity();
        let loss = self.loss_probability_real(offered_load, config.servers, capacity)?;
        let loss_probability = self.backend.to_f64(&loss)?;

        debug!(
            servers = config.servers,
            capacity,
            loss_probability,
            "Evaluated capacity configuration"
        );

        Ok(LossRow {
            servers: config.servers,
            queue_size: config.queue_size,
            capacity,
            loss_probability,
        })
    }
}

fn validate(servers: u32, capacity: u32) -> LossResult<()> {
    if servers == 0 {
        return Err(LossError::InvalidCapacity("at least one server is required".into()));
    }
    if capacity < servers {
        return Err(LossError::InvalidCapacity(format!(
            "capacity {capacity} is smaller than the {servers} servers"
        )));
    }
    Ok(())
}
