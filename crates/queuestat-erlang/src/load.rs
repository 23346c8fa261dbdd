//! Offered load and capacity configurations

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LossError, LossResult};

pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert a mean inter-event time in minutes to a rate per second
pub fn rate_from_minutes(minutes: f64) -> LossResult<f64> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(LossError::InvalidLoad(format!(
            "mean time must be positive and finite, got {minutes} minutes"
        )));
    }
    Ok(1.0 / (minutes * SECONDS_PER_MINUTE))
}

/// Arrival and service rates of the node, per second
///
/// Two customer classes arrive independently; the node sees their summed rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadConfiguration {
    pub arrival_rate_vip: f64,
    pub arrival_rate_normal: f64,
    pub service_rate: f64,
}

impl LoadConfiguration {
    pub fn new(arrival_rate_vip: f64, arrival_rate_normal: f64, service_rate: f64) -> LossResult<Self> {
        for (name, rate) in [("VIP arrival", arrival_rate_vip), ("normal arrival", arrival_rate_normal)] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(LossError::InvalidLoad(format!("{name} rate must be >= 0, got {rate}")));
            }
        }
        if !service_rate.is_finite() || service_rate <= 0.0 {
            return Err(LossError::InvalidLoad(format!(
                "service rate must be > 0, got {service_rate}"
            )));
        }

        Ok(Self {
            arrival_rate_vip,
            arrival_rate_normal,
            service_rate,
        })
    }

    /// Build from mean inter-arrival and service times in minutes
    pub fn from_minutes(vip_interarrival: f64, normal_interarrival: f64, service_time: f64) -> LossResult<Self> {
        Self::new(
            rate_from_minutes(vip_interarrival)?,
            rate_from_minutes(normal_interarrival)?,
            rate_from_minutes(service_time)?,
        )
    }

    /// Total arrival rate `lambda`
    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate_vip + self.arrival_rate_normal
    }

    /// Offered load `u = lambda / mu` in Erlang
    pub fn offered_load(&self) -> f64 {
        self.arrival_rate() / self.service_rate
    }

    /// Per-server utilization `rho = u / c`
    pub fn utilization(&self, servers: u32) -> f64 {
        self.offered_load() / servers as f64
    }
}

/// Number of servers and waiting places of a node
///
/// The system capacity `K` is `servers + queue_size`, so `K >= c` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapacityConfiguration {
    pub servers: u32,
    pub queue_size: u32,
}

impl CapacityConfiguration {
    pub fn new(servers: u32, queue_size: u32) -> LossResult<Self> {
        if servers == 0 {
            return Err(LossError::InvalidCapacity("at least one server is required".into()));
        }
        servers.checked_add(queue_size).ok_or_else(|| {
            LossError::InvalidCapacity(format!("capacity {servers} + {queue_size} overflows"))
        })?;
        Ok(Self { servers, queue_size })
    }

    /// Build from a server count and a total system capacity `K`
    pub fn from_capacity(servers: u32, capacity: u32) -> LossResult<Self> {
        if capacity < servers {
            return Err(LossError::InvalidCapacity(format!(
                "capacity {capacity} is smaller than the {servers} servers"
            )));
        }
        Self::new(servers, capacity - servers)
    }

    /// Total system capacity `K`
    pub fn capacity(&self) -> u32 {
        self.servers + self.queue_size
    }

    /// Whether arrivals can wait at all
    pub fn has_queue(&self) -> bool {
        self.queue_size > 0
    }
}

/// Pair server counts with queue sizes index by index
pub fn capacities_from_lists(servers: &[u32], queue_sizes: &[u32]) -> LossResult<Vec<CapacityConfiguration>> {
    if servers.len() != queue_sizes.len() {
        return Err(LossError::MismatchedCapacityLists {
            servers: servers.len(),
            queue_sizes: queue_sizes.len(),
        });
    }

    servers
        .iter()
        .zip(queue_sizes)
        .map(|(&c, &q)| CapacityConfiguration::new(c, q))
        .collect()
}

/// Capacities with `first_servers, first_servers + 1, ...` seats and no waiting room
pub fn seat_sweep(first_servers: u32, count: u32) -> LossResult<Vec<CapacityConfiguration>> {
    (0..count)
        .map(|offset| CapacityConfiguration::new(first_servers.saturating_add(offset), 0))
        .collect()
}

/// Capacities with a fixed seat count and queue sizes `0..count`
pub fn queue_sweep(servers: u32, count: u32) -> LossResult<Vec<CapacityConfiguration>> {
    (0..count)
        .map(|queue_size| CapacityConfiguration::new(servers, queue_size))
        .collect()
}

/// Check that every configuration would be stable with an unbounded queue
///
/// A finite-capacity node is always stable; this check matters when a table
/// is meant to approximate a node whose queue is effectively unlimited.
pub fn check_unbounded_stability(load: &LoadConfiguration, capacities: &[CapacityConfiguration]) -> LossResult<()> {
    for capacity in capacities {
        let utilization = load.utilization(capacity.servers);
        debug!(servers = capacity.servers, utilization, "Checking stability");
        if utilization >= 1.0 {
            return Err(LossError::UnstableLoad {
                servers: capacity.servers,
                utilization,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_minutes() {
        assert!((rate_from_minutes(1.0).unwrap() - 1.0 / 60.0).abs() < 1e-15);
        assert!((rate_from_minutes(0.5).unwrap() - 1.0 / 30.0).abs() < 1e-15);
        assert!(rate_from_minutes(0.0).is_err());
        assert!(rate_from_minutes(-2.0).is_err());
    }

    #[test]
    fn test_offered_load() {
        let load = LoadConfiguration::from_minutes(4.0, 1.0, 2.0).unwrap();
        // lambda = 1/240 + 1/60 = 5/240, mu = 1/120
        assert!((load.arrival_rate() - 5.0 / 240.0).abs() < 1e-15);
        assert!((load.offered_load() - 2.5).abs() < 1e-12);
        assert!((load.utilization(5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_load_validation() {
        assert!(LoadConfiguration::new(-1.0, 1.0, 1.0).is_err());
        assert!(LoadConfiguration::new(1.0, f64::NAN, 1.0).is_err());
        assert!(LoadConfiguration::new(1.0, 1.0, 0.0).is_err());
        assert!(LoadConfiguration::new(0.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_capacity_configuration() {
        let cap = CapacityConfiguration::new(3, 2).unwrap();
        assert_eq!(cap.capacity(), 5);
        assert!(cap.has_queue());

        assert_eq!(CapacityConfiguration::from_capacity(3, 5).unwrap(), cap);
        assert!(CapacityConfiguration::from_capacity(4, 3).is_err());
        assert!(CapacityConfiguration::new(0, 3).is_err());
        assert!(CapacityConfiguration::new(u32::MAX, 1).is_err());
    }

    #[test]
    fn test_capacities_from_lists() {
        let caps = capacities_from_lists(&[1, 2], &[0, 3]).unwrap();
        assert_eq!(caps[1].capacity(), 5);

        assert_eq!(
            capacities_from_lists(&[1, 2, 3], &[0]),
            Err(LossError::MismatchedCapacityLists {
                servers: 3,
                queue_sizes: 1
            })
        );
    }

    #[test]
    fn test_sweeps() {
        let seats = seat_sweep(2, 3).unwrap();
        assert_eq!(
            seats.iter().map(|c| (c.servers, c.capacity())).collect::<Vec<_>>(),
            vec![(2, 2), (3, 3), (4, 4)]
        );

        let queues = queue_sweep(4, 3).unwrap();
        assert_eq!(
            queues.iter().map(|c| c.capacity()).collect::<Vec<_>>(),
            vec![4, 5, 6]
        );
        assert!(!queues[0].has_queue());
    }

    #[test]
    fn test_unbounded_stability() {
        let load = LoadConfiguration::new(1.0, 1.0, 1.0).unwrap();
        let caps = seat_sweep(1, 4).unwrap();

        assert_eq!(
            check_unbounded_stability(&load, &caps),
            Err(LossError::UnstableLoad {
                servers: 1,
                utilization: 2.0
            })
        );
        assert!(check_unbounded_stability(&load, &caps[2..]).is_ok());
    }
}
