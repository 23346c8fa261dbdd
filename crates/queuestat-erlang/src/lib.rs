//! queuestat-erlang - Loss probabilities for finite-capacity multi-server queues
//!
//! Models an M/M/c/K node: `c` identical servers, a hard system capacity
//! `K >= c`, Poisson arrivals and exponential service. Arrivals that find
//! `K` customers in the node are lost.
//!
//! - **Backend**: injectable arithmetic (exact rationals or plain `f64`)
//! - **Load**: offered load and capacity configurations
//! - **Loss**: normalizing constant `P0`, blocking probability, loss tables
//!
//! # Precision
//!
//! Factorials and powers at capacities of a few dozen exceed what `f64`
//! represents faithfully, so the default engine evaluates the formulas on
//! exact rationals and converts only the final probability.

pub mod backend;
pub mod error;
pub mod load;
pub mod loss;

pub use backend::*;
pub use error::*;
pub use load::*;
pub use loss::*;
