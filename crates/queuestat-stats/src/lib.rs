//! queuestat-stats - Statistical aggregation for queueing-simulation output
//!
//! This crate turns raw per-repetition observation vectors into point
//! estimates and chart-ready series:
//!
//! - **Repetitions**: balancing, column-wise means across repetitions, time averages
//! - **Summary**: sample mean, median and quantile with confidence intervals,
//!   coefficient of variation, index of dispersion, partial variance
//! - **ECDF**: empirical CDF points with optional per-point error bars
//! - **Lorenz**: cumulative-share curve points
//! - **QQ**: quantile-quantile points with a least-squares goodness-of-fit line
//! - **Throughput**: step-held mean throughput across runs for warm-up choice
//!
//! # Conventions
//!
//! Every confidence interval is reported as distances from the point estimate
//! (`[estimate - lower_error, estimate + upper_error]`), never as absolute bounds.
//! All routines are pure functions of their inputs.

pub mod ecdf;
pub mod error;
pub mod estimate;
pub mod lorenz;
pub mod qq;
pub mod repetitions;
pub mod summary;
pub mod throughput;

pub use ecdf::*;
pub use error::*;
pub use estimate::*;
pub use lorenz::*;
pub use qq::*;
pub use repetitions::*;
pub use summary::*;
pub use throughput::*;
