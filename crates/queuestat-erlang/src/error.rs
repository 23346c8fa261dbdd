//! Error types for the loss engine

use thiserror::Error;

/// Errors raised while configuring or evaluating loss probabilities
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LossError {
    #[error("Server and queue-size lists differ in length: {servers} vs {queue_sizes}")]
    MismatchedCapacityLists { servers: usize, queue_sizes: usize },

    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    #[error("Utilization {utilization} >= 1 with {servers} servers and an unbounded queue")]
    UnstableLoad { servers: u32, utilization: f64 },

    #[error("Invalid load: {0}")]
    InvalidLoad(String),

    #[error("Value not representable by the {backend} backend: {value}")]
    NonRepresentable { backend: &'static str, value: String },

    #[error("Division by zero while computing {0}")]
    DivisionByZero(&'static str),
}

/// Result type for loss engine operations
pub type LossResult<T> = Result<T, LossError>;
