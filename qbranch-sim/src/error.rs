//! Error types for the tree-traversal simulator

use qbranch_core::{MeasurementKind, QuantumError};
use qbranch_state::StateError;
use thiserror::Error;

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Errors that abort a simulation
///
/// There is no partial result: a traversal either completes or returns one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulatorError {
    /// The circuit cannot be split into a consistent branch tree
    #[error("Structural error: {0}")]
    Structural(String),

    /// No combination rule exists for this measurement kind
    #[error("tree traversal does not support '{kind}' measurements")]
    UnsupportedObservable { kind: MeasurementKind },

    /// A leaf value does not have the shape its combination rule expects
    #[error("Result of '{kind}' measurement is not a {expected}")]
    ResultShape {
        kind: MeasurementKind,
        expected: &'static str,
    },

    /// Every branch of the tree was pruned
    #[error("All branches were pruned; no outcome has non-zero probability")]
    AllBranchesPruned,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error raised by the circuit model
    #[error(transparent)]
    Circuit(#[from] QuantumError),

    /// Error raised by state operations
    #[error(transparent)]
    State(#[from] StateError),
}

impl SimulatorError {
    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }
}
