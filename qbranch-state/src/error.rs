//! Error types for state vector operations

use qbranch_core::MeasurementKind;
use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// Invalid state dimension
    #[error("Invalid state dimension {dimension}, expected power of 2")]
    InvalidDimension { dimension: usize },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Gate has no matrix representation
    #[error("Gate '{gate}' has no matrix representation")]
    MissingMatrix { gate: String },

    /// State preparation does not cover the register
    #[error("State preparation covers {covered} of {num_qubits} qubits")]
    PartialStatePrep { covered: usize, num_qubits: usize },

    /// Sampled measurement requested without a shot count
    #[error("Measurement '{kind}' requires a shot count")]
    MissingShots { kind: MeasurementKind },

    /// Probability distribution cannot be sampled
    #[error("Cannot sample from distribution: {0}")]
    InvalidProbabilities(String),
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
