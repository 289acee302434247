//! Error types for circuit construction

use crate::QubitId;
use thiserror::Error;

/// Errors raised while building or validating a circuit
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantumError {
    /// Invalid qubit index used
    #[error("Invalid qubit index {0}: circuit has only {1} qubits")]
    InvalidQubit(usize, usize),

    /// Operation applied to wrong number of qubits
    #[error("Operation '{name}' requires {expected} qubits, but {actual} were provided")]
    InvalidQubitCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Duplicate qubit in an operation
    #[error("Duplicate qubit {0} in operation")]
    DuplicateQubit(QubitId),

    /// Generic validation error
    #[error("Circuit validation failed: {0}")]
    ValidationError(String),
}

impl QuantumError {
    /// Create an invalid qubit error
    pub fn invalid_qubit(qubit: usize, num_qubits: usize) -> Self {
        Self::InvalidQubit(qubit, num_qubits)
    }

    /// Create an invalid qubit count error
    pub fn invalid_qubit_count(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::InvalidQubitCount {
            name: name.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

/// Reject out-of-range and repeated qubits in an operand list
pub(crate) fn check_qubits(qubits: &[QubitId], num_qubits: usize) -> crate::Result<()> {
    for (i, q) in qubits.iter().enumerate() {
        if q.index() >= num_qubits {
            return Err(QuantumError::invalid_qubit(q.index(), num_qubits));
        }
        if qubits[i + 1..].contains(q) {
            return Err(QuantumError::DuplicateQubit(*q));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_qubit_count_message() {
        let err = QuantumError::invalid_qubit_count("CNOT", 2, 1);
        let msg = err.to_string();
        assert!(msg.contains("CNOT"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_check_qubits() {
        let q = |i| QubitId::new(i);
        assert!(check_qubits(&[q(0), q(1)], 2).is_ok());
        assert_eq!(
            check_qubits(&[q(0), q(2)], 2),
            Err(QuantumError::InvalidQubit(2, 2))
        );
        assert_eq!(
            check_qubits(&[q(1), q(1)], 2),
            Err(QuantumError::DuplicateQubit(q(1)))
        );
    }
}
