//! Unitary gate definitions

use crate::{QuantumError, QubitId, Result};
use num_complex::Complex64;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Trait for unitary gates
///
/// Gates are stateless and shared between circuits through `Arc`. A gate that
/// cannot produce a matrix can still be placed in a circuit, but a state-vector
/// collaborator will refuse to simulate it.
pub trait Gate: Send + Sync + fmt::Debug {
    /// The name of the gate (e.g., "H", "CNOT", "RX")
    fn name(&self) -> &str;

    /// Number of qubits this gate acts on
    fn num_qubits(&self) -> usize;

    /// Whether this gate is its own inverse
    fn is_hermitian(&self) -> bool {
        false
    }

    /// Row-major unitary matrix of dimension 2^n × 2^n
    ///
    /// The first qubit the gate is applied to is the most significant bit of
    /// the row/column index.
    fn matrix(&self) -> Option<Vec<Complex64>> {
        None
    }
}

/// A gate bound to the qubits it acts on
#[derive(Clone)]
pub struct GateOp {
    gate: Arc<dyn Gate>,
    qubits: SmallVec<[QubitId; 2]>,
}

impl GateOp {
    /// Bind a gate to qubits
    ///
    /// # Errors
    /// Returns error if the qubit count does not match the gate or a qubit is repeated
    pub fn new(gate: Arc<dyn Gate>, qubits: &[QubitId]) -> Result<Self> {
        if qubits.len() != gate.num_qubits() {
            return Err(QuantumError::invalid_qubit_count(
                gate.name(),
                gate.num_qubits(),
                qubits.len(),
            ));
        }

        for (i, q) in qubits.iter().enumerate() {
            if qubits[i + 1..].contains(q) {
                return Err(QuantumError::DuplicateQubit(*q));
            }
        }

        Ok(Self {
            gate,
            qubits: SmallVec::from_slice(qubits),
        })
    }

    #[inline]
    pub fn gate(&self) -> &Arc<dyn Gate> {
        &self.gate
    }

    #[inline]
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }
}

impl fmt::Debug for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.gate.name())?;
        for (i, q) in self.qubits.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", q)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
