//! Dense state vector

use crate::error::{Result, StateError};
use crate::kernels;
use num_complex::Complex64;
use qbranch_core::{GateOp, KrausOperator, Pauli, PauliObservable, QubitId, StatePrep};

/// Largest register a dense vector is allowed to hold
const MAX_QUBITS: usize = 30;

/// Quantum state as a dense vector of 2^n complex amplitudes
///
/// Qubit `q` is bit `q` of an amplitude index. Measurement helpers assume the
/// state is normalized; [`squared_norm`](StateVector::squared_norm) and
/// [`scale`](StateVector::scale) are there for collapse bookkeeping.
///
/// # Example
///
/// ```
/// use qbranch_state::StateVector;
///
/// let state = StateVector::new(2).unwrap();
/// assert_eq!(state.num_qubits(), 2);
/// assert_eq!(state.dimension(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// Create a state vector initialized to |0...0⟩
    ///
    /// # Errors
    /// Returns error if `num_qubits` exceeds the dense-vector limit
    pub fn new(num_qubits: usize) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::InvalidDimension {
                dimension: 1usize << num_qubits.min(usize::BITS as usize - 1),
            });
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Build the state a full-width preparation describes
    ///
    /// # Errors
    /// Returns error if the preparation does not cover all `num_qubits` qubits
    pub fn from_prep(prep: &StatePrep, num_qubits: usize) -> Result<Self> {
        if !prep.is_full_width(num_qubits) {
            return Err(StateError::PartialStatePrep {
                covered: prep.qubits().len(),
                num_qubits,
            });
        }
        let qubits = prep.qubits();
        for q in qubits {
            check_qubit(q.index(), num_qubits)?;
        }

        let mut state = Self::new(num_qubits)?;
        state.amplitudes[0] = Complex64::new(0.0, 0.0);
        for (local, amp) in prep.amplitudes().iter().enumerate() {
            state.amplitudes[global_index(local, qubits)] = *amp;
        }
        Ok(state)
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// ⟨ψ|ψ⟩
    pub fn squared_norm(&self) -> f64 {
        kernels::squared_norm(&self.amplitudes)
    }

    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    /// Multiply every amplitude by `factor`
    pub fn scale(&mut self, factor: f64) {
        for amplitude in &mut self.amplitudes {
            *amplitude *= factor;
        }
    }

    pub fn is_normalized(&self, epsilon: f64) -> bool {
        (self.norm() - 1.0).abs() < epsilon
    }

    /// Apply a row-major 2^k × 2^k matrix to `qubits` in place
    pub fn apply_matrix(&mut self, matrix: &[Complex64], qubits: &[QubitId]) -> Result<()> {
        let expected = 1usize << (2 * qubits.len());
        if matrix.len() != expected {
            return Err(StateError::DimensionMismatch {
                expected,
                actual: matrix.len(),
            });
        }
        let indices: Vec<usize> = qubits.iter().map(QubitId::index).collect();
        for (i, &q) in indices.iter().enumerate() {
            check_qubit(q, self.num_qubits)?;
            if indices[i + 1..].contains(&q) {
                return Err(StateError::InvalidQubitIndex {
                    index: q,
                    num_qubits: self.num_qubits,
                });
            }
        }
        kernels::apply_matrix(&mut self.amplitudes, matrix, &indices);
        Ok(())
    }

    /// Apply a gate operation in place
    pub fn apply_gate(&mut self, op: &GateOp) -> Result<()> {
        let matrix = op.gate().matrix().ok_or_else(|| StateError::MissingMatrix {
            gate: op.gate().name().to_string(),
        })?;
        self.apply_matrix(&matrix, op.qubits())
    }

    /// Apply a Kraus operator into a new, unnormalized buffer
    pub fn apply_kraus(&self, operator: &KrausOperator, qubits: &[QubitId]) -> Result<Self> {
        if operator.num_qubits() != qubits.len() {
            return Err(StateError::DimensionMismatch {
                expected: operator.num_qubits(),
                actual: qubits.len(),
            });
        }
        let mut next = self.clone();
        next.apply_matrix(operator.matrix(), qubits)?;
        Ok(next)
    }

    /// Marginal probabilities over `qubits`, first qubit most significant
    pub fn probabilities(&self, qubits: &[QubitId]) -> Result<Vec<f64>> {
        for q in qubits {
            check_qubit(q.index(), self.num_qubits)?;
        }
        let mut probs = vec![0.0; 1 << qubits.len()];
        for (i, amp) in self.amplitudes.iter().enumerate() {
            probs[local_index(i, qubits)] += amp.norm_sqr();
        }
        Ok(probs)
    }

    /// ⟨ψ|O|ψ⟩ for a Pauli observable
    pub fn expectation(&self, observable: &PauliObservable) -> Result<f64> {
        let mut flip_mask = 0usize;
        for (q, p) in observable.terms() {
            check_qubit(q.index(), self.num_qubits)?;
            if p.flips() {
                flip_mask |= q.mask();
            }
        }

        // P|i⟩ = phase(i)|i ^ flip_mask⟩
        let value: Complex64 = self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(i, amp)| {
                let phase = pauli_phase(i, observable.terms());
                self.amplitudes[i ^ flip_mask].conj() * phase * amp
            })
            .sum();

        Ok(observable.coefficient() * value.re)
    }

    /// ⟨O²⟩ - ⟨O⟩²; a Pauli string squares to the identity
    pub fn variance(&self, observable: &PauliObservable) -> Result<f64> {
        let mean = self.expectation(observable)?;
        let c = observable.coefficient();
        Ok(c * c * self.squared_norm() - mean * mean)
    }
}

fn check_qubit(index: usize, num_qubits: usize) -> Result<()> {
    if index >= num_qubits {
        return Err(StateError::InvalidQubitIndex { index, num_qubits });
    }
    Ok(())
}

fn pauli_phase(index: usize, terms: &[(QubitId, Pauli)]) -> Complex64 {
    terms
        .iter()
        .fold(Complex64::new(1.0, 0.0), |phase, (q, p)| {
            let set = index & q.mask() != 0;
            match (p, set) {
                (Pauli::Y, false) => phase * Complex64::new(0.0, 1.0),
                (Pauli::Y, true) => phase * Complex64::new(0.0, -1.0),
                (Pauli::Z, true) => -phase,
                _ => phase,
            }
        })
}

/// Global basis index -> index over `qubits`, first qubit most significant
pub(crate) fn local_index(global: usize, qubits: &[QubitId]) -> usize {
    qubits
        .iter()
        .fold(0usize, |acc, q| (acc << 1) | usize::from(global & q.mask() != 0))
}

fn global_index(local: usize, qubits: &[QubitId]) -> usize {
    let k = qubits.len();
    qubits
        .iter()
        .enumerate()
        .filter(|(j, _)| (local >> (k - 1 - j)) & 1 == 1)
        .fold(0usize, |acc, (_, q)| acc | q.mask())
}
