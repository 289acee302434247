//! Kraus operators and the channel trait

use crate::{QuantumError, Result};
use num_complex::Complex64;
use std::fmt;

/// One operator of a Kraus decomposition
///
/// Stored row-major; for an n-qubit operator the dimension is 2^n and the
/// first qubit the operator is applied to is the most significant index bit.
#[derive(Clone, Debug, PartialEq)]
pub struct KrausOperator {
    matrix: Vec<Complex64>,
    dimension: usize,
}

impl KrausOperator {
    /// Create a Kraus operator from a flattened row-major matrix
    ///
    /// # Errors
    /// Returns error if dimension is not a power of 2 or the matrix size doesn't match
    pub fn new(matrix: Vec<Complex64>, dimension: usize) -> Result<Self> {
        if dimension < 2 || !dimension.is_power_of_two() {
            return Err(QuantumError::validation(format!(
                "Kraus operator dimension must be a power of 2 (>= 2), got {}",
                dimension
            )));
        }

        if matrix.len() != dimension * dimension {
            return Err(QuantumError::validation(format!(
                "Matrix size {} doesn't match dimension {}×{}",
                matrix.len(),
                dimension,
                dimension
            )));
        }

        Ok(Self { matrix, dimension })
    }

    /// Build a single-qubit operator from its four entries
    pub fn single_qubit(m: [[Complex64; 2]; 2]) -> Self {
        Self {
            matrix: vec![m[0][0], m[0][1], m[1][0], m[1][1]],
            dimension: 2,
        }
    }

    /// Single-qubit real-valued operator
    pub(crate) fn real(m00: f64, m01: f64, m10: f64, m11: f64) -> Self {
        let c = |x| Complex64::new(x, 0.0);
        Self::single_qubit([[c(m00), c(m01)], [c(m10), c(m11)]])
    }

    /// Projector |b⟩⟨b| onto a computational basis state of one qubit
    pub fn projector(bit: u8) -> Self {
        if bit == 0 {
            Self::real(1.0, 0.0, 0.0, 0.0)
        } else {
            Self::real(0.0, 0.0, 0.0, 1.0)
        }
    }

    /// Multiply every entry by a scalar
    pub fn scaled(mut self, factor: f64) -> Self {
        for entry in &mut self.matrix {
            *entry *= factor;
        }
        self
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.dimension.trailing_zeros() as usize
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn matrix(&self) -> &[Complex64] {
        &self.matrix
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.matrix[row * self.dimension + col]
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Self {
        let dim = self.dimension;
        let mut adj = vec![Complex64::new(0.0, 0.0); self.matrix.len()];
        for i in 0..dim {
            for j in 0..dim {
                adj[j * dim + i] = self.matrix[i * dim + j].conj();
            }
        }
        Self {
            matrix: adj,
            dimension: dim,
        }
    }
}

/// A quantum channel given by its Kraus decomposition
///
/// The order of [`kraus_operators`](NoiseChannel::kraus_operators) is the
/// outcome order the simulator walks; it must be stable across calls.
pub trait NoiseChannel: Send + Sync + fmt::Debug {
    /// Ordered Kraus operators defining this channel
    fn kraus_operators(&self) -> Vec<KrausOperator>;

    /// Number of qubits this channel acts on
    fn num_qubits(&self) -> usize;

    /// Name of this channel (e.g. "amplitude_damping")
    fn name(&self) -> &str;

    /// Number of outcomes (Kraus operators)
    fn num_kraus(&self) -> usize {
        self.kraus_operators().len()
    }

    /// Verify the completeness relation Σ K_i† K_i = I
    fn verify_completeness(&self, tolerance: f64) -> bool {
        let operators = self.kraus_operators();
        let Some(first) = operators.first() else {
            return false;
        };

        let dim = first.dimension();
        let mut sum = vec![Complex64::new(0.0, 0.0); dim * dim];

        for kraus in &operators {
            if kraus.dimension() != dim {
                return false;
            }
            let adj = kraus.adjoint();
            for i in 0..dim {
                for j in 0..dim {
                    let element: Complex64 = (0..dim).map(|k| adj.get(i, k) * kraus.get(k, j)).sum();
                    sum[i * dim + j] += element;
                }
            }
        }

        (0..dim).all(|i| {
            (0..dim).all(|j| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (sum[i * dim + j] - Complex64::new(expected, 0.0)).norm() <= tolerance
            })
        })
    }
}
