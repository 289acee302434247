//! Standard noise channels

use super::types::{KrausOperator, NoiseChannel};
use crate::{QuantumError, Result};
use num_complex::Complex64;

fn check_probability(what: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(QuantumError::validation(format!(
            "{} must be in [0,1], got {}",
            what, value
        )))
    }
}

/// Amplitude damping channel
///
/// Energy relaxation |1⟩ → |0⟩ with probability γ.
///
/// # Kraus Operators
/// ```text
/// K₀ = [[1, 0], [0, √(1-γ)]]
/// K₁ = [[0, √γ], [0, 0]]
/// ```
///
/// # Example
/// ```
/// use qbranch_core::noise::{AmplitudeDamping, NoiseChannel};
///
/// let channel = AmplitudeDamping::new(0.3).unwrap();
/// assert_eq!(channel.num_kraus(), 2);
/// assert!(channel.verify_completeness(1e-12));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AmplitudeDamping {
    gamma: f64,
}

impl AmplitudeDamping {
    /// # Errors
    /// Returns error if gamma is not in [0, 1]
    pub fn new(gamma: f64) -> Result<Self> {
        Ok(Self {
            gamma: check_probability("Gamma", gamma)?,
        })
    }

    /// Create from T1 relaxation time and gate duration: γ = 1 - exp(-t/T1)
    pub fn from_t1(t1: f64, gate_time: f64) -> Result<Self> {
        if t1 <= 0.0 {
            return Err(QuantumError::validation("T1 must be positive"));
        }
        if gate_time < 0.0 {
            return Err(QuantumError::validation("Gate time must be non-negative"));
        }
        Self::new(1.0 - (-gate_time / t1).exp())
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl NoiseChannel for AmplitudeDamping {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let g = self.gamma;
        vec![
            KrausOperator::real(1.0, 0.0, 0.0, (1.0 - g).sqrt()),
            KrausOperator::real(0.0, g.sqrt(), 0.0, 0.0),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "amplitude_damping"
    }
}

/// Phase damping channel
///
/// Loss of coherence without energy exchange.
///
/// # Kraus Operators
/// ```text
/// K₀ = [[1, 0], [0, √(1-γ)]]
/// K₁ = [[0, 0], [0, √γ]]
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PhaseDamping {
    gamma: f64,
}

impl PhaseDamping {
    pub fn new(gamma: f64) -> Result<Self> {
        Ok(Self {
            gamma: check_probability("Gamma", gamma)?,
        })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl NoiseChannel for PhaseDamping {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let g = self.gamma;
        vec![
            KrausOperator::real(1.0, 0.0, 0.0, (1.0 - g).sqrt()),
            KrausOperator::real(0.0, 0.0, 0.0, g.sqrt()),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "phase_damping"
    }
}

/// Bit flip: X with probability p
///
/// K₀ = √(1-p) I, K₁ = √p X
#[derive(Debug, Clone, Copy)]
pub struct BitFlip {
    p: f64,
}

impl BitFlip {
    pub fn new(p: f64) -> Result<Self> {
        Ok(Self {
            p: check_probability("Flip probability", p)?,
        })
    }
}

impl NoiseChannel for BitFlip {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        vec![
            KrausOperator::real(1.0, 0.0, 0.0, 1.0).scaled((1.0 - self.p).sqrt()),
            KrausOperator::real(0.0, 1.0, 1.0, 0.0).scaled(self.p.sqrt()),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "bit_flip"
    }
}

/// Phase flip: Z with probability p
///
/// K₀ = √(1-p) I, K₁ = √p Z
#[derive(Debug, Clone, Copy)]
pub struct PhaseFlip {
    p: f64,
}

impl PhaseFlip {
    pub fn new(p: f64) -> Result<Self> {
        Ok(Self {
            p: check_probability("Flip probability", p)?,
        })
    }
}

impl NoiseChannel for PhaseFlip {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        vec![
            KrausOperator::real(1.0, 0.0, 0.0, 1.0).scaled((1.0 - self.p).sqrt()),
            KrausOperator::real(1.0, 0.0, 0.0, -1.0).scaled(self.p.sqrt()),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "phase_flip"
    }
}

/// Depolarizing channel
///
/// ```text
/// K₀ = √(1-p) I
/// K₁ = √(p/3) X
/// K₂ = √(p/3) Y
/// K₃ = √(p/3) Z
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DepolarizingChannel {
    error_probability: f64,
}

impl DepolarizingChannel {
    pub fn new(error_probability: f64) -> Result<Self> {
        Ok(Self {
            error_probability: check_probability("Error probability", error_probability)?,
        })
    }

    pub fn error_probability(&self) -> f64 {
        self.error_probability
    }
}

impl NoiseChannel for DepolarizingChannel {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let p = self.error_probability;
        let zero = Complex64::new(0.0, 0.0);
        let y = KrausOperator::single_qubit([
            [zero, Complex64::new(0.0, -1.0)],
            [Complex64::new(0.0, 1.0), zero],
        ]);
        vec![
            KrausOperator::real(1.0, 0.0, 0.0, 1.0).scaled((1.0 - p).sqrt()),
            KrausOperator::real(0.0, 1.0, 1.0, 0.0).scaled((p / 3.0).sqrt()),
            y.scaled((p / 3.0).sqrt()),
            KrausOperator::real(1.0, 0.0, 0.0, -1.0).scaled((p / 3.0).sqrt()),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "depolarizing"
    }
}

/// Channel defined by an explicit list of Kraus operators
#[derive(Debug, Clone)]
pub struct KrausChannel {
    operators: Vec<KrausOperator>,
}

impl KrausChannel {
    /// Completeness is checked to this tolerance on construction
    pub const COMPLETENESS_TOLERANCE: f64 = 1e-8;

    /// # Errors
    /// Returns error if the list is empty, dimensions differ, or Σ K†K ≠ I
    pub fn new(operators: Vec<KrausOperator>) -> Result<Self> {
        if operators.is_empty() {
            return Err(QuantumError::validation("Kraus channel needs at least one operator"));
        }
        let channel = Self { operators };
        if !channel.verify_completeness(Self::COMPLETENESS_TOLERANCE) {
            return Err(QuantumError::validation(
                "Kraus operators do not satisfy Σ K†K = I",
            ));
        }
        Ok(channel)
    }
}

impl NoiseChannel for KrausChannel {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        self.operators.clone()
    }

    fn num_qubits(&self) -> usize {
        self.operators[0].num_qubits()
    }

    fn name(&self) -> &str {
        "kraus"
    }
}
