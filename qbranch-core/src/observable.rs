//! Pauli-string observables for terminal expectation values
//!
//! A [`PauliObservable`] is `c · P₁ ⊗ P₂ ⊗ …` over a subset of qubits; qubits
//! not listed carry the identity.

use crate::{QuantumError, QubitId, Result};
use smallvec::SmallVec;
use std::fmt;

/// Single-qubit Pauli operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    /// Parse a Pauli operator from a character
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// Whether this operator flips the computational basis bit
    pub fn flips(self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Weighted tensor product of Pauli operators
#[derive(Debug, Clone, PartialEq)]
pub struct PauliObservable {
    coefficient: f64,
    terms: SmallVec<[(QubitId, Pauli); 2]>,
}

impl PauliObservable {
    /// # Errors
    /// Returns error if a qubit appears twice
    pub fn new(coefficient: f64, terms: &[(QubitId, Pauli)]) -> Result<Self> {
        for (i, (q, _)) in terms.iter().enumerate() {
            if terms[i + 1..].iter().any(|(other, _)| other == q) {
                return Err(QuantumError::DuplicateQubit(*q));
            }
        }
        Ok(Self {
            coefficient,
            terms: terms
                .iter()
                .copied()
                .filter(|(_, p)| *p != Pauli::I)
                .collect(),
        })
    }

    /// Parse a dense string such as "XIZ", character `i` acting on qubit `i`
    pub fn from_str(s: &str) -> Result<Self> {
        let mut terms = SmallVec::new();
        for (i, c) in s.chars().enumerate() {
            let pauli = Pauli::from_char(c).ok_or_else(|| {
                QuantumError::ValidationError(format!("'{}' is not a Pauli operator", c))
            })?;
            if pauli != Pauli::I {
                terms.push((QubitId::new(i), pauli));
            }
        }
        Ok(Self {
            coefficient: 1.0,
            terms,
        })
    }

    pub fn x(qubit: QubitId) -> Self {
        Self::single(qubit, Pauli::X)
    }

    pub fn y(qubit: QubitId) -> Self {
        Self::single(qubit, Pauli::Y)
    }

    pub fn z(qubit: QubitId) -> Self {
        Self::single(qubit, Pauli::Z)
    }

    fn single(qubit: QubitId, pauli: Pauli) -> Self {
        Self {
            coefficient: 1.0,
            terms: SmallVec::from_slice(&[(qubit, pauli)]),
        }
    }

    pub fn with_coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = coefficient;
        self
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Non-identity factors
    pub fn terms(&self) -> &[(QubitId, Pauli)] {
        &self.terms
    }

    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.terms.iter().map(|(q, _)| *q)
    }
}

impl fmt::Display for PauliObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coefficient)?;
        if self.terms.is_empty() {
            return write!(f, "·I");
        }
        for (q, p) in &self.terms {
            write!(f, "·{}({})", p, q)?;
        }
        Ok(())
    }
}
