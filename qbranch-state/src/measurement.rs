//! Terminal measurement evaluation
//!
//! Analytic measurements (`expval`, `var`, `probs`) are exact functions of the
//! state. Sampled measurements (`sample`, `counts`) draw `shots` outcomes from
//! the marginal distribution with the caller's RNG.

use crate::error::{Result, StateError};
use crate::state_vector::StateVector;
use qbranch_core::{MeasurementKind, MeasurementProcess, QubitId};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of one terminal measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasurementValue {
    /// Expectation value or variance
    Scalar(f64),
    /// Probability vector
    Vector(Vec<f64>),
    /// One bit row per shot, columns follow the measured qubits
    Samples(Vec<Vec<u8>>),
    /// Bitstring histogram, first measured qubit leftmost
    Counts(BTreeMap<String, usize>),
}

impl MeasurementValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MeasurementValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            MeasurementValue::Vector(v) => Some(v),
            _ => None,
        }
    }
}

/// Evaluate one terminal measurement on a normalized state
///
/// # Errors
/// Returns error for out-of-range qubits, or for a sampled measurement without `shots`
pub fn evaluate<R: Rng + ?Sized>(
    process: &MeasurementProcess,
    state: &StateVector,
    shots: Option<usize>,
    rng: &mut R,
) -> Result<MeasurementValue> {
    match process {
        MeasurementProcess::Expval(obs) => Ok(MeasurementValue::Scalar(state.expectation(obs)?)),
        MeasurementProcess::Var(obs) => Ok(MeasurementValue::Scalar(state.variance(obs)?)),
        MeasurementProcess::Probs(qubits) => Ok(MeasurementValue::Vector(state.probabilities(qubits)?)),
        MeasurementProcess::Sample(qubits) => {
            let shots = shots.ok_or(StateError::MissingShots {
                kind: MeasurementKind::Sample,
            })?;
            let outcomes = sample_indices(state, qubits, shots, rng)?;
            let rows = outcomes
                .into_iter()
                .map(|outcome| bits(outcome, qubits.len()))
                .collect();
            Ok(MeasurementValue::Samples(rows))
        }
        MeasurementProcess::Counts(qubits) => {
            let shots = shots.ok_or(StateError::MissingShots {
                kind: MeasurementKind::Counts,
            })?;
            let mut counts = BTreeMap::new();
            for outcome in sample_indices(state, qubits, shots, rng)? {
                let key: String = bits(outcome, qubits.len())
                    .into_iter()
                    .map(|b| if b == 1 { '1' } else { '0' })
                    .collect();
                *counts.entry(key).or_insert(0) += 1;
            }
            Ok(MeasurementValue::Counts(counts))
        }
    }
}

fn sample_indices<R: Rng + ?Sized>(
    state: &StateVector,
    qubits: &[QubitId],
    shots: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let probabilities = state.probabilities(qubits)?;
    let dist = WeightedIndex::new(&probabilities)
        .map_err(|e| StateError::InvalidProbabilities(e.to_string()))?;
    Ok((0..shots).map(|_| dist.sample(rng)).collect())
}

/// Bits of `outcome`, most significant first
fn bits(outcome: usize, width: usize) -> Vec<u8> {
    (0..width)
        .map(|j| ((outcome >> (width - 1 - j)) & 1) as u8)
        .collect()
}
