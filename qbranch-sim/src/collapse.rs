//! Branch collapse
//!
//! Applies one outcome's collapse operator to a parent state and decides
//! whether the resulting branch is worth simulating.

use crate::backend::BranchBackend;
use crate::error::{Result, SimulatorError};
use crate::segment::BranchNode;
use tracing::warn;

/// Why a branch was not expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    /// Outcome differs from the post-selected one
    PostSelection,
    /// Probability below the norm tolerance
    BelowTolerance,
    /// Probability was NaN, infinite or negative
    Degenerate,
}

/// Result of collapsing a state onto one outcome
#[derive(Debug)]
pub enum Collapsed<S> {
    Pruned(PruneReason),
    /// Normalized successor state and the probability registered for it
    Branch { state: S, probability: f64 },
}

impl<S> Collapsed<S> {
    /// Registered probability; `0.0` for a pruned branch
    pub fn probability(&self) -> f64 {
        match self {
            Collapsed::Pruned(_) => 0.0,
            Collapsed::Branch { probability, .. } => *probability,
        }
    }

    pub fn is_pruned(&self) -> bool {
        matches!(self, Collapsed::Pruned(_))
    }
}

/// Collapse `state` onto outcome `outcome` of `node`
///
/// The parent state is left untouched; the successor is a fresh buffer from
/// the backend. An accepted post-selected outcome registers probability `1.0`.
///
/// # Errors
/// Returns a structural error for an outcome index without an operator, and
/// propagates backend errors unchanged.
pub fn collapse<B: BranchBackend>(
    backend: &B,
    state: &B::State,
    node: &BranchNode,
    outcome: usize,
    tolerance: f64,
) -> Result<Collapsed<B::State>> {
    let forced = node.forced_outcome();
    if forced.is_some_and(|f| f != outcome) {
        return Ok(Collapsed::Pruned(PruneReason::PostSelection));
    }

    let operator = node.operators().get(outcome).ok_or_else(|| {
        SimulatorError::Structural(format!(
            "Outcome {} out of range for branch node at operation {}",
            outcome,
            node.position()
        ))
    })?;

    let mut next = backend.apply_operator(operator, node.qubits(), state)?;
    let p = backend.squared_norm(&next);

    if !p.is_finite() || p < 0.0 {
        warn!(
            position = node.position(),
            outcome,
            probability = p,
            "Degenerate branch probability; pruning"
        );
        return Ok(Collapsed::Pruned(PruneReason::Degenerate));
    }
    if p < tolerance {
        return Ok(Collapsed::Pruned(PruneReason::BelowTolerance));
    }

    backend.rescale(&mut next, 1.0 / p.sqrt());

    Ok(Collapsed::Branch {
        state: next,
        probability: if forced.is_some() { 1.0 } else { p },
    })
}
