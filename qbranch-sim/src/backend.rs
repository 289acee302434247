//! Collaborator interface used by the traversal
//!
//! The traversal never touches amplitudes directly: it asks a
//! [`BranchBackend`] to prepare, collapse, rescale, simulate and measure
//! states. [`StateVectorBackend`] is the dense implementation.

use crate::config::TreeConfig;
use crate::error::{Result, SimulatorError};
use crate::result::ResultTuple;
use crate::segment::{Segment, SegmentEntry, SegmentOp};
use ahash::AHashMap;
use qbranch_core::{KrausOperator, MeasureId, QubitId};
use qbranch_state::{evaluate, StateVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Per-call context handed to the backend
///
/// Carries the RNG used by sampled measurements and the classical values of
/// the mid-circuit measurements on the branch being simulated.
#[derive(Debug)]
pub struct ExecutionContext {
    rng: StdRng,
    shots: Option<usize>,
    mid_measurements: AHashMap<MeasureId, i64>,
}

impl ExecutionContext {
    pub fn new(config: &TreeConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            shots: config.shots,
            mid_measurements: AHashMap::new(),
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn shots(&self) -> Option<usize> {
        self.shots
    }

    /// Classical value of `id` on the current branch
    pub fn mid_measurement(&self, id: MeasureId) -> Option<i64> {
        self.mid_measurements.get(&id).copied()
    }

    /// Replace the registered measurement values
    pub fn set_mid_measurements(&mut self, values: impl IntoIterator<Item = (MeasureId, i64)>) {
        self.mid_measurements.clear();
        self.mid_measurements.extend(values);
    }
}

/// State operations the traversal delegates
///
/// Implementations must not keep references to states they are given:
/// `apply_operator` returns a fresh buffer and `simulate` consumes its input.
pub trait BranchBackend {
    type State;

    /// Entry state of segment 0 on `num_qubits` qubits
    ///
    /// [`SegmentEntry::Inherited`] has no state of its own and is a structural
    /// error here.
    fn prepare_state(&self, entry: &SegmentEntry, num_qubits: usize) -> Result<Self::State>;

    /// Apply an (unnormalized) collapse operator, leaving `state` untouched
    fn apply_operator(
        &self,
        operator: &KrausOperator,
        qubits: &[QubitId],
        state: &Self::State,
    ) -> Result<Self::State>;

    fn squared_norm(&self, state: &Self::State) -> f64;

    fn rescale(&self, state: &mut Self::State, factor: f64);

    /// Run the non-branching operations of `segment`
    ///
    /// Returns the final state and whether it is batched.
    fn simulate(
        &self,
        segment: &Segment,
        state: Self::State,
        ctx: &mut ExecutionContext,
    ) -> Result<(Self::State, bool)>;

    /// One value per terminal measurement of `segment`
    fn evaluate_measurements(
        &self,
        segment: &Segment,
        state: &Self::State,
        is_batched: bool,
        ctx: &mut ExecutionContext,
    ) -> Result<ResultTuple>;
}

/// Dense state-vector backend
#[derive(Debug, Clone, Copy, Default)]
pub struct StateVectorBackend;

impl BranchBackend for StateVectorBackend {
    type State = StateVector;

    fn prepare_state(&self, entry: &SegmentEntry, num_qubits: usize) -> Result<StateVector> {
        match entry {
            SegmentEntry::Zero => Ok(StateVector::new(num_qubits)?),
            SegmentEntry::Prepared(prep) => Ok(StateVector::from_prep(prep, num_qubits)?),
            SegmentEntry::Inherited => Err(SimulatorError::structural(
                "Inherited segment has no entry state to prepare",
            )),
        }
    }

    fn apply_operator(
        &self,
        operator: &KrausOperator,
        qubits: &[QubitId],
        state: &StateVector,
    ) -> Result<StateVector> {
        Ok(state.apply_kraus(operator, qubits)?)
    }

    fn squared_norm(&self, state: &StateVector) -> f64 {
        state.squared_norm()
    }

    fn rescale(&self, state: &mut StateVector, factor: f64) {
        state.scale(factor);
    }

    fn simulate(
        &self,
        segment: &Segment,
        mut state: StateVector,
        ctx: &mut ExecutionContext,
    ) -> Result<(StateVector, bool)> {
        for op in segment.operations() {
            match op {
                SegmentOp::Gate(gate) => state.apply_gate(gate)?,
                SegmentOp::Conditional(cond) => {
                    let measured = ctx.mid_measurement(cond.condition.measure).ok_or_else(|| {
                        SimulatorError::Structural(format!(
                            "Condition on {} has no value on this branch",
                            cond.condition.measure
                        ))
                    })?;
                    if measured == cond.condition.value {
                        state.apply_gate(&cond.op)?;
                    }
                }
            }
        }
        Ok((state, false))
    }

    fn evaluate_measurements(
        &self,
        segment: &Segment,
        state: &StateVector,
        _is_batched: bool,
        ctx: &mut ExecutionContext,
    ) -> Result<ResultTuple> {
        let shots = ctx.shots();
        segment
            .measurements()
            .iter()
            .map(|m| evaluate(m, state, shots, ctx.rng()).map_err(SimulatorError::from))
            .collect()
    }
}
