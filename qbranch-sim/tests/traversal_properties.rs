//! Resource and pruning properties of the traversal, checked with an
//! instrumented backend that counts live state buffers and simulate calls.

use num_complex::Complex64;
use proptest::prelude::*;
use qbranch_core::noise::{KrausChannel, KrausOperator};
use qbranch_core::standard::{Hadamard, RotationY};
use qbranch_core::{Circuit, MeasurementProcess, MidMeasure, PauliObservable, QubitId};
use qbranch_sim::{
    BranchBackend, ExecutionContext, ResultTuple, Segment, SegmentEntry, SimulatorError,
    StateVectorBackend, TreeConfig, TreeSimulator,
};
use qbranch_state::StateError;
use qbranch_state::StateVector;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    live: Cell<usize>,
    peak: Cell<usize>,
    simulated: Cell<usize>,
    unnormalized_inputs: Cell<usize>,
}

/// Decrements the live count when the owning state is dropped
#[derive(Debug)]
struct LiveGuard(Rc<Counters>);

impl LiveGuard {
    fn new(counters: &Rc<Counters>) -> Self {
        let live = counters.live.get() + 1;
        counters.live.set(live);
        counters.peak.set(counters.peak.get().max(live));
        Self(Rc::clone(counters))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.live.set(self.0.live.get() - 1);
    }
}

#[derive(Debug)]
struct Tracked {
    inner: StateVector,
    _guard: LiveGuard,
}

#[derive(Debug, Default)]
struct CountingBackend {
    counters: Rc<Counters>,
}

impl CountingBackend {
    fn track(&self, inner: StateVector) -> Tracked {
        Tracked {
            inner,
            _guard: LiveGuard::new(&self.counters),
        }
    }
}

impl BranchBackend for CountingBackend {
    type State = Tracked;

    fn prepare_state(
        &self,
        entry: &SegmentEntry,
        num_qubits: usize,
    ) -> qbranch_sim::Result<Tracked> {
        Ok(self.track(StateVectorBackend.prepare_state(entry, num_qubits)?))
    }

    fn apply_operator(
        &self,
        operator: &KrausOperator,
        qubits: &[QubitId],
        state: &Tracked,
    ) -> qbranch_sim::Result<Tracked> {
        Ok(self.track(StateVectorBackend.apply_operator(operator, qubits, &state.inner)?))
    }

    fn squared_norm(&self, state: &Tracked) -> f64 {
        state.inner.squared_norm()
    }

    fn rescale(&self, state: &mut Tracked, factor: f64) {
        state.inner.scale(factor);
    }

    fn simulate(
        &self,
        segment: &Segment,
        state: Tracked,
        ctx: &mut ExecutionContext,
    ) -> qbranch_sim::Result<(Tracked, bool)> {
        self.counters.simulated.set(self.counters.simulated.get() + 1);
        if !state.inner.is_normalized(1e-9) {
            self.counters
                .unnormalized_inputs
                .set(self.counters.unnormalized_inputs.get() + 1);
        }
        let Tracked { inner, _guard } = state;
        let (inner, batched) = StateVectorBackend.simulate(segment, inner, ctx)?;
        Ok((Tracked { inner, _guard }, batched))
    }

    fn evaluate_measurements(
        &self,
        segment: &Segment,
        state: &Tracked,
        is_batched: bool,
        ctx: &mut ExecutionContext,
    ) -> qbranch_sim::Result<ResultTuple> {
        StateVectorBackend.evaluate_measurements(segment, &state.inner, is_batched, ctx)
    }
}

fn c(re: f64) -> Complex64 {
    Complex64::new(re, 0.0)
}

/// k equally weighted unitary branches: √(1/k) I, √(1/k) X, √(1/k) Z
fn uniform_channel(k: usize) -> KrausChannel {
    let unitaries = [
        [[c(1.0), c(0.0)], [c(0.0), c(1.0)]],
        [[c(0.0), c(1.0)], [c(1.0), c(0.0)]],
        [[c(1.0), c(0.0)], [c(0.0), c(-1.0)]],
    ];
    let scale = (1.0 / k as f64).sqrt();
    let operators = unitaries[..k]
        .iter()
        .map(|u| KrausOperator::single_qubit(*u).scaled(scale))
        .collect();
    KrausChannel::new(operators).unwrap()
}

/// Projective Z measurement expressed as a channel
fn projective_channel() -> KrausChannel {
    KrausChannel::new(vec![KrausOperator::projector(0), KrausOperator::projector(1)]).unwrap()
}

fn z0() -> MeasurementProcess {
    MeasurementProcess::Expval(PauliObservable::z(QubitId::new(0)))
}

proptest! {
    #[test]
    fn live_states_bounded_by_depth(n in 1usize..=4, k in 1usize..=3) {
        let q0 = QubitId::new(0);
        let mut circuit = Circuit::new(1);
        circuit.add_gate(Arc::new(Hadamard), &[q0]).unwrap();
        for _ in 0..n {
            circuit.add_channel(Arc::new(uniform_channel(k)), &[q0]).unwrap();
        }
        circuit.measure(z0()).unwrap();

        let backend = CountingBackend::default();
        let counters = Rc::clone(&backend.counters);
        let simulator = TreeSimulator::with_backend(TreeConfig::debug(), backend).unwrap();
        let result = simulator.run(&circuit).unwrap();

        prop_assert!(counters.peak.get() <= n + 1, "peak {} for depth {}", counters.peak.get(), n);
        prop_assert_eq!(counters.live.get(), 0);

        let leaves = k.pow(n as u32);
        let expected_segments: usize = (0..=n).map(|d| k.pow(d as u32)).sum();
        prop_assert_eq!(counters.simulated.get(), expected_segments);

        let stats = result.statistics.unwrap();
        prop_assert_eq!(stats.leaves_evaluated, leaves);
        prop_assert!(stats.peak_live_states <= n + 1);
    }

    #[test]
    fn pruned_branches_never_simulated(n in 1usize..=5) {
        let q0 = QubitId::new(0);
        let mut circuit = Circuit::new(1);
        for _ in 0..n {
            circuit.add_channel(Arc::new(projective_channel()), &[q0]).unwrap();
        }
        circuit.measure(z0()).unwrap();

        let backend = CountingBackend::default();
        let counters = Rc::clone(&backend.counters);
        let simulator = TreeSimulator::with_backend(TreeConfig::debug(), backend).unwrap();
        let result = simulator.run(&circuit).unwrap();

        // |0⟩ never leaves outcome 0: one path survives
        prop_assert_eq!(counters.simulated.get(), n + 1);
        prop_assert_eq!(counters.unnormalized_inputs.get(), 0);

        let stats = result.statistics.as_ref().unwrap();
        prop_assert_eq!(stats.branches_pruned, n);
        prop_assert_eq!(stats.leaves_evaluated, 1);
        prop_assert!((result.scalar(0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_node_probabilities_sum_to_one(
        weights in prop::collection::vec(0.0f64..1.0, 1..=3),
        theta in 0.0f64..std::f64::consts::TAU,
    ) {
        let total: f64 = weights.iter().sum();
        prop_assume!(total > 1e-6);

        let unitaries = [
            [[c(1.0), c(0.0)], [c(0.0), c(1.0)]],
            [[c(0.0), c(1.0)], [c(1.0), c(0.0)]],
            [[c(0.0), Complex64::new(0.0, -1.0)], [Complex64::new(0.0, 1.0), c(0.0)]],
        ];
        let operators = weights
            .iter()
            .zip(unitaries.iter())
            .map(|(w, u)| KrausOperator::single_qubit(*u).scaled((w / total).sqrt()))
            .collect();

        let q0 = QubitId::new(0);
        let mut circuit = Circuit::new(1);
        circuit
            .add_gate(Arc::new(RotationY::new(theta)), &[q0])
            .unwrap();
        circuit
            .add_channel(Arc::new(KrausChannel::new(operators).unwrap()), &[q0])
            .unwrap();
        // every normalized leaf has ⟨I⟩ = 1, so the combined value is Σ pᵢ
        circuit
            .measure(MeasurementProcess::Expval(PauliObservable::new(1.0, &[]).unwrap()))
            .unwrap();

        let values = qbranch_sim::tree_simulate(&circuit, &TreeConfig::default()).unwrap();
        prop_assert!((values[0].as_scalar().unwrap() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn rejected_postselection_is_not_simulated() {
    let q0 = QubitId::new(0);
    let mut circuit = Circuit::new(1);
    circuit.add_gate(Arc::new(Hadamard), &[q0]).unwrap();
    circuit
        .add_mid_measure(MidMeasure::on(q0).with_postselect(0))
        .unwrap();
    circuit.measure(z0()).unwrap();

    let backend = CountingBackend::default();
    let counters = Rc::clone(&backend.counters);
    let simulator = TreeSimulator::with_backend(TreeConfig::default(), backend).unwrap();
    let result = simulator.run(&circuit).unwrap();

    // root segment plus the accepted outcome
    assert_eq!(counters.simulated.get(), 2);
    assert_eq!(counters.live.get(), 0);
    assert!((result.scalar(0).unwrap() - 1.0).abs() < 1e-12);
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fault {
    Apply,
    NanNorm,
    /// Round-off on an empty branch reports a tiny negative norm
    NegativeNorm,
}

#[derive(Debug)]
struct FaultyBackend(Fault);

impl BranchBackend for FaultyBackend {
    type State = StateVector;

    fn prepare_state(&self, entry: &SegmentEntry, n: usize) -> qbranch_sim::Result<StateVector> {
        StateVectorBackend.prepare_state(entry, n)
    }

    fn apply_operator(
        &self,
        operator: &KrausOperator,
        qubits: &[QubitId],
        state: &StateVector,
    ) -> qbranch_sim::Result<StateVector> {
        if self.0 == Fault::Apply {
            return Err(StateError::InvalidDimension { dimension: 3 }.into());
        }
        StateVectorBackend.apply_operator(operator, qubits, state)
    }

    fn squared_norm(&self, state: &StateVector) -> f64 {
        let p = state.squared_norm();
        match self.0 {
            Fault::NanNorm => f64::NAN,
            Fault::NegativeNorm if p < 1e-10 => -1e-14,
            _ => p,
        }
    }

    fn rescale(&self, state: &mut StateVector, factor: f64) {
        state.scale(factor);
    }

    fn simulate(
        &self,
        segment: &Segment,
        state: StateVector,
        ctx: &mut ExecutionContext,
    ) -> qbranch_sim::Result<(StateVector, bool)> {
        StateVectorBackend.simulate(segment, state, ctx)
    }

    fn evaluate_measurements(
        &self,
        segment: &Segment,
        state: &StateVector,
        is_batched: bool,
        ctx: &mut ExecutionContext,
    ) -> qbranch_sim::Result<ResultTuple> {
        StateVectorBackend.evaluate_measurements(segment, state, is_batched, ctx)
    }
}

fn single_channel_circuit() -> Circuit {
    let q0 = QubitId::new(0);
    let mut circuit = Circuit::new(1);
    circuit.add_gate(Arc::new(Hadamard), &[q0]).unwrap();
    circuit.add_channel(Arc::new(projective_channel()), &[q0]).unwrap();
    circuit.measure(z0()).unwrap();
    circuit
}

#[test]
fn backend_errors_abort_traversal() {
    let simulator =
        TreeSimulator::with_backend(TreeConfig::default(), FaultyBackend(Fault::Apply)).unwrap();
    let err = simulator.run(&single_channel_circuit()).unwrap_err();
    assert_eq!(
        err,
        SimulatorError::State(StateError::InvalidDimension { dimension: 3 })
    );
}

#[test]
fn nan_probabilities_are_pruned() {
    let simulator =
        TreeSimulator::with_backend(TreeConfig::default(), FaultyBackend(Fault::NanNorm))
            .unwrap();
    let err = simulator.run(&single_channel_circuit()).unwrap_err();
    assert_eq!(err, SimulatorError::AllBranchesPruned);
}

#[test]
fn negative_probabilities_are_pruned_as_degenerate() {
    let q0 = QubitId::new(0);
    let mut circuit = Circuit::new(1);
    circuit.add_mid_measure(MidMeasure::on(q0)).unwrap();
    circuit.measure(z0()).unwrap();

    let config = TreeConfig::default().with_statistics(true);
    let simulator =
        TreeSimulator::with_backend(config, FaultyBackend(Fault::NegativeNorm)).unwrap();
    let result = simulator.run(&circuit).unwrap();
    assert!((result.scalar(0).unwrap() - 1.0).abs() < 1e-12);

    let stats = result.statistics.unwrap();
    assert_eq!(stats.branches_pruned, 1);
    assert_eq!(stats.degenerate_probabilities, 1);
    assert_eq!(stats.leaves_evaluated, 1);
}

/// RY(2e-6) then a measurement: outcome 1 has probability sin²(1e-6) ≈ 1e-12
fn faint_branch_circuit() -> Circuit {
    let q0 = QubitId::new(0);
    let mut circuit = Circuit::new(1);
    circuit
        .add_gate(Arc::new(RotationY::new(2e-6)), &[q0])
        .unwrap();
    circuit.add_mid_measure(MidMeasure::on(q0)).unwrap();
    circuit.measure(z0()).unwrap();
    circuit
}

#[test]
fn faint_branch_below_tolerance_is_never_simulated() {
    let backend = CountingBackend::default();
    let counters = Rc::clone(&backend.counters);
    let config = TreeConfig::default().with_statistics(true);
    let simulator = TreeSimulator::with_backend(config, backend).unwrap();
    let result = simulator.run(&faint_branch_circuit()).unwrap();

    // root segment plus outcome 0
    assert_eq!(counters.simulated.get(), 2);
    let stats = result.statistics.unwrap();
    assert_eq!(stats.branches_pruned, 1);
    assert_eq!(stats.degenerate_probabilities, 0);
    assert_eq!(stats.leaves_evaluated, 1);
}

#[test]
fn faint_branch_survives_zero_tolerance() {
    let backend = CountingBackend::default();
    let counters = Rc::clone(&backend.counters);
    let config = TreeConfig::default()
        .with_norm_tolerance(0.0)
        .with_statistics(true);
    let simulator = TreeSimulator::with_backend(config, backend).unwrap();
    let result = simulator.run(&faint_branch_circuit()).unwrap();

    assert_eq!(counters.simulated.get(), 3);
    assert_eq!(counters.unnormalized_inputs.get(), 0);
    let stats = result.statistics.as_ref().unwrap();
    assert_eq!(stats.branches_pruned, 0);
    assert_eq!(stats.leaves_evaluated, 2);

    // cos(2e-6) = P(0) - P(1)
    let expected = (2e-6f64).cos();
    assert!((result.scalar(0).unwrap() - expected).abs() < 1e-12);
}
