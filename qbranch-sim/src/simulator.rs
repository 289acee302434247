//! Tree-traversal simulator entry points

use std::time::Instant;
use tracing::debug;

use crate::{
    backend::{BranchBackend, ExecutionContext, StateVectorBackend},
    combine::check_supported,
    config::TreeConfig,
    error::Result,
    result::{ResultTuple, TreeResult},
    segment::{split_circuit, Segment, Split},
    statistics::TraversalStatistics,
    traversal::Traversal,
};
use qbranch_core::Circuit;

/// Simulator for circuits with noise channels and mid-circuit measurements
///
/// Every combination of branch outcomes is explored exactly once and the
/// terminal measurements are combined with their path probabilities. Memory
/// is bounded by the number of branch nodes, not by the number of paths.
///
/// # Example
///
/// ```
/// use qbranch_core::noise::AmplitudeDamping;
/// use qbranch_core::standard::Hadamard;
/// use qbranch_core::{Circuit, MeasurementProcess, PauliObservable, QubitId};
/// use qbranch_sim::{TreeConfig, TreeSimulator};
/// use std::sync::Arc;
///
/// let q0 = QubitId::new(0);
/// let mut circuit = Circuit::new(1);
/// circuit.add_gate(Arc::new(Hadamard), &[q0]).unwrap();
/// circuit.add_channel(Arc::new(AmplitudeDamping::new(0.3).unwrap()), &[q0]).unwrap();
/// circuit.measure(MeasurementProcess::Expval(PauliObservable::z(q0))).unwrap();
///
/// let simulator = TreeSimulator::new(TreeConfig::default()).unwrap();
/// let result = simulator.run(&circuit).unwrap();
/// assert!((result.scalar(0).unwrap() - 0.3).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct TreeSimulator<B = StateVectorBackend> {
    config: TreeConfig,
    backend: B,
}

impl TreeSimulator {
    /// Create a simulator over the dense state-vector backend
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn new(config: TreeConfig) -> Result<Self> {
        Self::with_backend(config, StateVectorBackend)
    }
}

impl<B: BranchBackend> TreeSimulator<B> {
    /// Create a simulator over a custom backend
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn with_backend(config: TreeConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Simulate `circuit` and combine its terminal measurements
    ///
    /// A circuit without branching operations is simulated directly as a
    /// single segment; all measurement kinds are available there. Branching
    /// circuits support `expval` and `probs` only.
    ///
    /// # Errors
    /// - [`UnsupportedObservable`](crate::SimulatorError::UnsupportedObservable) for a
    ///   measurement the tree cannot combine
    /// - [`AllBranchesPruned`](crate::SimulatorError::AllBranchesPruned) if no path has
    ///   non-zero probability
    /// - [`Structural`](crate::SimulatorError::Structural) if the circuit cannot be split
    /// - backend errors, unchanged, including registers too wide for the backend
    pub fn run(&self, circuit: &Circuit) -> Result<TreeResult> {
        let start = Instant::now();
        let mut ctx = ExecutionContext::new(&self.config);

        let (values, mut stats) = match split_circuit(circuit)? {
            Split::Trivial(segment) => {
                debug!(
                    operations = segment.operations().len(),
                    "No branching operations; simulating a single segment"
                );
                self.run_segment(circuit, &segment, &mut ctx)?
            }
            Split::Tree(split) => {
                check_supported(split.measurements())?;
                Traversal::new(&self.backend, &split, &mut ctx, self.config.norm_tolerance)?
                    .run()?
            }
        };

        stats.total_time = start.elapsed();
        debug!(
            leaves = stats.leaves_evaluated,
            pruned = stats.branches_pruned,
            segments = stats.segments_simulated,
            peak_live_states = stats.peak_live_states,
            elapsed = ?stats.total_time,
            "Simulation finished"
        );

        let result = TreeResult::new(values);
        Ok(if self.config.collect_statistics {
            result.with_statistics(stats)
        } else {
            result
        })
    }

    fn run_segment(
        &self,
        circuit: &Circuit,
        segment: &Segment,
        ctx: &mut ExecutionContext,
    ) -> Result<(ResultTuple, TraversalStatistics)> {
        let state = self
            .backend
            .prepare_state(segment.entry(), circuit.num_qubits())?;
        let (state, batched) = self.backend.simulate(segment, state, ctx)?;
        let values = self
            .backend
            .evaluate_measurements(segment, &state, batched, ctx)?;

        let stats = TraversalStatistics {
            segments_simulated: 1,
            leaves_evaluated: 1,
            peak_live_states: 1,
            ..Default::default()
        };
        Ok((values, stats))
    }
}

/// Simulate `circuit` with the state-vector backend
///
/// # Errors
/// See [`TreeSimulator::run`]
pub fn tree_simulate(circuit: &Circuit, config: &TreeConfig) -> Result<ResultTuple> {
    Ok(TreeSimulator::new(config.clone())?.run(circuit)?.into_values())
}
