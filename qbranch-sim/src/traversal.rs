//! Traversal driver
//!
//! Iterative depth-first walk over the outcome tree of a [`SplitCircuit`].
//! Descent happens in pre-order, combination in post-order once every outcome
//! of a level is filled or pruned:
//!
//! ```text
//! depth 0   root ──simulate seg 0──┐
//! depth 1        node 1: k₁ outcomes ──collapse, simulate seg 1──┐
//! ...                                                             ...
//! depth n        node n: kₙ outcomes ──collapse, simulate seg n, evaluate
//! ```
//!
//! Each depth stores at most one state, so the number of live buffers is
//! bounded by `n + 1` however many leaves the tree has.

use crate::backend::{BranchBackend, ExecutionContext};
use crate::collapse::{collapse, Collapsed, PruneReason};
use crate::combine::combine;
use crate::error::{Result, SimulatorError};
use crate::result::ResultTuple;
use crate::segment::{Segment, SplitCircuit};
use crate::stack::{BranchSlot, TraversalStack};
use crate::statistics::TraversalStatistics;
use tracing::{debug, trace};

/// One traversal of a split circuit
pub struct Traversal<'a, B: BranchBackend> {
    backend: &'a B,
    split: &'a SplitCircuit,
    ctx: &'a mut ExecutionContext,
    tolerance: f64,
    stack: TraversalStack<B::State>,
    /// Active outcome per depth; only `0..=depth` is meaningful
    branch: Vec<usize>,
    stats: TraversalStatistics,
}

impl<'a, B: BranchBackend> Traversal<'a, B> {
    /// Prepare the root state of `split`
    ///
    /// # Errors
    /// Returns a structural error if the split has no segments, and
    /// propagates backend errors from preparing the entry state.
    pub fn new(
        backend: &'a B,
        split: &'a SplitCircuit,
        ctx: &'a mut ExecutionContext,
        tolerance: f64,
    ) -> Result<Self> {
        let entry = split
            .segment(0)
            .map(Segment::entry)
            .ok_or_else(|| SimulatorError::structural("Split circuit has no segments"))?;
        let initial = backend.prepare_state(entry, split.num_qubits())?;

        let mut stack = TraversalStack::new(split.outcome_counts());
        stack.set_state(0, initial);

        let mut stats = TraversalStatistics::new();
        stats.max_depth = split.depth();
        stats.observe_live_states(stack.live_states());

        Ok(Self {
            backend,
            split,
            ctx,
            tolerance,
            stack,
            branch: vec![0; split.depth() + 1],
            stats,
        })
    }

    /// Walk the whole tree and return the combined root result
    ///
    /// # Errors
    /// Returns [`SimulatorError::AllBranchesPruned`] if no leaf survives, and
    /// aborts on the first backend or combination error.
    pub fn run(mut self) -> Result<(ResultTuple, TraversalStatistics)> {
        let n = self.split.depth();
        let measurements = self.split.measurements();
        let mut depth = 0;

        debug!(
            nodes = n,
            segments = self.split.segments().len(),
            "Starting tree traversal"
        );

        loop {
            if self.stack.all_set(depth) {
                let combined = combine(
                    measurements,
                    self.stack.probs(depth),
                    self.stack.results(depth),
                )?;
                self.stack.reset(depth);
                self.stats.combinations += 1;
                trace!(depth, pruned = combined.is_none(), "Combined level");

                if depth == 0 {
                    let values = combined.ok_or(SimulatorError::AllBranchesPruned)?;
                    return Ok((values, self.stats));
                }

                depth -= 1;
                let slot = match combined {
                    Some(values) => BranchSlot::Filled(values),
                    None => BranchSlot::Pruned,
                };
                self.stack.set_result(depth, self.branch[depth], slot);
                self.advance(depth);
                continue;
            }

            let outcome = self.branch[depth];
            let current = if depth == 0 {
                self.stack
                    .take_state(0)
                    .ok_or_else(|| SimulatorError::structural("Root state already consumed"))?
            } else {
                let node = self.split.node(depth).ok_or_else(|| {
                    SimulatorError::Structural(format!("No branch node at depth {}", depth))
                })?;
                let parent = self.stack.state(depth).ok_or_else(|| {
                    SimulatorError::Structural(format!("No parent state at depth {}", depth))
                })?;

                match collapse(self.backend, parent, node, outcome, self.tolerance)? {
                    Collapsed::Pruned(reason) => {
                        trace!(depth, outcome, ?reason, "Pruned branch");
                        self.stats.branches_pruned += 1;
                        if reason == PruneReason::Degenerate {
                            self.stats.degenerate_probabilities += 1;
                        }
                        self.stack.set_result(depth, outcome, BranchSlot::Pruned);
                        self.advance(depth);
                        continue;
                    }
                    Collapsed::Branch { state, probability } => {
                        self.stack.set_prob(depth, outcome, probability);
                        state
                    }
                }
            };
            self.stats.observe_live_states(self.stack.live_states() + 1);

            let split = self.split;
            let branch = &self.branch;
            self.ctx.set_mid_measurements(
                (1..=depth).filter_map(|d| split.node(d)?.classical_value(branch[d])),
            );

            let segment = split.segment(depth).ok_or_else(|| {
                SimulatorError::Structural(format!("No segment at depth {}", depth))
            })?;
            let (state, batched) = self.backend.simulate(segment, current, self.ctx)?;
            self.stats.segments_simulated += 1;

            if depth == n {
                let values = self
                    .backend
                    .evaluate_measurements(segment, &state, batched, self.ctx)?;
                self.stats.leaves_evaluated += 1;
                trace!(path = ?&self.branch[1..], "Evaluated leaf");
                self.stack.set_result(depth, outcome, BranchSlot::Filled(values));
                self.advance(depth);
                continue;
            }

            depth += 1;
            trace!(depth, "Descend");
            self.stack.ensure_probs(depth);
            self.stack.set_state(depth, state);
        }
    }

    fn advance(&mut self, depth: usize) {
        self.branch[depth] = (self.branch[depth] + 1) % self.stack.outcome_count(depth);
    }
}
