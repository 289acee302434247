//! Per-depth storage for the traversal
//!
//! Slot `d` holds the state entering segment `d`, the probabilities of the
//! outcomes of node `d`, and one result slot per outcome. Depth 0 is the root
//! with a single outcome of probability `1.0`.

use crate::result::ResultTuple;

/// Result slot of one outcome
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BranchSlot {
    /// Not explored yet
    #[default]
    Unset,
    /// Pruned, or every branch below it was pruned
    Pruned,
    Filled(ResultTuple),
}

impl BranchSlot {
    #[inline]
    pub fn is_set(&self) -> bool {
        !matches!(self, BranchSlot::Unset)
    }
}

/// Explicit DFS stack indexed by depth `0..=n`
#[derive(Debug)]
pub struct TraversalStack<S> {
    outcome_counts: Vec<usize>,
    states: Vec<Option<S>>,
    probs: Vec<Option<Vec<Option<f64>>>>,
    results: Vec<Vec<BranchSlot>>,
}

impl<S> TraversalStack<S> {
    /// Stack for nodes with the given outcome counts; `outcome_counts[0]` is the root
    pub fn new(outcome_counts: Vec<usize>) -> Self {
        let depth_slots = outcome_counts.len();
        let results = outcome_counts
            .iter()
            .map(|&k| vec![BranchSlot::Unset; k])
            .collect();
        let mut probs = vec![None; depth_slots];
        if let Some(root) = probs.first_mut() {
            *root = Some(vec![Some(1.0)]);
        }

        Self {
            outcome_counts,
            states: (0..depth_slots).map(|_| None).collect(),
            probs,
            results,
        }
    }

    /// Number of depth slots, `n + 1`
    pub fn len(&self) -> usize {
        self.outcome_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcome_counts.is_empty()
    }

    #[inline]
    pub fn outcome_count(&self, depth: usize) -> usize {
        self.outcome_counts[depth]
    }

    /// Whether some outcome at `depth` is still unexplored
    pub fn any_unset(&self, depth: usize) -> bool {
        self.results[depth].iter().any(|slot| !slot.is_set())
    }

    /// Whether every outcome at `depth` is filled or pruned
    pub fn all_set(&self, depth: usize) -> bool {
        self.results[depth].iter().all(BranchSlot::is_set)
    }

    /// Clear results, probabilities and the stored state at `depth`
    pub fn reset(&mut self, depth: usize) {
        self.results[depth].fill(BranchSlot::Unset);
        self.probs[depth] = None;
        self.states[depth] = None;
    }

    pub fn state(&self, depth: usize) -> Option<&S> {
        self.states[depth].as_ref()
    }

    /// Store the entry state of `depth`, dropping any previous one
    pub fn set_state(&mut self, depth: usize, state: S) {
        self.states[depth] = Some(state);
    }

    pub fn take_state(&mut self, depth: usize) -> Option<S> {
        self.states[depth].take()
    }

    /// Allocate the probability list of `depth` if it is not there yet
    pub fn ensure_probs(&mut self, depth: usize) {
        let k = self.outcome_counts[depth];
        self.probs[depth].get_or_insert_with(|| vec![None; k]);
    }

    pub fn set_prob(&mut self, depth: usize, outcome: usize, probability: f64) {
        let k = self.outcome_counts[depth];
        self.probs[depth].get_or_insert_with(|| vec![None; k])[outcome] = Some(probability);
    }

    /// Probabilities at `depth`; empty while unallocated
    pub fn probs(&self, depth: usize) -> &[Option<f64>] {
        self.probs[depth].as_deref().unwrap_or_default()
    }

    pub fn results(&self, depth: usize) -> &[BranchSlot] {
        &self.results[depth]
    }

    pub fn set_result(&mut self, depth: usize, outcome: usize, slot: BranchSlot) {
        self.results[depth][outcome] = slot;
    }

    /// Number of stored states
    pub fn live_states(&self) -> usize {
        self.states.iter().filter(|s| s.is_some()).count()
    }
}
