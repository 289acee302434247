//! Traversal statistics tracking

use std::time::Duration;

/// Counters collected over one tree traversal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalStatistics {
    /// Total execution time
    pub total_time: Duration,

    /// Number of segments handed to the backend's `simulate`
    pub segments_simulated: usize,

    /// Number of leaves whose measurements were evaluated
    pub leaves_evaluated: usize,

    /// Number of branches pruned before simulation
    pub branches_pruned: usize,

    /// Pruned branches whose probability was NaN or negative
    pub degenerate_probabilities: usize,

    /// Number of levels combined into their parent
    pub combinations: usize,

    /// Largest number of states held by the traversal at once
    pub peak_live_states: usize,

    /// Number of branch nodes in the circuit
    pub max_depth: usize,
}

impl TraversalStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of visited branches that were pruned
    pub fn pruning_ratio(&self) -> f64 {
        let visited = self.leaves_evaluated + self.branches_pruned;
        if visited == 0 {
            0.0
        } else {
            self.branches_pruned as f64 / visited as f64
        }
    }

    /// Segments simulated per second
    pub fn segments_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.segments_simulated as f64 / secs
        }
    }

    pub(crate) fn observe_live_states(&mut self, live: usize) {
        self.peak_live_states = self.peak_live_states.max(live);
    }
}

impl std::fmt::Display for TraversalStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Traversal Statistics:")?;
        writeln!(f, "  Total time: {:?}", self.total_time)?;
        writeln!(f, "  Depth: {}", self.max_depth)?;
        writeln!(f, "  Segments simulated: {}", self.segments_simulated)?;
        writeln!(f, "  Leaves evaluated: {}", self.leaves_evaluated)?;
        writeln!(
            f,
            "  Branches pruned: {} ({:.1}%)",
            self.branches_pruned,
            self.pruning_ratio() * 100.0
        )?;
        writeln!(f, "  Degenerate probabilities: {}", self.degenerate_probabilities)?;
        writeln!(f, "  Combinations: {}", self.combinations)?;
        write!(f, "  Peak live states: {}", self.peak_live_states)
    }
}
