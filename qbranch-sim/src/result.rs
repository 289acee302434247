//! Simulation results

use crate::statistics::TraversalStatistics;
use qbranch_state::MeasurementValue;

/// One value per terminal measurement, in circuit order
pub type ResultTuple = Vec<MeasurementValue>;

/// Result of a tree-traversal simulation
#[derive(Debug, Clone, PartialEq)]
pub struct TreeResult {
    /// Combined terminal measurement values
    pub values: ResultTuple,

    /// Traversal statistics (if enabled)
    pub statistics: Option<TraversalStatistics>,
}

impl TreeResult {
    pub fn new(values: ResultTuple) -> Self {
        Self {
            values,
            statistics: None,
        }
    }

    pub fn with_statistics(mut self, stats: TraversalStatistics) -> Self {
        self.statistics = Some(stats);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scalar value of measurement `index`, if it is one
    pub fn scalar(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(MeasurementValue::as_scalar)
    }

    /// Probability vector of measurement `index`, if it is one
    pub fn vector(&self, index: usize) -> Option<&[f64]> {
        self.values.get(index).and_then(MeasurementValue::as_vector)
    }

    pub fn into_values(self) -> ResultTuple {
        self.values
    }
}
