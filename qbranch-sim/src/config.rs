//! Simulator configuration

use crate::error::{Result, SimulatorError};
use serde::{Deserialize, Serialize};

/// Configuration for the tree-traversal simulator
///
/// Every field has a default, so a partial JSON document deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Random number generator seed for reproducibility
    ///
    /// Only sampled measurements (`sample`, `counts`) draw random numbers.
    /// If None, the generator is seeded from entropy.
    ///
    /// Default: None
    pub seed: Option<u64>,

    /// Branch probabilities below this value are treated as zero
    ///
    /// A pruned branch is never simulated.
    ///
    /// Default: 1e-10
    pub norm_tolerance: f64,

    /// Number of shots for sampled measurements
    ///
    /// Default: None (analytic measurements only)
    pub shots: Option<usize>,

    /// Enable traversal statistics collection
    ///
    /// Default: false
    pub collect_statistics: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            norm_tolerance: Self::DEFAULT_NORM_TOLERANCE,
            shots: None,
            collect_statistics: false,
        }
    }
}

impl TreeConfig {
    /// Default for [`norm_tolerance`](TreeConfig::norm_tolerance)
    pub const DEFAULT_NORM_TOLERANCE: f64 = 1e-10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for debugging
    ///
    /// - Deterministic seed
    /// - Statistics collection
    pub fn debug() -> Self {
        Self {
            seed: Some(42),
            collect_statistics: true,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_norm_tolerance(mut self, tolerance: f64) -> Self {
        self.norm_tolerance = tolerance;
        self
    }

    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = Some(shots);
        self
    }

    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.collect_statistics = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.norm_tolerance.is_finite() || !(0.0..1.0).contains(&self.norm_tolerance) {
            return Err(SimulatorError::InvalidConfig(format!(
                "norm_tolerance must be in [0, 1), got {}",
                self.norm_tolerance
            )));
        }

        if self.shots == Some(0) {
            return Err(SimulatorError::InvalidConfig("shots must be > 0".to_string()));
        }

        Ok(())
    }
}
