//! Tree-traversal simulation of branching quantum circuits
//!
//! Noise channels and mid-circuit measurements split a circuit's evolution
//! into outcome branches. This crate explores every combination of outcomes
//! exactly once with an iterative depth-first walk and combines the terminal
//! measurements with their path probabilities, while storing at most one
//! state per branch node.
//!
//! # Components
//!
//! - [`segment`]: splits a circuit into segments separated by branch nodes
//! - [`collapse`]: applies one outcome's operator and decides whether to prune
//! - [`stack`]: per-depth states, probabilities and result slots
//! - [`traversal`]: the DFS driver
//! - [`combine`]: probability-weighted combination of one level's results
//! - [`backend`]: the state operations the driver delegates
//!
//! # Example
//!
//! ```
//! use qbranch_core::noise::BitFlip;
//! use qbranch_core::standard::{Hadamard, PauliX};
//! use qbranch_core::{Circuit, MeasurementProcess, MidMeasure, QubitId};
//! use qbranch_sim::{tree_simulate, TreeConfig};
//! use std::sync::Arc;
//!
//! let (q0, q1) = (QubitId::new(0), QubitId::new(1));
//! let mut circuit = Circuit::new(2);
//! circuit.add_gate(Arc::new(Hadamard), &[q0]).unwrap();
//! let m = circuit.add_mid_measure(MidMeasure::on(q0)).unwrap();
//! circuit.add_conditional(m, 1, Arc::new(PauliX), &[q1]).unwrap();
//! circuit.add_channel(Arc::new(BitFlip::new(0.0).unwrap()), &[q1]).unwrap();
//! circuit.measure(MeasurementProcess::Probs(vec![q0, q1])).unwrap();
//!
//! let values = tree_simulate(&circuit, &TreeConfig::default()).unwrap();
//! let probs = values[0].as_vector().unwrap();
//! assert!((probs[0] - 0.5).abs() < 1e-12); // |00⟩
//! assert!((probs[3] - 0.5).abs() < 1e-12); // |11⟩
//! ```

pub mod backend;
pub mod collapse;
pub mod combine;
pub mod config;
pub mod error;
pub mod result;
pub mod segment;
pub mod simulator;
pub mod stack;
pub mod statistics;
pub mod traversal;

pub use backend::{BranchBackend, ExecutionContext, StateVectorBackend};
pub use config::TreeConfig;
pub use error::{Result, SimulatorError};
pub use result::{ResultTuple, TreeResult};
pub use segment::{
    split_circuit, BranchKind, BranchNode, Segment, SegmentEntry, Split, SplitCircuit,
};
pub use simulator::{tree_simulate, TreeSimulator};
pub use statistics::TraversalStatistics;
