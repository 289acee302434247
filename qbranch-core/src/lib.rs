//! Core circuit model for qbranch
//!
//! This crate holds everything a circuit is made of, independent of how it is
//! simulated:
//! - [`QubitId`]: Type-safe qubit addressing
//! - [`Gate`]: Trait for unitary operations, with [`standard`] gates
//! - [`noise`]: Kraus-decomposed noise channels
//! - [`MidMeasure`]: Mid-circuit measurements with optional post-selection
//! - [`MeasurementProcess`]: Terminal measurements (expval, var, probs, sample, counts)
//! - [`Circuit`]: Ordered operation list plus terminal measurements
//!
//! # Example
//! ```
//! use qbranch_core::{Circuit, MeasurementProcess, PauliObservable, QubitId};
//! use qbranch_core::noise::AmplitudeDamping;
//! use qbranch_core::standard::Hadamard;
//! use std::sync::Arc;
//!
//! let q0 = QubitId::new(0);
//! let mut circuit = Circuit::new(1);
//! circuit.add_gate(Arc::new(Hadamard), &[q0]).unwrap();
//! circuit.add_channel(Arc::new(AmplitudeDamping::new(0.3).unwrap()), &[q0]).unwrap();
//! circuit.measure(MeasurementProcess::Expval(PauliObservable::z(q0))).unwrap();
//!
//! assert_eq!(circuit.num_branching_operations(), 1);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod measurement;
pub mod noise;
pub mod observable;
pub mod qubit;
pub mod standard;

pub use circuit::{ChannelOp, Circuit, Operation, StatePrep};
pub use error::QuantumError;
pub use gate::{Gate, GateOp};
pub use measurement::{
    Condition, ConditionalOp, MeasureId, MeasurementKind, MeasurementProcess, MidMeasure,
};
pub use noise::{KrausOperator, NoiseChannel};
pub use num_complex::Complex64;
pub use observable::{Pauli, PauliObservable};
pub use qubit::QubitId;

/// Type alias for results in qbranch-core
pub type Result<T> = std::result::Result<T, QuantumError>;
