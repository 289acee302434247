//! Quantum state representation for qbranch
//!
//! This crate provides the dense [`StateVector`] used by the built-in
//! collaborator of the tree-traversal simulator, the matrix [`kernels`] that
//! act on it, and evaluation of terminal measurements into
//! [`MeasurementValue`]s.
//!
//! # Example
//!
//! ```
//! use qbranch_core::{PauliObservable, QubitId};
//! use qbranch_core::standard::Hadamard;
//! use qbranch_core::GateOp;
//! use qbranch_state::StateVector;
//! use std::sync::Arc;
//!
//! let mut state = StateVector::new(1).unwrap();
//! state.apply_gate(&GateOp::new(Arc::new(Hadamard), &[QubitId::new(0)]).unwrap()).unwrap();
//!
//! let x = state.expectation(&PauliObservable::x(QubitId::new(0))).unwrap();
//! assert!((x - 1.0).abs() < 1e-12);
//! ```

pub mod error;
pub mod kernels;
pub mod measurement;
pub mod state_vector;

pub use error::{Result, StateError};
pub use measurement::{evaluate, MeasurementValue};
pub use state_vector::StateVector;
