//! Noise channels in Kraus form
//!
//! A channel is a branching operation: each Kraus operator `K_i` is one
//! outcome, taken with probability `‖K_i ψ‖²`. The tree-traversal simulator
//! explores every operator of every channel exactly once.
//!
//! - **Amplitude damping**: Energy relaxation (T1)
//! - **Phase damping**: Dephasing (T2)
//! - **Bit flip / phase flip**: Single Pauli errors
//! - **Depolarizing**: Uniform random Pauli errors
//! - **Custom**: Any completeness-satisfying operator set via [`KrausChannel`]

pub mod channels;
pub mod types;

pub use channels::{
    AmplitudeDamping, BitFlip, DepolarizingChannel, KrausChannel, PhaseDamping, PhaseFlip,
};
pub use types::{KrausOperator, NoiseChannel};
