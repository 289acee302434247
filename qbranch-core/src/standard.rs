//! Standard gates with fixed or rotation-angle matrices

use crate::gate::Gate;
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;

macro_rules! fixed_gate {
    ($(#[$doc:meta])* $name:ident, $label:expr, $qubits:expr, $hermitian:expr, $matrix:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Gate for $name {
            fn name(&self) -> &str {
                $label
            }

            fn num_qubits(&self) -> usize {
                $qubits
            }

            fn is_hermitian(&self) -> bool {
                $hermitian
            }

            fn matrix(&self) -> Option<Vec<Complex64>> {
                Some($matrix)
            }
        }
    };
}

fixed_gate!(
    /// Hadamard: H|0⟩ = |+⟩
    Hadamard,
    "H",
    1,
    true,
    vec![
        Complex64::new(FRAC_1_SQRT_2, 0.0),
        Complex64::new(FRAC_1_SQRT_2, 0.0),
        Complex64::new(FRAC_1_SQRT_2, 0.0),
        Complex64::new(-FRAC_1_SQRT_2, 0.0),
    ]
);

fixed_gate!(
    /// Pauli-X (bit flip)
    PauliX,
    "X",
    1,
    true,
    vec![ZERO, ONE, ONE, ZERO]
);

fixed_gate!(
    /// Pauli-Y
    PauliY,
    "Y",
    1,
    true,
    vec![ZERO, -I, I, ZERO]
);

fixed_gate!(
    /// Pauli-Z (phase flip)
    PauliZ,
    "Z",
    1,
    true,
    vec![ONE, ZERO, ZERO, -ONE]
);

fixed_gate!(
    /// Phase gate S = diag(1, i)
    SGate,
    "S",
    1,
    false,
    vec![ONE, ZERO, ZERO, I]
);

fixed_gate!(
    /// Controlled-NOT, control is the first qubit
    CNot,
    "CNOT",
    2,
    true,
    vec![
        ONE, ZERO, ZERO, ZERO, //
        ZERO, ONE, ZERO, ZERO, //
        ZERO, ZERO, ZERO, ONE, //
        ZERO, ZERO, ONE, ZERO,
    ]
);

fixed_gate!(
    /// Controlled-Z
    CZ,
    "CZ",
    2,
    true,
    vec![
        ONE, ZERO, ZERO, ZERO, //
        ZERO, ONE, ZERO, ZERO, //
        ZERO, ZERO, ONE, ZERO, //
        ZERO, ZERO, ZERO, -ONE,
    ]
);

/// Rotation about the X axis: RX(θ) = exp(-iθX/2)
#[derive(Debug, Clone, Copy)]
pub struct RotationX {
    pub theta: f64,
}

/// Rotation about the Y axis: RY(θ) = exp(-iθY/2)
#[derive(Debug, Clone, Copy)]
pub struct RotationY {
    pub theta: f64,
}

/// Rotation about the Z axis: RZ(θ) = exp(-iθZ/2)
#[derive(Debug, Clone, Copy)]
pub struct RotationZ {
    pub theta: f64,
}

impl RotationX {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }
}

impl RotationY {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }
}

impl RotationZ {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }
}

impl Gate for RotationX {
    fn name(&self) -> &str {
        "RX"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        let (s, c) = (self.theta / 2.0).sin_cos();
        Some(vec![
            Complex64::new(c, 0.0),
            Complex64::new(0.0, -s),
            Complex64::new(0.0, -s),
            Complex64::new(c, 0.0),
        ])
    }
}

impl Gate for RotationY {
    fn name(&self) -> &str {
        "RY"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        let (s, c) = (self.theta / 2.0).sin_cos();
        Some(vec![
            Complex64::new(c, 0.0),
            Complex64::new(-s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(c, 0.0),
        ])
    }
}

impl Gate for RotationZ {
    fn name(&self) -> &str {
        "RZ"
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        let half = self.theta / 2.0;
        Some(vec![
            Complex64::from_polar(1.0, -half),
            ZERO,
            ZERO,
            Complex64::from_polar(1.0, half),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn is_unitary(m: &[Complex64]) -> bool {
        let dim = (m.len() as f64).sqrt() as usize;
        (0..dim).all(|i| {
            (0..dim).all(|j| {
                let dot: Complex64 = (0..dim).map(|k| m[k * dim + i].conj() * m[k * dim + j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                (dot - Complex64::new(expected, 0.0)).norm() < 1e-12
            })
        })
    }

    #[test]
    fn test_standard_gates_are_unitary() {
        let gates: Vec<Box<dyn Gate>> = vec![
            Box::new(Hadamard),
            Box::new(PauliX),
            Box::new(PauliY),
            Box::new(PauliZ),
            Box::new(SGate),
            Box::new(CNot),
            Box::new(CZ),
            Box::new(RotationX::new(0.3)),
            Box::new(RotationY::new(1.1)),
            Box::new(RotationZ::new(-2.0)),
        ];
        for gate in gates {
            let m = gate.matrix().unwrap();
            assert_eq!(m.len(), 1 << (2 * gate.num_qubits()));
            assert!(is_unitary(&m), "{} is not unitary", gate.name());
        }
    }

    #[test]
    fn test_ry_pi_maps_zero_to_one() {
        let m = RotationY::new(std::f64::consts::PI).matrix().unwrap();
        // column 0 is RY(π)|0⟩
        assert_relative_eq!(m[0].norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(m[2].norm(), 1.0, epsilon = 1e-12);
    }
}
