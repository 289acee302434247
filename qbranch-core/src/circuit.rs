//! Circuit representation
//!
//! A circuit is a flat list of [`Operation`]s followed by terminal
//! [`MeasurementProcess`]es. Channels and mid-circuit measurements are the
//! branching operations; everything else is simulated deterministically.

use crate::error::check_qubits;
use crate::gate::{Gate, GateOp};
use crate::measurement::{Condition, ConditionalOp, MeasureId, MeasurementProcess, MidMeasure};
use crate::noise::{KrausOperator, NoiseChannel};
use crate::{QuantumError, QubitId, Result};
use num_complex::Complex64;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Tolerance on ‖amplitudes‖ - 1 accepted by [`StatePrep::new`]
const PREP_NORM_TOLERANCE: f64 = 1e-8;

/// Widest register a preparation may be expanded to
pub const MAX_PREP_QUBITS: usize = 30;

/// Initial state over a list of qubits
///
/// `amplitudes[i]` belongs to the basis state whose bits, read with the first
/// listed qubit as most significant, spell `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatePrep {
    amplitudes: Vec<Complex64>,
    qubits: Vec<QubitId>,
}

impl StatePrep {
    /// # Errors
    /// Returns error if the amplitude count is not 2^len(qubits) or the vector is not normalized
    pub fn new(amplitudes: Vec<Complex64>, qubits: &[QubitId]) -> Result<Self> {
        let expected = 1usize << qubits.len();
        if amplitudes.len() != expected {
            return Err(QuantumError::ValidationError(format!(
                "State preparation on {} qubits needs {} amplitudes, got {}",
                qubits.len(),
                expected,
                amplitudes.len()
            )));
        }
        let norm = amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        if (norm - 1.0).abs() > PREP_NORM_TOLERANCE {
            return Err(QuantumError::ValidationError(format!(
                "State preparation must be normalized, norm = {}",
                norm
            )));
        }
        Ok(Self {
            amplitudes,
            qubits: qubits.to_vec(),
        })
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Whether the preparation covers every qubit of an `num_qubits` register
    pub fn is_full_width(&self, num_qubits: usize) -> bool {
        self.qubits.len() == num_qubits
    }

    /// Extend to qubits `0..num_qubits`, with |0⟩ on every qubit not covered
    ///
    /// The result is listed in ascending qubit order.
    ///
    /// # Errors
    /// Returns error if `num_qubits` exceeds [`MAX_PREP_QUBITS`] or does not
    /// cover every prepared qubit
    pub fn extend_to(&self, num_qubits: usize) -> Result<Self> {
        if num_qubits > MAX_PREP_QUBITS {
            return Err(QuantumError::ValidationError(format!(
                "Cannot expand a state preparation to {} qubits (limit {})",
                num_qubits, MAX_PREP_QUBITS
            )));
        }
        check_qubits(&self.qubits, num_qubits)?;

        let width = self.qubits.len();
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];

        for (local, amp) in self.amplitudes.iter().enumerate() {
            // global index: bit q set when qubit q is 1
            let mut global = 0usize;
            for (j, q) in self.qubits.iter().enumerate() {
                if (local >> (width - 1 - j)) & 1 == 1 {
                    global |= q.mask();
                }
            }
            // re-encode with qubit 0 as the most significant bit
            let mut index = 0usize;
            for q in 0..num_qubits {
                if global & (1 << q) != 0 {
                    index |= 1 << (num_qubits - 1 - q);
                }
            }
            amplitudes[index] = *amp;
        }

        Ok(Self {
            amplitudes,
            qubits: (0..num_qubits).map(QubitId::new).collect(),
        })
    }
}

/// A noise channel bound to the qubits it acts on
#[derive(Clone)]
pub struct ChannelOp {
    channel: Arc<dyn NoiseChannel>,
    qubits: SmallVec<[QubitId; 2]>,
}

impl ChannelOp {
    pub fn new(channel: Arc<dyn NoiseChannel>, qubits: &[QubitId]) -> Result<Self> {
        if qubits.len() != channel.num_qubits() {
            return Err(QuantumError::invalid_qubit_count(
                channel.name(),
                channel.num_qubits(),
                qubits.len(),
            ));
        }
        Ok(Self {
            channel,
            qubits: SmallVec::from_slice(qubits),
        })
    }

    pub fn channel(&self) -> &Arc<dyn NoiseChannel> {
        &self.channel
    }

    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    pub fn kraus_operators(&self) -> Vec<KrausOperator> {
        self.channel.kraus_operators()
    }
}

impl fmt::Debug for ChannelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.channel.name(), self.qubits.as_slice())
    }
}

/// One entry of a circuit's operation list
#[derive(Debug, Clone)]
pub enum Operation {
    /// Initial state; only valid as the first operation
    StatePrep(StatePrep),
    Gate(GateOp),
    /// Gate gated on a mid-circuit measurement value
    Conditional(ConditionalOp),
    /// Noise channel (branching)
    Channel(ChannelOp),
    /// Mid-circuit measurement (branching)
    MidMeasure(MidMeasure),
}

impl Operation {
    /// Whether this operation splits the circuit into outcome branches
    pub fn is_branching(&self) -> bool {
        matches!(self, Operation::Channel(_) | Operation::MidMeasure(_))
    }
}

/// A quantum circuit with terminal measurements
///
/// # Example
/// ```
/// use qbranch_core::{Circuit, MidMeasure, QubitId};
/// use qbranch_core::standard::{Hadamard, PauliX};
/// use std::sync::Arc;
///
/// let (q0, q1) = (QubitId::new(0), QubitId::new(1));
/// let mut circuit = Circuit::new(2);
/// circuit.add_gate(Arc::new(Hadamard), &[q0]).unwrap();
/// let m = circuit.add_mid_measure(MidMeasure::on(q0)).unwrap();
/// circuit.add_conditional(m, 1, Arc::new(PauliX), &[q1]).unwrap();
///
/// assert_eq!(circuit.len(), 3);
/// assert_eq!(circuit.num_branching_operations(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Circuit {
    num_qubits: usize,
    operations: Vec<Operation>,
    measurements: Vec<MeasurementProcess>,
    num_mid_measures: usize,
}

impl Circuit {
    /// Create an empty circuit
    ///
    /// # Panics
    /// Panics if `num_qubits` is 0
    pub fn new(num_qubits: usize) -> Self {
        assert!(num_qubits > 0, "Circuit must have at least one qubit");
        Self {
            num_qubits,
            operations: Vec::new(),
            measurements: Vec::new(),
            num_mid_measures: 0,
        }
    }

    #[inline]
    pub const fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn measurements(&self) -> &[MeasurementProcess] {
        &self.measurements
    }

    pub fn num_branching_operations(&self) -> usize {
        self.operations.iter().filter(|op| op.is_branching()).count()
    }

    /// Set the initial state
    ///
    /// # Errors
    /// Returns error if the circuit already has operations
    pub fn add_state_prep(&mut self, prep: StatePrep) -> Result<&mut Self> {
        if !self.operations.is_empty() {
            return Err(QuantumError::validation(
                "State preparation must be the first operation",
            ));
        }
        check_qubits(prep.qubits(), self.num_qubits)?;
        self.operations.push(Operation::StatePrep(prep));
        Ok(self)
    }

    pub fn add_gate(&mut self, gate: Arc<dyn Gate>, qubits: &[QubitId]) -> Result<&mut Self> {
        check_qubits(qubits, self.num_qubits)?;
        self.operations.push(Operation::Gate(GateOp::new(gate, qubits)?));
        Ok(self)
    }

    pub fn add_channel(
        &mut self,
        channel: Arc<dyn NoiseChannel>,
        qubits: &[QubitId],
    ) -> Result<&mut Self> {
        check_qubits(qubits, self.num_qubits)?;
        self.operations
            .push(Operation::Channel(ChannelOp::new(channel, qubits)?));
        Ok(self)
    }

    /// Append a mid-circuit measurement and return its id
    pub fn add_mid_measure(&mut self, mut measure: MidMeasure) -> Result<MeasureId> {
        check_qubits(&[measure.qubit()], self.num_qubits)?;
        if let Some(outcome) = measure.postselect() {
            if outcome > 1 {
                return Err(QuantumError::ValidationError(format!(
                    "Cannot post-select outcome {} of a qubit measurement",
                    outcome
                )));
            }
        }
        let id = MeasureId(self.num_mid_measures);
        measure.id = id;
        self.num_mid_measures += 1;
        self.operations.push(Operation::MidMeasure(measure));
        Ok(id)
    }

    /// Append a gate applied only when measurement `measure` read `value`
    ///
    /// # Errors
    /// Returns error if `measure` was not produced by an earlier mid-circuit measurement
    pub fn add_conditional(
        &mut self,
        measure: MeasureId,
        value: i64,
        gate: Arc<dyn Gate>,
        qubits: &[QubitId],
    ) -> Result<&mut Self> {
        if measure.0 >= self.num_mid_measures {
            return Err(QuantumError::ValidationError(format!(
                "Condition refers to unknown measurement {}",
                measure
            )));
        }
        check_qubits(qubits, self.num_qubits)?;
        self.operations.push(Operation::Conditional(ConditionalOp {
            condition: Condition { measure, value },
            op: GateOp::new(gate, qubits)?,
        }));
        Ok(self)
    }

    /// Append a terminal measurement
    pub fn measure(&mut self, measurement: MeasurementProcess) -> Result<&mut Self> {
        check_qubits(&measurement.qubits(), self.num_qubits)?;
        self.measurements.push(measurement);
        Ok(self)
    }
}
