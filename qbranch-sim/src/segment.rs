//! Segment splitter
//!
//! Cuts a circuit's flat operation list at every branching operation. A
//! circuit with `n` branch nodes yields `n + 1` segments; segment `d` runs
//! after node `d` and only the last one carries the terminal measurements.
//!
//! ```text
//! ops:      H  X  [AD]  RZ  [M]  CX
//! segments: |0: H X | 1: RZ | 2: CX + measurements |
//! nodes:          ^1        ^2
//! ```

use crate::error::{Result, SimulatorError};
use qbranch_core::{
    Circuit, ConditionalOp, GateOp, KrausOperator, MeasureId, MeasurementProcess, Operation,
    QubitId, StatePrep,
};
use smallvec::SmallVec;

/// How a segment obtains its entry state
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentEntry {
    /// |0…0⟩ on every qubit, built by the backend; only segment 0
    Zero,
    /// Full-width preparation; only segment 0
    Prepared(StatePrep),
    /// The collapsed state handed down by the parent branch
    Inherited,
}

/// Non-branching operation inside a segment
#[derive(Debug, Clone)]
pub enum SegmentOp {
    Gate(GateOp),
    Conditional(ConditionalOp),
}

/// Run of non-branching operations simulated atomically
#[derive(Debug, Clone)]
pub struct Segment {
    index: usize,
    entry: SegmentEntry,
    operations: Vec<SegmentOp>,
    measurements: Vec<MeasurementProcess>,
}

impl Segment {
    /// Position in the segment list
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entry(&self) -> &SegmentEntry {
        &self.entry
    }

    /// The explicit preparation of segment 0, if the circuit has one
    pub fn prepared_entry(&self) -> Option<&StatePrep> {
        match &self.entry {
            SegmentEntry::Prepared(prep) => Some(prep),
            SegmentEntry::Zero | SegmentEntry::Inherited => None,
        }
    }

    pub fn operations(&self) -> &[SegmentOp] {
        &self.operations
    }

    /// Terminal measurements; empty for every segment except the last
    pub fn measurements(&self) -> &[MeasurementProcess] {
        &self.measurements
    }
}

/// What a branch node represents
#[derive(Debug, Clone, PartialEq)]
pub enum BranchKind {
    /// Kraus decomposition of a noise channel
    Channel { name: String },
    /// Computational-basis mid-circuit measurement
    Measurement {
        id: MeasureId,
        postselect: Option<usize>,
        value_offset: i64,
    },
}

/// One branching operation with its outcome-indexed collapse operators
#[derive(Debug, Clone)]
pub struct BranchNode {
    position: usize,
    qubits: SmallVec<[QubitId; 2]>,
    kind: BranchKind,
    operators: Vec<KrausOperator>,
}

impl BranchNode {
    /// Index of the operation in the original circuit
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    pub fn kind(&self) -> &BranchKind {
        &self.kind
    }

    /// Collapse operators, indexed by outcome
    pub fn operators(&self) -> &[KrausOperator] {
        &self.operators
    }

    #[inline]
    pub fn outcome_count(&self) -> usize {
        self.operators.len()
    }

    /// The post-selected outcome, if any
    pub fn forced_outcome(&self) -> Option<usize> {
        match self.kind {
            BranchKind::Measurement { postselect, .. } => postselect,
            BranchKind::Channel { .. } => None,
        }
    }

    /// Classical value registered by `outcome`; channels register nothing
    pub fn classical_value(&self, outcome: usize) -> Option<(MeasureId, i64)> {
        match self.kind {
            BranchKind::Measurement {
                id, value_offset, ..
            } => Some((id, outcome as i64 + value_offset)),
            BranchKind::Channel { .. } => None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.operators.is_empty() {
            return Err(SimulatorError::Structural(format!(
                "Branch node at operation {} declares no outcomes",
                self.position
            )));
        }
        for (i, op) in self.operators.iter().enumerate() {
            if op.num_qubits() != self.qubits.len() {
                return Err(SimulatorError::Structural(format!(
                    "Operator {} of branch node at operation {} acts on {} qubits, node has {}",
                    i,
                    self.position,
                    op.num_qubits(),
                    self.qubits.len()
                )));
            }
        }
        if let Some(forced) = self.forced_outcome() {
            if forced >= self.outcome_count() {
                return Err(SimulatorError::Structural(format!(
                    "Post-selected outcome {} out of range for {} outcomes",
                    forced,
                    self.outcome_count()
                )));
            }
        }
        Ok(())
    }
}

/// A circuit split at its branch nodes
#[derive(Debug, Clone)]
pub struct SplitCircuit {
    num_qubits: usize,
    segments: Vec<Segment>,
    nodes: Vec<BranchNode>,
}

impl SplitCircuit {
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of branch nodes `n`
    #[inline]
    pub fn depth(&self) -> usize {
        self.nodes.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn nodes(&self) -> &[BranchNode] {
        &self.nodes
    }

    /// Segment entered at `depth` (`0..=n`)
    pub fn segment(&self, depth: usize) -> Option<&Segment> {
        self.segments.get(depth)
    }

    /// Branch node at `depth` (`1..=n`); depth 0 is the root and has none
    pub fn node(&self, depth: usize) -> Option<&BranchNode> {
        depth.checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    /// Outcome count per depth, with `1` for the root
    pub fn outcome_counts(&self) -> Vec<usize> {
        std::iter::once(1)
            .chain(self.nodes.iter().map(BranchNode::outcome_count))
            .collect()
    }

    /// Terminal measurements of the circuit
    pub fn measurements(&self) -> &[MeasurementProcess] {
        self.segments
            .last()
            .map(Segment::measurements)
            .unwrap_or_default()
    }
}

/// Outcome of splitting a circuit
#[derive(Debug, Clone)]
pub enum Split {
    /// No branching operations: one segment covering the whole circuit
    Trivial(Segment),
    Tree(SplitCircuit),
}

/// Split `circuit` into segments separated by branch nodes
///
/// # Errors
/// Returns a structural error for a node without outcomes, operators that do
/// not match the node width, an out-of-range post-selection, or a state
/// preparation after the first operation. A partial preparation that cannot
/// be expanded to the circuit width is a circuit error.
pub fn split_circuit(circuit: &Circuit) -> Result<Split> {
    let num_qubits = circuit.num_qubits();
    let mut segments = Vec::new();
    let mut nodes = Vec::new();

    let mut entry = SegmentEntry::Zero;
    let mut operations = Vec::new();

    for (position, op) in circuit.operations().iter().enumerate() {
        match op {
            Operation::StatePrep(prep) => {
                if position != 0 {
                    return Err(SimulatorError::structural(
                        "State preparation is only valid as the first operation",
                    ));
                }
                entry = SegmentEntry::Prepared(if prep.is_full_width(num_qubits) {
                    prep.clone()
                } else {
                    prep.extend_to(num_qubits)?
                });
            }
            Operation::Gate(gate) => operations.push(SegmentOp::Gate(gate.clone())),
            Operation::Conditional(cond) => operations.push(SegmentOp::Conditional(cond.clone())),
            Operation::Channel(channel) => {
                segments.push(Segment {
                    index: segments.len(),
                    entry: std::mem::replace(&mut entry, SegmentEntry::Inherited),
                    operations: std::mem::take(&mut operations),
                    measurements: Vec::new(),
                });
                nodes.push(BranchNode {
                    position,
                    qubits: channel.qubits().iter().copied().collect(),
                    kind: BranchKind::Channel {
                        name: channel.channel().name().to_string(),
                    },
                    operators: channel.kraus_operators(),
                });
            }
            Operation::MidMeasure(measure) => {
                segments.push(Segment {
                    index: segments.len(),
                    entry: std::mem::replace(&mut entry, SegmentEntry::Inherited),
                    operations: std::mem::take(&mut operations),
                    measurements: Vec::new(),
                });
                nodes.push(BranchNode {
                    position,
                    qubits: SmallVec::from_slice(&[measure.qubit()]),
                    kind: BranchKind::Measurement {
                        id: measure.id(),
                        postselect: measure.postselect().map(usize::from),
                        value_offset: measure.value_offset(),
                    },
                    operators: measure.projectors(),
                });
            }
        }
    }

    let last = Segment {
        index: segments.len(),
        entry,
        operations,
        measurements: circuit.measurements().to_vec(),
    };

    if nodes.is_empty() {
        return Ok(Split::Trivial(last));
    }

    for node in &nodes {
        node.validate()?;
    }
    segments.push(last);

    Ok(Split::Tree(SplitCircuit {
        num_qubits,
        segments,
        nodes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use qbranch_core::noise::{AmplitudeDamping, BitFlip, KrausChannel};
    use qbranch_core::standard::{Hadamard, PauliX, RotationZ};
    use qbranch_core::{MidMeasure, PauliObservable, QuantumError};
    use std::sync::Arc;

    fn q(i: usize) -> QubitId {
        QubitId::new(i)
    }

    fn expect_tree(circuit: &Circuit) -> SplitCircuit {
        match split_circuit(circuit).unwrap() {
            Split::Tree(split) => split,
            Split::Trivial(_) => panic!("expected a branching circuit"),
        }
    }

    #[test]
    fn test_trivial_circuit() {
        let mut circuit = Circuit::new(1);
        circuit.add_gate(Arc::new(Hadamard), &[q(0)]).unwrap();
        circuit
            .measure(MeasurementProcess::Expval(PauliObservable::z(q(0))))
            .unwrap();

        match split_circuit(&circuit).unwrap() {
            Split::Trivial(segment) => {
                assert_eq!(segment.operations().len(), 1);
                assert_eq!(segment.measurements().len(), 1);
                assert_eq!(segment.entry(), &SegmentEntry::Zero);
                assert_eq!(segment.prepared_entry(), None);
            }
            Split::Tree(_) => panic!("circuit has no branch nodes"),
        }
    }

    #[test]
    fn test_segments_between_nodes() {
        let mut circuit = Circuit::new(2);
        circuit.add_gate(Arc::new(Hadamard), &[q(0)]).unwrap();
        circuit.add_gate(Arc::new(PauliX), &[q(1)]).unwrap();
        circuit
            .add_channel(Arc::new(AmplitudeDamping::new(0.1).unwrap()), &[q(0)])
            .unwrap();
        circuit
            .add_gate(Arc::new(RotationZ::new(0.3)), &[q(1)])
            .unwrap();
        circuit.add_mid_measure(MidMeasure::on(q(1))).unwrap();
        circuit
            .measure(MeasurementProcess::Probs(vec![q(0), q(1)]))
            .unwrap();

        let split = expect_tree(&circuit);
        assert_eq!(split.depth(), 2);
        assert_eq!(split.segments().len(), 3);
        assert_eq!(split.outcome_counts(), vec![1, 2, 2]);

        let ops: Vec<usize> = split
            .segments()
            .iter()
            .map(|s| s.operations().len())
            .collect();
        assert_eq!(ops, vec![2, 1, 0]);

        assert_eq!(split.segments()[0].entry(), &SegmentEntry::Zero);
        assert_eq!(split.segments()[1].entry(), &SegmentEntry::Inherited);
        assert_eq!(split.segments()[2].entry(), &SegmentEntry::Inherited);

        assert!(split.segments()[0].measurements().is_empty());
        assert!(split.segments()[1].measurements().is_empty());
        assert_eq!(split.measurements().len(), 1);

        assert_eq!(split.node(1).unwrap().position(), 2);
        assert_eq!(split.node(2).unwrap().position(), 4);
        assert!(split.node(0).is_none());
        assert!(split.node(3).is_none());
    }

    #[test]
    fn test_channel_node_kind() {
        let mut circuit = Circuit::new(1);
        circuit
            .add_channel(Arc::new(BitFlip::new(0.2).unwrap()), &[q(0)])
            .unwrap();

        let split = expect_tree(&circuit);
        let node = split.node(1).unwrap();
        assert_eq!(
            node.kind(),
            &BranchKind::Channel {
                name: "bit_flip".to_string()
            }
        );
        assert_eq!(node.forced_outcome(), None);
        assert_eq!(node.classical_value(1), None);
    }

    #[test]
    fn test_measurement_node_values() {
        let mut circuit = Circuit::new(1);
        let m = circuit
            .add_mid_measure(MidMeasure::on(q(0)).with_postselect(1).with_value_offset(-1))
            .unwrap();

        let split = expect_tree(&circuit);
        let node = split.node(1).unwrap();
        assert_eq!(node.outcome_count(), 2);
        assert_eq!(node.forced_outcome(), Some(1));
        assert_eq!(node.classical_value(0), Some((m, -1)));
        assert_eq!(node.classical_value(1), Some((m, 0)));
    }

    #[test]
    fn test_partial_state_prep_is_extended() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let prep = StatePrep::new(
            vec![Complex64::new(h, 0.0), Complex64::new(h, 0.0)],
            &[q(1)],
        )
        .unwrap();

        let mut circuit = Circuit::new(2);
        circuit.add_state_prep(prep.clone()).unwrap();
        circuit
            .add_channel(Arc::new(BitFlip::new(0.1).unwrap()), &[q(0)])
            .unwrap();

        let split = expect_tree(&circuit);
        let entry = split.segments()[0].prepared_entry().unwrap();
        assert!(entry.is_full_width(2));
        assert_eq!(entry, &prep.extend_to(2).unwrap());
    }

    #[test]
    fn test_wide_circuit_entry_is_not_materialized() {
        let mut circuit = Circuit::new(40);
        circuit
            .add_channel(Arc::new(BitFlip::new(0.1).unwrap()), &[q(0)])
            .unwrap();

        let split = expect_tree(&circuit);
        assert_eq!(split.num_qubits(), 40);
        assert_eq!(split.segments()[0].entry(), &SegmentEntry::Zero);
    }

    #[test]
    fn test_partial_prep_too_wide_to_extend() {
        let prep = StatePrep::new(
            vec![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            &[q(0)],
        )
        .unwrap();
        let mut circuit = Circuit::new(40);
        circuit.add_state_prep(prep).unwrap();
        circuit
            .add_channel(Arc::new(BitFlip::new(0.1).unwrap()), &[q(0)])
            .unwrap();

        assert!(matches!(
            split_circuit(&circuit),
            Err(SimulatorError::Circuit(QuantumError::ValidationError(_)))
        ));
    }

    #[test]
    fn test_full_width_state_prep_is_reused() {
        let prep = StatePrep::new(
            vec![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            &[q(0)],
        )
        .unwrap();

        let mut circuit = Circuit::new(1);
        circuit.add_state_prep(prep.clone()).unwrap();
        circuit
            .add_channel(Arc::new(BitFlip::new(0.1).unwrap()), &[q(0)])
            .unwrap();

        let split = expect_tree(&circuit);
        assert_eq!(split.segments()[0].prepared_entry(), Some(&prep));
        assert!(split.segments()[0].operations().is_empty());
    }

    #[test]
    fn test_single_operator_channel_is_a_node() {
        let identity = KrausOperator::single_qubit([
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        ]);
        let mut circuit = Circuit::new(1);
        circuit
            .add_channel(
                Arc::new(KrausChannel::new(vec![identity]).unwrap()),
                &[q(0)],
            )
            .unwrap();

        let split = expect_tree(&circuit);
        assert_eq!(split.outcome_counts(), vec![1, 1]);
    }
}
