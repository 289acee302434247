//! Mid-circuit measurements, classical conditions and terminal measurements

use crate::gate::GateOp;
use crate::noise::KrausOperator;
use crate::observable::PauliObservable;
use crate::QubitId;
use std::fmt;

/// Identifier of a mid-circuit measurement, assigned by the circuit in order
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MeasureId(pub(crate) usize);

impl MeasureId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for MeasureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Computational-basis measurement in the middle of a circuit
///
/// Outcome `i` (0 or 1) registers the classical value `i + value_offset`
/// for later [`Condition`]s. With `postselect` set, only that outcome is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct MidMeasure {
    pub(crate) id: MeasureId,
    qubit: QubitId,
    postselect: Option<u8>,
    value_offset: i64,
}

impl MidMeasure {
    /// Measurement of `qubit`; the id is assigned when added to a circuit
    pub fn on(qubit: QubitId) -> Self {
        Self {
            id: MeasureId(0),
            qubit,
            postselect: None,
            value_offset: 0,
        }
    }

    pub fn with_postselect(mut self, outcome: u8) -> Self {
        self.postselect = Some(outcome);
        self
    }

    pub fn with_value_offset(mut self, offset: i64) -> Self {
        self.value_offset = offset;
        self
    }

    pub fn id(&self) -> MeasureId {
        self.id
    }

    pub fn qubit(&self) -> QubitId {
        self.qubit
    }

    pub fn postselect(&self) -> Option<u8> {
        self.postselect
    }

    pub fn value_offset(&self) -> i64 {
        self.value_offset
    }

    /// Projectors |0⟩⟨0| and |1⟩⟨1|, indexed by outcome
    pub fn projectors(&self) -> Vec<KrausOperator> {
        vec![KrausOperator::projector(0), KrausOperator::projector(1)]
    }
}

/// Classical condition on a mid-circuit measurement value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub measure: MeasureId,
    pub value: i64,
}

/// A gate applied only when its condition holds on the current branch
#[derive(Debug, Clone)]
pub struct ConditionalOp {
    pub condition: Condition,
    pub op: GateOp,
}

/// Kind of a terminal measurement, used to pick a combination rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Expval,
    Var,
    Probs,
    Sample,
    Counts,
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeasurementKind::Expval => "expval",
            MeasurementKind::Var => "var",
            MeasurementKind::Probs => "probs",
            MeasurementKind::Sample => "sample",
            MeasurementKind::Counts => "counts",
        };
        f.write_str(name)
    }
}

/// Terminal measurement evaluated on the final state
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementProcess {
    /// ⟨ψ|O|ψ⟩
    Expval(PauliObservable),
    /// ⟨O²⟩ - ⟨O⟩²
    Var(PauliObservable),
    /// Marginal probabilities over the listed qubits
    Probs(Vec<QubitId>),
    /// Shot samples of the listed qubits
    Sample(Vec<QubitId>),
    /// Histogram of shot samples of the listed qubits
    Counts(Vec<QubitId>),
}

impl MeasurementProcess {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            MeasurementProcess::Expval(_) => MeasurementKind::Expval,
            MeasurementProcess::Var(_) => MeasurementKind::Var,
            MeasurementProcess::Probs(_) => MeasurementKind::Probs,
            MeasurementProcess::Sample(_) => MeasurementKind::Sample,
            MeasurementProcess::Counts(_) => MeasurementKind::Counts,
        }
    }

    /// Qubits this measurement reads
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            MeasurementProcess::Expval(obs) | MeasurementProcess::Var(obs) => obs.qubits().collect(),
            MeasurementProcess::Probs(qubits)
            | MeasurementProcess::Sample(qubits)
            | MeasurementProcess::Counts(qubits) => qubits.clone(),
        }
    }
}
