//! Result combiner
//!
//! Folds the per-outcome results of one tree level into a single
//! probability-weighted result. Pure: no I/O, no effect on the stack.

use crate::error::{Result, SimulatorError};
use crate::result::ResultTuple;
use crate::stack::BranchSlot;
use qbranch_core::{MeasurementKind, MeasurementProcess};
use qbranch_state::MeasurementValue;

/// Combination rule for a measurement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// Σ pᵢ vᵢ over scalars
    WeightedScalar,
    /// Σ pᵢ vᵢ over equal-length vectors
    WeightedVector,
}

fn rule(kind: MeasurementKind) -> Result<Rule> {
    match kind {
        MeasurementKind::Expval => Ok(Rule::WeightedScalar),
        MeasurementKind::Probs => Ok(Rule::WeightedVector),
        MeasurementKind::Var | MeasurementKind::Sample | MeasurementKind::Counts => {
            Err(SimulatorError::UnsupportedObservable { kind })
        }
    }
}

/// Check that every measurement has a combination rule
///
/// # Errors
/// Returns [`SimulatorError::UnsupportedObservable`] naming the first kind without one
pub fn check_supported(measurements: &[MeasurementProcess]) -> Result<()> {
    for m in measurements {
        rule(m.kind())?;
    }
    Ok(())
}

/// Combine one level's results, weighted by outcome probability
///
/// Pruned outcomes are skipped. Returns `None` when every outcome was pruned.
///
/// # Errors
/// Returns an error for a measurement kind without a combination rule, a leaf
/// value of the wrong shape, or a filled outcome without a probability.
pub fn combine(
    measurements: &[MeasurementProcess],
    probs: &[Option<f64>],
    results: &[BranchSlot],
) -> Result<Option<ResultTuple>> {
    let rules = measurements
        .iter()
        .map(|m| rule(m.kind()))
        .collect::<Result<Vec<_>>>()?;

    let mut kept = Vec::with_capacity(results.len());
    for (i, slot) in results.iter().enumerate() {
        if let BranchSlot::Filled(values) = slot {
            let p = probs.get(i).copied().flatten().ok_or_else(|| {
                SimulatorError::Structural(format!("Outcome {} has a result but no probability", i))
            })?;
            if values.len() != measurements.len() {
                return Err(SimulatorError::Structural(format!(
                    "Outcome {} produced {} values for {} measurements",
                    i,
                    values.len(),
                    measurements.len()
                )));
            }
            kept.push((p, values));
        }
    }

    if kept.is_empty() {
        return Ok(None);
    }

    let mut combined = Vec::with_capacity(measurements.len());
    for (j, (m, rule)) in measurements.iter().zip(&rules).enumerate() {
        let kind = m.kind();
        let value = match rule {
            Rule::WeightedScalar => {
                let mut sum = 0.0;
                for (p, values) in &kept {
                    let v = values[j].as_scalar().ok_or(SimulatorError::ResultShape {
                        kind,
                        expected: "scalar",
                    })?;
                    sum += p * v;
                }
                MeasurementValue::Scalar(sum)
            }
            Rule::WeightedVector => {
                let mut sum: Vec<f64> = Vec::new();
                for (p, values) in &kept {
                    let v = values[j].as_vector().ok_or(SimulatorError::ResultShape {
                        kind,
                        expected: "vector",
                    })?;
                    if sum.is_empty() {
                        sum = vec![0.0; v.len()];
                    } else if sum.len() != v.len() {
                        return Err(SimulatorError::ResultShape {
                            kind,
                            expected: "vector of consistent length",
                        });
                    }
                    for (acc, x) in sum.iter_mut().zip(v) {
                        *acc += p * x;
                    }
                }
                MeasurementValue::Vector(sum)
            }
        };
        combined.push(value);
    }

    Ok(Some(combined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qbranch_core::{PauliObservable, QubitId};

    fn expval() -> MeasurementProcess {
        MeasurementProcess::Expval(PauliObservable::z(QubitId::new(0)))
    }

    fn probs() -> MeasurementProcess {
        MeasurementProcess::Probs(vec![QubitId::new(0)])
    }

    fn filled(values: Vec<MeasurementValue>) -> BranchSlot {
        BranchSlot::Filled(values)
    }

    #[test]
    fn test_weighted_scalar() {
        let combined = combine(
            &[expval()],
            &[Some(0.25), Some(0.75)],
            &[
                filled(vec![MeasurementValue::Scalar(1.0)]),
                filled(vec![MeasurementValue::Scalar(-1.0)]),
            ],
        )
        .unwrap()
        .unwrap();

        assert_relative_eq!(combined[0].as_scalar().unwrap(), -0.5);
    }

    #[test]
    fn test_weighted_vector() {
        let combined = combine(
            &[probs(), expval()],
            &[Some(0.5), Some(0.5)],
            &[
                filled(vec![
                    MeasurementValue::Vector(vec![1.0, 0.0]),
                    MeasurementValue::Scalar(1.0),
                ]),
                filled(vec![
                    MeasurementValue::Vector(vec![0.2, 0.8]),
                    MeasurementValue::Scalar(0.0),
                ]),
            ],
        )
        .unwrap()
        .unwrap();

        let v = combined[0].as_vector().unwrap();
        assert_relative_eq!(v[0], 0.6);
        assert_relative_eq!(v[1], 0.4);
        assert_relative_eq!(combined[1].as_scalar().unwrap(), 0.5);
    }

    #[test]
    fn test_pruned_outcomes_are_skipped() {
        let combined = combine(
            &[expval()],
            &[None, Some(1.0)],
            &[BranchSlot::Pruned, filled(vec![MeasurementValue::Scalar(0.3)])],
        )
        .unwrap()
        .unwrap();

        assert_relative_eq!(combined[0].as_scalar().unwrap(), 0.3);
    }

    #[test]
    fn test_all_pruned() {
        let combined = combine(
            &[expval()],
            &[None, None],
            &[BranchSlot::Pruned, BranchSlot::Pruned],
        )
        .unwrap();
        assert!(combined.is_none());
    }

    #[test]
    fn test_unsupported_kinds() {
        let var = MeasurementProcess::Var(PauliObservable::z(QubitId::new(0)));
        let err = combine(&[expval(), var], &[Some(1.0)], &[BranchSlot::Pruned]).unwrap_err();
        assert_eq!(
            err,
            SimulatorError::UnsupportedObservable {
                kind: MeasurementKind::Var
            }
        );

        let counts = MeasurementProcess::Counts(vec![QubitId::new(0)]);
        assert!(check_supported(&[probs(), counts]).is_err());
        assert!(check_supported(&[probs(), expval()]).is_ok());
    }

    #[test]
    fn test_shape_mismatch() {
        let err = combine(
            &[expval()],
            &[Some(1.0)],
            &[filled(vec![MeasurementValue::Vector(vec![1.0])])],
        )
        .unwrap_err();
        assert!(matches!(err, SimulatorError::ResultShape { .. }));
    }

    #[test]
    fn test_missing_probability() {
        let err = combine(
            &[expval()],
            &[None],
            &[filled(vec![MeasurementValue::Scalar(1.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, SimulatorError::Structural(_)));
    }
}
