//! Evaluation of one expression against many samples.
//!
//! Measured data arrives as one `VariableAssignment` per sample. These
//! helpers evaluate a candidate over the whole set, either failing on the
//! first incomplete sample or reporting per-sample results so callers can
//! skip the incomplete ones.

use crate::error::EngineError;
use perfexpr_ast::{EvalError, Expr, VariableAssignment};
use tracing::trace;

/// Evaluates `expr` for every assignment, stopping at the first error.
pub fn evaluate_all(
    expr: &Expr,
    assignments: &[VariableAssignment],
) -> Result<Vec<f64>, EngineError> {
    assignments
        .iter()
        .map(|assignment| expr.evaluate(assignment).map_err(EngineError::from))
        .collect()
}

/// Evaluates `expr` for every assignment, one result per sample.
pub fn evaluate_each<'a>(
    expr: &'a Expr,
    assignments: &'a [VariableAssignment],
) -> impl Iterator<Item = Result<f64, EvalError>> + 'a {
    assignments
        .iter()
        .map(move |assignment| expr.evaluate(assignment))
}

/// Check if two f64 values are approximately equal.
///
/// Infinities match when they have the same sign. Two NaNs match: both
/// expressions are undefined at the same sample.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= eps * scale
}

/// Whether `a` and `b` agree on every sample within relative tolerance `eps`.
pub fn numerically_equivalent(
    a: &Expr,
    b: &Expr,
    assignments: &[VariableAssignment],
    eps: f64,
) -> Result<bool, EngineError> {
    for (index, assignment) in assignments.iter().enumerate() {
        let left = a.evaluate(assignment)?;
        let right = b.evaluate(assignment)?;
        if !approx_eq(left, right, eps) {
            trace!(index, left, right, "samples diverge");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Largest absolute difference between `expr` and the `expected` values,
/// sample by sample. NaN if any sample evaluates to NaN.
pub fn max_abs_deviation(
    expr: &Expr,
    assignments: &[VariableAssignment],
    expected: &[f64],
) -> Result<f64, EngineError> {
    if assignments.len() != expected.len() {
        return Err(EngineError::SampleCountMismatch {
            expected: expected.len(),
            found: assignments.len(),
        });
    }
    let mut worst = 0.0f64;
    for (assignment, want) in assignments.iter().zip(expected) {
        let deviation = (expr.evaluate(assignment)? - want).abs();
        if deviation.is_nan() {
            return Ok(f64::NAN);
        }
        worst = worst.max(deviation);
    }
    Ok(worst)
}
