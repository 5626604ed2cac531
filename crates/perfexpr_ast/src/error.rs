//! Error types for perfexpr_ast crate.

use crate::assignment::VariableAssignment;
use crate::expression::Variable;
use crate::kind::ExprKind;
use thiserror::Error;

/// Precondition violations raised while building expressions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    /// N-ary variants need at least two operands
    #[error("{kind} needs at least 2 operands, got {found}")]
    TooFewOperands { kind: ExprKind, found: usize },
}

/// Errors that abort an `evaluate` call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A `Variable` had no binding in the assignment it was evaluated against.
    #[error("variable '{variable}' is not defined in {assignment}")]
    UndefinedVariable {
        variable: Variable,
        assignment: Box<VariableAssignment>,
    },
}

impl EvalError {
    /// The variable whose lookup failed.
    pub fn variable(&self) -> &Variable {
        match self {
            EvalError::UndefinedVariable { variable, .. } => variable,
        }
    }
}
