use perfexpr_ast::EvalError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("expected {expected} samples, got {found}")]
    SampleCountMismatch { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfexpr_ast::{Expr, VariableAssignment};

    #[test]
    fn test_eval_error_is_transparent() {
        let err = Expr::variable("q")
            .evaluate(&VariableAssignment::new())
            .unwrap_err();
        let wrapped = EngineError::from(err.clone());
        assert_eq!(wrapped.to_string(), err.to_string());
    }

    #[test]
    fn test_sample_count_message() {
        let err = EngineError::SampleCountMismatch {
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "expected 3 samples, got 2");
    }
}
