//! Simplification, complexity scoring and batch evaluation of expressions
//! built with `perfexpr_ast`.

pub mod complexity;
pub mod error;
pub mod evaluator;
pub mod options;
pub mod simplifier;


pub use complexity::{ComplexityAnalyzer, ComplexityReport};
pub use error::EngineError;
pub use evaluator::{
    approx_eq, evaluate_all, evaluate_each, max_abs_deviation, numerically_equivalent,
};
pub use options::{ComplexityOptions, CostTable, SimplifyOptions};
pub use simplifier::{SimplifyStats, Simplifier};
