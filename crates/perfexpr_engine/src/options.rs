//! Configuration for the simplifier and the complexity scorers.
//!
//! All option structs implement `Default` and derive serde, with
//! `#[serde(default)]` so partial JSON/TOML documents fill in the rest.

use perfexpr_ast::{ExprKind, RewriteOptions};
use serde::{Deserialize, Serialize};

/// Options for [`crate::Simplifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyOptions {
    /// Options of the underlying rewriting traversal.
    pub rewrite: RewriteOptions,
    /// Take folded constants from the simplifier's `ExprCache` instead of
    /// allocating a fresh leaf every time (default: true).
    pub intern_constants: bool,
    /// The cache is emptied after a `simplify` call that leaves it holding
    /// more leaves than this (default: 4096).
    pub max_cached_leaves: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            rewrite: RewriteOptions::default(),
            intern_constants: true,
            max_cached_leaves: 4096,
        }
    }
}

/// One cost per expression variant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    pub constant: f64,
    pub variable: f64,
    pub addition: f64,
    pub multiplication: f64,
    pub subtraction: f64,
    pub division: f64,
    pub exponentiation: f64,
    pub logarithm: f64,
    pub natural_logarithm: f64,
    pub exponential_function: f64,
    pub sine: f64,
    pub comparison: f64,
    pub if_then_else: f64,
}

impl CostTable {
    /// Machine cost: roughly the relative latency of the operation.
    pub const fn computational() -> Self {
        Self {
            constant: 1.0,
            variable: 1.0,
            addition: 2.0,
            multiplication: 3.0,
            subtraction: 2.0,
            division: 4.0,
            exponentiation: 6.0,
            logarithm: 8.0,
            natural_logarithm: 7.0,
            exponential_function: 6.0,
            sine: 6.0,
            comparison: 2.0,
            if_then_else: 4.0,
        }
    }

    /// Reader cost: how hard the construct is for a person to follow.
    pub const fn comprehensibility() -> Self {
        Self {
            constant: 1.0,
            variable: 1.5,
            addition: 2.0,
            multiplication: 2.5,
            subtraction: 2.5,
            division: 4.0,
            exponentiation: 5.0,
            logarithm: 8.0,
            natural_logarithm: 6.0,
            exponential_function: 6.0,
            sine: 7.0,
            comparison: 3.0,
            if_then_else: 9.0,
        }
    }

    #[inline]
    pub fn cost(&self, kind: ExprKind) -> f64 {
        match kind {
            ExprKind::Constant => self.constant,
            ExprKind::Variable => self.variable,
            ExprKind::Addition => self.addition,
            ExprKind::Multiplication => self.multiplication,
            ExprKind::Subtraction => self.subtraction,
            ExprKind::Division => self.division,
            ExprKind::Exponentiation => self.exponentiation,
            ExprKind::Logarithm => self.logarithm,
            ExprKind::NaturalLogarithm => self.natural_logarithm,
            ExprKind::ExponentialFunction => self.exponential_function,
            ExprKind::Sine => self.sine,
            ExprKind::Comparison => self.comparison,
            ExprKind::IfThenElse => self.if_then_else,
        }
    }
}

/// Options for [`crate::ComplexityAnalyzer`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityOptions {
    /// Nodes deeper than this (root = 0) pay the per-node depth penalty.
    pub depth_threshold: usize,
    /// Added to the computational score for each node beyond the threshold.
    pub computational_depth_penalty: f64,
    /// Added to the comprehensibility score for each node beyond the threshold.
    pub comprehensibility_depth_penalty: f64,
    /// Factor of the one-time `max_depth^max_depth_exponent` comprehensibility
    /// penalty, charged once the tree is deeper than the threshold.
    pub max_depth_penalty_factor: f64,
    pub max_depth_exponent: f64,
    pub computational: CostTable,
    pub comprehensibility: CostTable,
}

impl Default for ComplexityOptions {
    fn default() -> Self {
        Self {
            depth_threshold: 4,
            computational_depth_penalty: 1.0,
            comprehensibility_depth_penalty: 2.0,
            max_depth_penalty_factor: 1.0,
            max_depth_exponent: 1.4,
            computational: CostTable::computational(),
            comprehensibility: CostTable::comprehensibility(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_lookup_covers_every_kind() {
        let table = CostTable::computational();
        for kind in ExprKind::ALL {
            assert!(table.cost(kind) > 0.0, "{kind} has no cost");
        }
        assert_eq!(table.cost(ExprKind::Division), 4.0);
        assert_eq!(CostTable::comprehensibility().cost(ExprKind::IfThenElse), 9.0);
    }

    #[test]
    fn test_complexity_options_json_round_trip() {
        let mut options = ComplexityOptions::default();
        options.depth_threshold = 7;
        options.computational.sine = 11.0;

        let json = serde_json::to_string(&options).unwrap();
        let back: ComplexityOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }

    #[test]
    fn test_partial_documents_fill_defaults() {
        let options: SimplifyOptions =
            serde_json::from_str(r#"{"intern_constants": false}"#).unwrap();
        assert!(!options.intern_constants);
        assert_eq!(options.rewrite, RewriteOptions::default());
        assert_eq!(options.max_cached_leaves, 4096);

        let options: ComplexityOptions =
            serde_json::from_str(r#"{"max_depth_exponent": 2.0}"#).unwrap();
        assert_eq!(options.max_depth_exponent, 2.0);
        assert_eq!(options.depth_threshold, 4);
        assert_eq!(options.computational, CostTable::computational());
    }
}
