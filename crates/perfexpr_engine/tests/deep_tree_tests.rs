//! Simplifying, scoring and evaluating trees far deeper than the thread
//! stack could hold with one frame per level.
//!
//! No subscriber is installed here: the simplifier's debug events render
//! whole subtrees, and rendering recurses.

use perfexpr_ast::{Expr, VariableAssignment};
use perfexpr_engine::{evaluate_all, ComplexityAnalyzer, Simplifier};
use std::sync::Arc;

const DEPTH: usize = 100_000;

/// ((x + 1) + 1) + ... nested to the left `DEPTH` times.
fn left_nested_sum() -> Arc<Expr> {
    (0..DEPTH).fold(Expr::variable("x"), |inner, _| {
        Expr::addition(vec![inner, Expr::constant(1.0)]).unwrap()
    })
}

#[test]
fn deep_sum_collapses_to_one_addition() {
    let expr = left_nested_sum();
    let mut simplifier = Simplifier::new();
    let (result, stats) = simplifier.simplify_with_stats(&expr);

    let expected = Expr::addition(vec![Expr::constant(DEPTH as f64), Expr::variable("x")]).unwrap();
    assert_eq!(result, expected);
    assert_eq!(stats.inner_nodes_before, DEPTH);
    assert_eq!(stats.inner_nodes_after, 1);

    let samples = [VariableAssignment::new().with("x", 0.25)];
    let before = evaluate_all(&expr, &samples).unwrap();
    assert_eq!(before, evaluate_all(&result, &samples).unwrap());
    assert_eq!(before, vec![DEPTH as f64 + 0.25]);
}

#[test]
fn deep_tower_is_scored() {
    let tower = (0..DEPTH).fold(Expr::variable("x"), |inner, _| Expr::sine(inner));
    let report = ComplexityAnalyzer::new().analyze(&tower);
    assert_eq!(report.nodes, DEPTH + 1);
    assert_eq!(report.max_depth, DEPTH);
    assert!(report.computational.is_finite());
}
