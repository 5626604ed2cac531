//! Complexity scores of expressions.
//!
//! Two read-only passes over the tree, each charging every visited node the
//! cost of its variant from a [`CostTable`] plus a penalty for every node
//! deeper than [`ComplexityOptions::depth_threshold`]:
//!
//! - computational: how expensive the expression is to evaluate;
//! - comprehensibility: how hard it is to read. Trees deeper than the
//!   threshold additionally pay `factor * max_depth^exponent` once.

use crate::options::{ComplexityOptions, CostTable};
use perfexpr_ast::{walk, Expr, ExprWalker, Flow, Position};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Both scores plus the tree shape they were computed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplexityReport {
    pub computational: f64,
    pub comprehensibility: f64,
    pub nodes: usize,
    pub max_depth: usize,
}

/// Sums table costs and per-node depth penalties.
struct CostWalker<'t> {
    table: &'t CostTable,
    depth_threshold: usize,
    depth_penalty: f64,
    score: f64,
}

impl ExprWalker for CostWalker<'_> {
    fn enter_fallback(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.score += self.table.cost(node.kind());
        if at.depth > self.depth_threshold {
            self.score += self.depth_penalty;
        }
        Flow::Descend
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComplexityAnalyzer {
    options: ComplexityOptions,
}

impl ComplexityAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ComplexityOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ComplexityOptions {
        &self.options
    }

    pub fn computational(&self, expr: &Arc<Expr>) -> f64 {
        self.computational_pass(expr).0
    }

    pub fn comprehensibility(&self, expr: &Arc<Expr>) -> f64 {
        self.comprehensibility_pass(expr).0
    }

    pub fn analyze(&self, expr: &Arc<Expr>) -> ComplexityReport {
        let (computational, nodes, max_depth) = self.computational_pass(expr);
        let (comprehensibility, ..) = self.comprehensibility_pass(expr);
        let report = ComplexityReport {
            computational,
            comprehensibility,
            nodes,
            max_depth,
        };
        debug!(
            computational = report.computational,
            comprehensibility = report.comprehensibility,
            nodes = report.nodes,
            max_depth = report.max_depth,
            "complexity report"
        );
        report
    }

    /// Returns `(score, nodes, max_depth)`.
    fn computational_pass(&self, expr: &Arc<Expr>) -> (f64, usize, usize) {
        let mut walker = CostWalker {
            table: &self.options.computational,
            depth_threshold: self.options.depth_threshold,
            depth_penalty: self.options.computational_depth_penalty,
            score: 0.0,
        };
        let summary = walk(expr, &mut walker);
        (walker.score, summary.visits, summary.max_depth)
    }

    fn comprehensibility_pass(&self, expr: &Arc<Expr>) -> (f64, usize, usize) {
        let mut walker = CostWalker {
            table: &self.options.comprehensibility,
            depth_threshold: self.options.depth_threshold,
            depth_penalty: self.options.comprehensibility_depth_penalty,
            score: 0.0,
        };
        let summary = walk(expr, &mut walker);
        let mut score = walker.score;
        if summary.max_depth > self.options.depth_threshold {
            score += self.options.max_depth_penalty_factor
                * (summary.max_depth as f64).powf(self.options.max_depth_exponent);
        }
        (score, summary.visits, summary.max_depth)
    }
}
