//! Read-only depth-first traversal and the canonical helpers built on it.
//!
//! [`walk`] drives an [`ExprWalker`]: enter hook, children in traversal
//! order, exit hook. Every entered node gets exactly one exit call, in
//! reverse order of entry. A shared subtree is visited once per occurrence.
//!
//! The walk keeps its own frame stack instead of recursing, so any tree
//! depth is fine.
//!
//! Counters live in per-call state, so nothing carries over from one walk
//! to the next and a walker can be reused for any number of walks.
//!
//! # Functions
//!
//! - [`count_nodes`]: Count total nodes in a tree
//! - [`count_inner_nodes`]: Count non-leaf nodes
//! - [`count_nodes_matching`]: Count nodes whose kind is in a set
//! - [`count_nodes_and_max_depth`]: Get both node count and max depth
//! - [`collect_variables`]: Collect all unique variables

use crate::expression::{Expr, Variable};
use crate::kind::{ExprKind, ExprKindSet};
use crate::walker::{ExprWalker, Flow, Position};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::sync::Arc;

/// What a finished walk saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkSummary {
    /// Number of entered nodes (equals the number of exit calls).
    pub visits: usize,
    /// Deepest entered node (root = 0).
    pub max_depth: usize,
}

/// One entered node whose children are still being walked.
struct Frame<'a> {
    node: &'a Arc<Expr>,
    at: Position,
    children: SmallVec<[&'a Arc<Expr>; 4]>,
    next: usize,
}

/// Walks `root` depth-first, calling `walker`'s hooks.
///
/// Stack-safe (iterative implementation using explicit stack).
pub fn walk<W: ExprWalker + ?Sized>(root: &Arc<Expr>, walker: &mut W) -> WalkSummary {
    let mut summary = WalkSummary::default();
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut pending = Some((root, 0));

    loop {
        if let Some((node, depth)) = pending.take() {
            summary.visits += 1;
            summary.max_depth = summary.max_depth.max(depth);
            let at = Position {
                depth,
                visit: summary.visits,
            };
            let children = match walker.enter(node, at) {
                Flow::Descend => node.children(),
                Flow::Prune => SmallVec::new(),
            };
            stack.push(Frame {
                node,
                at,
                children,
                next: 0,
            });
        }

        let Some(frame) = stack.last_mut() else {
            break;
        };
        if let Some(&child) = frame.children.get(frame.next) {
            frame.next += 1;
            pending = Some((child, frame.at.depth + 1));
            continue;
        }

        let Some(done) = stack.pop() else {
            break;
        };
        if walker.exit(done.node, done.at) == Flow::Prune {
            // Remaining siblings are skipped.
            if let Some(parent) = stack.last_mut() {
                parent.next = parent.children.len();
            }
        }
    }
    summary
}

struct KindCounter {
    kinds: ExprKindSet,
    count: usize,
}

impl ExprWalker for KindCounter {
    fn enter_fallback(&mut self, node: &Arc<Expr>, _at: Position) -> Flow {
        if self.kinds.contains(node.kind()) {
            self.count += 1;
        }
        Flow::Descend
    }
}

/// Count all nodes in an expression tree.
///
/// ```
/// use perfexpr_ast::{count_nodes, Expr};
///
/// let sum = Expr::addition(vec![Expr::variable("x"), Expr::constant(1.0)]).unwrap();
/// assert_eq!(count_nodes(&sum), 3);
/// ```
pub fn count_nodes(root: &Arc<Expr>) -> usize {
    count_nodes_matching(root, ExprKindSet::ALL)
}

/// Count nodes that have children.
pub fn count_inner_nodes(root: &Arc<Expr>) -> usize {
    let inner = ExprKind::ALL
        .into_iter()
        .filter(|k| !k.is_leaf())
        .fold(ExprKindSet::EMPTY, |set, k| set | ExprKindSet::of(k));
    count_nodes_matching(root, inner)
}

/// Count nodes whose kind is in `kinds`.
pub fn count_nodes_matching(root: &Arc<Expr>, kinds: ExprKindSet) -> usize {
    let mut counter = KindCounter { kinds, count: 0 };
    walk(root, &mut counter);
    counter.count
}

/// Count nodes and compute maximum depth.
///
/// Returns `(total_nodes, max_depth)`, root at depth 0.
pub fn count_nodes_and_max_depth(root: &Arc<Expr>) -> (usize, usize) {
    struct Nothing;
    impl ExprWalker for Nothing {}

    let summary = walk(root, &mut Nothing);
    (summary.visits, summary.max_depth)
}

struct VariableCollector {
    vars: BTreeSet<Variable>,
}

impl ExprWalker for VariableCollector {
    fn enter_variable(&mut self, node: &Arc<Expr>, _at: Position) -> Flow {
        if let Expr::Variable(var) = &**node {
            self.vars.insert(var.clone());
        }
        Flow::Descend
    }
}

/// Collect all unique variables of an expression tree, sorted by name.
pub fn collect_variables(root: &Arc<Expr>) -> BTreeSet<Variable> {
    let mut collector = VariableCollector {
        vars: BTreeSet::new(),
    };
    walk(root, &mut collector);
    collector.vars
}
