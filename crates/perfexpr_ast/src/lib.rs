//! Evaluable expression trees and the machinery to walk and rewrite them.
//!
//! - [`Expr`]: immutable, reference-counted expression nodes.
//! - [`walk`] with an [`ExprWalker`]: read-only depth-first traversal.
//! - [`rewrite`] with an [`ExprRewriter`]: traversal whose hooks may replace
//!   nodes; unchanged subtrees are shared with the input tree.
//! - [`VariableAssignment`]: variable values for [`Expr::evaluate`].
//!
//! Walking, rewriting, evaluating and dropping use explicit stacks and take
//! trees of any depth. Formatting, structural equality and hashing recurse;
//! see [`RECURSIVE_DEPTH_LIMIT`].

pub mod assignment;
pub mod display;
pub mod equality;
pub mod error;
pub mod expression;
pub mod interner;
pub mod kind;
pub mod rewrite;
pub mod traversal;
pub mod walker;

/// Deepest tree the recursive operations (`Display`, `PartialEq`, `Hash`)
/// are tested against on a default 2 MiB thread stack.
pub const RECURSIVE_DEPTH_LIMIT: usize = 1_000;

pub use assignment::VariableAssignment;
pub use error::{AstError, EvalError};
pub use expression::{Expr, Operands, Variable};
pub use interner::{CacheStats, ExprCache};
pub use kind::{ExprKind, ExprKindSet};
pub use rewrite::{rewrite, rewrite_with_options, substitute, RewriteOptions, RewriteOutcome};
pub use traversal::{
    collect_variables, count_inner_nodes, count_nodes, count_nodes_and_max_depth,
    count_nodes_matching, walk, WalkSummary,
};
pub use walker::{ExprRewriter, ExprWalker, Flow, Position, Slot};
