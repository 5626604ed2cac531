//! Best-effort simplification of `Addition` trees.
//!
//! The simplifier is a client of the rewriting traversal. All of its logic
//! runs in the exit hook of `Addition`, so by the time a sum is looked at,
//! every summand below it is already in simplified form. Per sum it
//!
//! - promotes the summands of nested `Addition`s,
//! - folds all `Constant` summands into one running total,
//! - splits `Subtraction` summands into a positive minuend and a negative
//!   part (constant subtrahends fold into the total with flipped sign).
//!
//! The result evaluates like the input and never has more inner nodes.
//! A sum with nothing to flatten or fold is left as is.

use crate::options::SimplifyOptions;
use perfexpr_ast::{
    count_inner_nodes, rewrite_with_options, Expr, ExprCache, ExprRewriter, Flow, Slot,
};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

type Terms = SmallVec<[Arc<Expr>; 8]>;

/// What one `simplify_with_stats` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimplifyStats {
    /// Sums rewritten by the simplifier.
    pub rewrites: usize,
    pub inner_nodes_before: usize,
    pub inner_nodes_after: usize,
    /// Nodes entered by the traversal, rewritten nodes included.
    pub visits: usize,
}

pub struct Simplifier {
    cache: ExprCache,
    options: SimplifyOptions,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplifier {
    pub fn new() -> Self {
        Self::with_options(SimplifyOptions::default())
    }

    pub fn with_options(options: SimplifyOptions) -> Self {
        Self {
            cache: ExprCache::new(),
            options,
        }
    }

    pub fn options(&self) -> &SimplifyOptions {
        &self.options
    }

    /// Cache the folded constants come from. Shared across calls until it
    /// outgrows [`SimplifyOptions::max_cached_leaves`].
    pub fn cache(&self) -> &ExprCache {
        &self.cache
    }

    /// Drops every cached leaf. Results already handed out stay valid.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Returns an equivalent expression with flattened sums.
    ///
    /// The result is the input `Arc` itself when nothing could be simplified.
    pub fn simplify(&mut self, expr: &Arc<Expr>) -> Arc<Expr> {
        self.simplify_with_stats(expr).0
    }

    pub fn simplify_with_stats(&mut self, expr: &Arc<Expr>) -> (Arc<Expr>, SimplifyStats) {
        let inner_nodes_before = count_inner_nodes(expr);
        let mut flattener = AdditionFlattener {
            cache: &mut self.cache,
            intern_constants: self.options.intern_constants,
            rewrites: 0,
        };
        let outcome = rewrite_with_options(expr, &mut flattener, &self.options.rewrite);
        let stats = SimplifyStats {
            rewrites: flattener.rewrites,
            inner_nodes_before,
            inner_nodes_after: count_inner_nodes(&outcome.expr),
            visits: outcome.visits,
        };
        debug!(
            rewrites = stats.rewrites,
            before = stats.inner_nodes_before,
            after = stats.inner_nodes_after,
            "simplified expression"
        );
        if self.cache.len() > self.options.max_cached_leaves {
            debug!(
                cached = self.cache.len(),
                limit = self.options.max_cached_leaves,
                "clearing leaf cache"
            );
            self.cache.clear();
        }
        (outcome.expr, stats)
    }
}

/// Summands of one sum, split up while flattening.
#[derive(Default)]
struct SumParts {
    total: f64,
    constants: usize,
    positive: Terms,
    negative: Terms,
    flattened: bool,
}

impl SumParts {
    fn absorb(&mut self, term: &Arc<Expr>) {
        match &**term {
            Expr::Constant(value) => {
                self.total += value;
                self.constants += 1;
            }
            Expr::Addition(summands) => {
                self.flattened = true;
                for summand in summands {
                    self.absorb(summand);
                }
            }
            Expr::Subtraction(minuend, subtrahend) => {
                self.flattened = true;
                self.absorb(minuend);
                match &**subtrahend {
                    Expr::Constant(value) => {
                        self.total -= value;
                        self.constants += 1;
                    }
                    // Already flat: its exit hook ran before ours
                    Expr::Addition(summands) => self.negative.extend(summands.iter().cloned()),
                    _ => self.negative.push(Arc::clone(subtrahend)),
                }
            }
            _ => self.positive.push(Arc::clone(term)),
        }
    }

    fn changed(&self) -> bool {
        self.flattened || self.constants > 1
    }
}

struct AdditionFlattener<'c> {
    cache: &'c mut ExprCache,
    intern_constants: bool,
    rewrites: usize,
}

impl AdditionFlattener<'_> {
    fn constant(&mut self, value: f64) -> Arc<Expr> {
        if self.intern_constants {
            self.cache.constant(value)
        } else {
            Expr::constant(value)
        }
    }

    /// Sum of `terms`; a single term stands for itself, no term is zero.
    fn sum_of(terms: Terms) -> Arc<Expr> {
        let mut terms = terms.into_iter();
        match (terms.next(), terms.next()) {
            (Some(first), Some(second)) => Expr::addition_with(first, second, terms),
            (Some(single), None) => single,
            (None, _) => Expr::constant(0.0),
        }
    }

    fn merge(&mut self, summands: &[Arc<Expr>]) -> Option<Arc<Expr>> {
        let mut parts = SumParts::default();
        for summand in summands {
            parts.absorb(summand);
        }
        if !parts.changed() {
            return None;
        }

        let mut terms = Terms::new();
        if parts.constants > 0 || parts.positive.is_empty() {
            terms.push(self.constant(parts.total));
        }
        terms.extend(parts.positive);
        let sum = Self::sum_of(terms);

        let merged = if parts.negative.is_empty() {
            sum
        } else {
            Expr::subtraction(sum, Self::sum_of(parts.negative))
        };
        Some(merged)
    }
}

impl ExprRewriter for AdditionFlattener<'_> {
    fn exit_addition(&mut self, slot: &mut Slot) -> Flow {
        let node = Arc::clone(slot.node());
        if let Expr::Addition(summands) = &*node {
            if let Some(merged) = self.merge(summands) {
                debug!(
                    depth = slot.position().depth,
                    before = %node,
                    after = %merged,
                    "flattened addition"
                );
                self.rewrites += 1;
                slot.replace(merged);
            }
        }
        Flow::Descend
    }
}
