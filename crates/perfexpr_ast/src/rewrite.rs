//! Rewriting traversal: a depth-first walk whose hooks may replace the node
//! they are visiting.
//!
//! The walk is a bottom-up fold. Every position yields its (possibly new)
//! node; a parent whose children came back as different instances is
//! rebuilt as a new node of the same variant through
//! [`Expr::map_children`], and that in turn makes its own parent rebuild, up
//! to the root. Subtrees that were not touched keep their instances, and a
//! walk without replacements returns the very same root `Arc`. The fold runs
//! on an explicit frame stack, so tree depth is not bounded by the thread's
//! stack.
//!
//! Replacement semantics:
//!
//! - In an enter hook: the replacement is entered in place of the original
//!   (visit counter increments, its enter hook fires) and its children are
//!   walked instead of the original's.
//! - In an exit hook: the replacement's exit hook fires. Its children are not
//!   walked again.
//! - A replacement equal to the visited node is ignored.
//! - A `Flow::Prune` returned by any hook of a phase holds for the whole
//!   phase: a later hook on a replacement cannot take it back. Pruning on
//!   enter skips the final node's children; pruning on exit skips the
//!   remaining siblings, which keep their instances.
//! - A position accepts at most [`RewriteOptions::max_redirects_per_node`]
//!   replacements per phase; further ones are dropped with a warning.

use crate::expression::Expr;
use crate::walker::{ExprRewriter, Flow, Position, Slot};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{trace, warn};

/// Knobs of the rewriting traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Consecutive replacements a single position accepts in one phase.
    pub max_redirects_per_node: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            max_redirects_per_node: 64,
        }
    }
}

/// Result of [`rewrite_with_options`].
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub expr: Arc<Expr>,
    /// Entered nodes, replacements that were entered included.
    pub visits: usize,
    /// Accepted replacements.
    pub replacements: usize,
    pub max_depth: usize,
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        self.replacements > 0
    }
}

struct RewriteState<'o> {
    options: &'o RewriteOptions,
    visits: usize,
    replacements: usize,
    max_depth: usize,
}

/// One position whose children are still being rewritten.
struct RewriteFrame {
    node: Arc<Expr>,
    at: Position,
    children: SmallVec<[Arc<Expr>; 4]>,
    results: SmallVec<[Arc<Expr>; 4]>,
    pruned: bool,
}

impl RewriteFrame {
    fn next_child(&self) -> Option<&Arc<Expr>> {
        if self.pruned {
            return None;
        }
        self.children.get(self.results.len())
    }

    /// The frame's node with its rewritten children; the node itself if
    /// every child came back as the same instance.
    fn rebuild(self) -> Arc<Expr> {
        let mut results = self.results.into_iter();
        match self
            .node
            .map_children(|child| results.next().unwrap_or_else(|| Arc::clone(child)))
        {
            Some(rebuilt) => {
                trace!(depth = self.at.depth, kind = %rebuilt.kind(), "rebuilt ancestor");
                Arc::new(rebuilt)
            }
            None => self.node,
        }
    }
}

impl RewriteState<'_> {
    fn run<R: ExprRewriter + ?Sized>(&mut self, root: &Arc<Expr>, rewriter: &mut R) -> Arc<Expr> {
        let mut stack: Vec<RewriteFrame> = Vec::new();
        let mut pending = Some((Arc::clone(root), 0));
        let mut finished: Option<(Arc<Expr>, Flow)> = None;

        loop {
            if let Some((node, depth)) = pending.take() {
                self.max_depth = self.max_depth.max(depth);
                let (current, at, flow) = self.enter_phase(node, depth, rewriter);
                let children = match flow {
                    Flow::Descend => current.children().into_iter().cloned().collect(),
                    Flow::Prune => SmallVec::new(),
                };
                stack.push(RewriteFrame {
                    node: current,
                    at,
                    children,
                    results: SmallVec::new(),
                    pruned: false,
                });
            }

            let Some(frame) = stack.last_mut() else {
                break;
            };
            if let Some((child, flow)) = finished.take() {
                frame.results.push(child);
                // Remaining siblings keep their instances.
                frame.pruned |= flow == Flow::Prune;
            }
            if let Some(child) = frame.next_child() {
                pending = Some((Arc::clone(child), frame.at.depth + 1));
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            let at = done.at;
            let node = done.rebuild();
            finished = Some(self.exit_phase(node, at, rewriter));
        }

        match finished {
            Some((expr, _)) => expr,
            None => Arc::clone(root),
        }
    }

    fn enter_phase<R: ExprRewriter + ?Sized>(
        &mut self,
        node: Arc<Expr>,
        depth: usize,
        rewriter: &mut R,
    ) -> (Arc<Expr>, Position, Flow) {
        let mut current = node;
        let mut redirects = 0;
        let mut flow = Flow::Descend;
        loop {
            self.visits += 1;
            let at = Position {
                depth,
                visit: self.visits,
            };
            let mut slot = Slot::new(Arc::clone(&current), at, redirects);
            flow = flow.or(rewriter.enter(&mut slot));
            match slot.into_replacement() {
                None => return (current, at, flow),
                Some(new) if redirects < self.options.max_redirects_per_node => {
                    trace!(depth, from = %current, to = %new, "replaced on enter");
                    self.replacements += 1;
                    redirects += 1;
                    current = new;
                }
                Some(new) => {
                    warn!(
                        depth,
                        limit = self.options.max_redirects_per_node,
                        dropped = %new,
                        "redirect limit reached on enter, keeping current node"
                    );
                    return (current, at, flow);
                }
            }
        }
    }

    fn exit_phase<R: ExprRewriter + ?Sized>(
        &mut self,
        node: Arc<Expr>,
        at: Position,
        rewriter: &mut R,
    ) -> (Arc<Expr>, Flow) {
        let mut current = node;
        let mut redirects = 0;
        let mut flow = Flow::Descend;
        loop {
            let mut slot = Slot::new(Arc::clone(&current), at, redirects);
            flow = flow.or(rewriter.exit(&mut slot));
            match slot.into_replacement() {
                None => return (current, flow),
                Some(new) if redirects < self.options.max_redirects_per_node => {
                    trace!(depth = at.depth, from = %current, to = %new, "replaced on exit");
                    self.replacements += 1;
                    redirects += 1;
                    current = new;
                }
                Some(new) => {
                    warn!(
                        depth = at.depth,
                        limit = self.options.max_redirects_per_node,
                        dropped = %new,
                        "redirect limit reached on exit, keeping current node"
                    );
                    return (current, flow);
                }
            }
        }
    }
}

/// Walks `root` with `rewriter` and returns the resulting root.
///
/// The result is the same `Arc` as `root` when no hook replaced anything.
pub fn rewrite<R: ExprRewriter + ?Sized>(root: &Arc<Expr>, rewriter: &mut R) -> Arc<Expr> {
    rewrite_with_options(root, rewriter, &RewriteOptions::default()).expr
}

pub fn rewrite_with_options<R: ExprRewriter + ?Sized>(
    root: &Arc<Expr>,
    rewriter: &mut R,
    options: &RewriteOptions,
) -> RewriteOutcome {
    let mut state = RewriteState {
        options,
        visits: 0,
        replacements: 0,
        max_depth: 0,
    };
    let expr = state.run(root, rewriter);
    RewriteOutcome {
        expr,
        visits: state.visits,
        replacements: state.replacements,
        max_depth: state.max_depth,
    }
}

struct Substitution<'a> {
    target: &'a Expr,
    replacement: &'a Arc<Expr>,
}

impl ExprRewriter for Substitution<'_> {
    fn enter_fallback(&mut self, slot: &mut Slot) -> Flow {
        // Inserted replacements are not searched again.
        if slot.redirects() > 0 {
            return Flow::Prune;
        }
        if **slot.node() == *self.target {
            slot.replace(Arc::clone(self.replacement));
        }
        Flow::Descend
    }
}

/// Replaces every structural occurrence of `target` in `root` with
/// `replacement`. Occurrences inside an inserted `replacement` are left
/// alone.
pub fn substitute(root: &Arc<Expr>, target: &Expr, replacement: &Arc<Expr>) -> Arc<Expr> {
    rewrite(
        root,
        &mut Substitution {
            target,
            replacement,
        },
    )
}
