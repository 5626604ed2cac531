//! Hook surfaces for walking expression trees.
//!
//! [`ExprWalker`] observes a tree; [`ExprRewriter`] may additionally replace
//! the node it is looking at. Both only define *what* a client sees. The
//! descent itself lives in [`crate::traversal::walk`] and
//! [`crate::rewrite::rewrite`].
//!
//! Every variant has an enter hook and an exit hook. Unless overridden they
//! forward to `enter_fallback` / `exit_fallback`, so a client can override
//! the fallback once to handle "everything else".

use crate::expression::Expr;
use crate::kind::ExprKind;
use std::sync::Arc;

/// Where the traversal currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Distance from the root (root = 0).
    pub depth: usize,
    /// Running count of entered nodes across the whole walk (root = 1).
    pub visit: usize,
}

/// Descent control returned by every hook.
///
/// From an enter hook, `Prune` skips the children of the current node.
/// From an exit hook, `Prune` skips the remaining siblings, i.e. the
/// parent's children after the current one. Exit hooks always fire for
/// entered nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Descend,
    Prune,
}

impl Flow {
    /// `Prune` if either side prunes.
    pub fn or(self, other: Flow) -> Flow {
        if self == Flow::Prune || other == Flow::Prune {
            Flow::Prune
        } else {
            Flow::Descend
        }
    }
}

pub trait ExprWalker {
    fn enter_fallback(&mut self, _node: &Arc<Expr>, _at: Position) -> Flow {
        Flow::Descend
    }
    fn exit_fallback(&mut self, _node: &Arc<Expr>, _at: Position) -> Flow {
        Flow::Descend
    }

    fn enter_constant(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_constant(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_variable(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_variable(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_addition(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_addition(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_multiplication(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_multiplication(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_subtraction(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_subtraction(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_division(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_division(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_exponentiation(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_exponentiation(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_logarithm(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_logarithm(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_natural_logarithm(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_natural_logarithm(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_exponential_function(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_exponential_function(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_sine(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_sine(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_comparison(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_comparison(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    fn enter_if_then_else(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at)
    }
    fn exit_if_then_else(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exit_fallback(node, at)
    }

    /// Routes to the enter hook of `node`'s variant.
    fn enter(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        match node.kind() {
            ExprKind::Constant => self.enter_constant(node, at),
            ExprKind::Variable => self.enter_variable(node, at),
            ExprKind::Addition => self.enter_addition(node, at),
            ExprKind::Multiplication => self.enter_multiplication(node, at),
            ExprKind::Subtraction => self.enter_subtraction(node, at),
            ExprKind::Division => self.enter_division(node, at),
            ExprKind::Exponentiation => self.enter_exponentiation(node, at),
            ExprKind::Logarithm => self.enter_logarithm(node, at),
            ExprKind::NaturalLogarithm => self.enter_natural_logarithm(node, at),
            ExprKind::ExponentialFunction => self.enter_exponential_function(node, at),
            ExprKind::Sine => self.enter_sine(node, at),
            ExprKind::Comparison => self.enter_comparison(node, at),
            ExprKind::IfThenElse => self.enter_if_then_else(node, at),
        }
    }

    /// Routes to the exit hook of `node`'s variant.
    fn exit(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        match node.kind() {
            ExprKind::Constant => self.exit_constant(node, at),
            ExprKind::Variable => self.exit_variable(node, at),
            ExprKind::Addition => self.exit_addition(node, at),
            ExprKind::Multiplication => self.exit_multiplication(node, at),
            ExprKind::Subtraction => self.exit_subtraction(node, at),
            ExprKind::Division => self.exit_division(node, at),
            ExprKind::Exponentiation => self.exit_exponentiation(node, at),
            ExprKind::Logarithm => self.exit_logarithm(node, at),
            ExprKind::NaturalLogarithm => self.exit_natural_logarithm(node, at),
            ExprKind::ExponentialFunction => self.exit_exponential_function(node, at),
            ExprKind::Sine => self.exit_sine(node, at),
            ExprKind::Comparison => self.exit_comparison(node, at),
            ExprKind::IfThenElse => self.exit_if_then_else(node, at),
        }
    }
}

// =============================================================================
// Rewriting hooks
// =============================================================================

/// The node a rewriting hook is looking at, plus the ability to swap it.
#[derive(Debug)]
pub struct Slot {
    node: Arc<Expr>,
    at: Position,
    redirects: usize,
    replacement: Option<Arc<Expr>>,
}

impl Slot {
    pub(crate) fn new(node: Arc<Expr>, at: Position, redirects: usize) -> Self {
        Self {
            node,
            at,
            redirects,
            replacement: None,
        }
    }

    /// The node currently visited at this position.
    pub fn node(&self) -> &Arc<Expr> {
        &self.node
    }

    pub fn position(&self) -> Position {
        self.at
    }

    /// How many replacements this position has already gone through during
    /// the current enter (or exit) phase. Zero for the original node.
    pub fn redirects(&self) -> usize {
        self.redirects
    }

    /// Replaces the visited node. The last call in a hook wins; a
    /// replacement structurally equal to the node is ignored.
    pub fn replace(&mut self, with: Arc<Expr>) {
        self.replacement = Some(with);
    }

    pub fn is_replaced(&self) -> bool {
        self.replacement.is_some()
    }

    pub(crate) fn into_replacement(self) -> Option<Arc<Expr>> {
        let node = self.node;
        self.replacement
            .filter(|new| !Arc::ptr_eq(new, &node) && **new != *node)
    }
}

pub trait ExprRewriter {
    fn enter_fallback(&mut self, _slot: &mut Slot) -> Flow {
        Flow::Descend
    }
    fn exit_fallback(&mut self, _slot: &mut Slot) -> Flow {
        Flow::Descend
    }

    fn enter_constant(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_constant(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_variable(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_variable(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_addition(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_addition(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_multiplication(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_multiplication(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_subtraction(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_subtraction(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_division(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_division(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_exponentiation(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_exponentiation(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_logarithm(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_logarithm(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_natural_logarithm(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_natural_logarithm(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_exponential_function(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_exponential_function(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_sine(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_sine(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_comparison(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_comparison(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    fn enter_if_then_else(&mut self, slot: &mut Slot) -> Flow {
        self.enter_fallback(slot)
    }
    fn exit_if_then_else(&mut self, slot: &mut Slot) -> Flow {
        self.exit_fallback(slot)
    }

    /// Routes to the enter hook of the slot's variant.
    fn enter(&mut self, slot: &mut Slot) -> Flow {
        match slot.node().kind() {
            ExprKind::Constant => self.enter_constant(slot),
            ExprKind::Variable => self.enter_variable(slot),
            ExprKind::Addition => self.enter_addition(slot),
            ExprKind::Multiplication => self.enter_multiplication(slot),
            ExprKind::Subtraction => self.enter_subtraction(slot),
            ExprKind::Division => self.enter_division(slot),
            ExprKind::Exponentiation => self.enter_exponentiation(slot),
            ExprKind::Logarithm => self.enter_logarithm(slot),
            ExprKind::NaturalLogarithm => self.enter_natural_logarithm(slot),
            ExprKind::ExponentialFunction => self.enter_exponential_function(slot),
            ExprKind::Sine => self.enter_sine(slot),
            ExprKind::Comparison => self.enter_comparison(slot),
            ExprKind::IfThenElse => self.enter_if_then_else(slot),
        }
    }

    /// Routes to the exit hook of the slot's variant.
    fn exit(&mut self, slot: &mut Slot) -> Flow {
        match slot.node().kind() {
            ExprKind::Constant => self.exit_constant(slot),
            ExprKind::Variable => self.exit_variable(slot),
            ExprKind::Addition => self.exit_addition(slot),
            ExprKind::Multiplication => self.exit_multiplication(slot),
            ExprKind::Subtraction => self.exit_subtraction(slot),
            ExprKind::Division => self.exit_division(slot),
            ExprKind::Exponentiation => self.exit_exponentiation(slot),
            ExprKind::Logarithm => self.exit_logarithm(slot),
            ExprKind::NaturalLogarithm => self.exit_natural_logarithm(slot),
            ExprKind::ExponentialFunction => self.exit_exponential_function(slot),
            ExprKind::Sine => self.exit_sine(slot),
            ExprKind::Comparison => self.exit_comparison(slot),
            ExprKind::IfThenElse => self.exit_if_then_else(slot),
        }
    }
}
