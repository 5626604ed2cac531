//! Leaf interning.
//!
//! Rewrites tend to create the same small leaves over and over (folded
//! constants, substituted variables). [`ExprCache`] hands out one shared
//! instance per distinct constant bit pattern and per variable name, so
//! repeated leaves share storage and compare by pointer first.

use crate::expression::{Expr, Variable};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Lookup counters of an [`ExprCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Requests answered with an existing instance.
    pub hits: usize,
    /// Leaves allocated because no instance existed yet.
    pub nodes_created: usize,
}

impl CacheStats {
    pub fn lookups(&self) -> usize {
        self.hits + self.nodes_created
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExprCache {
    constants: FxHashMap<u64, Arc<Expr>>,
    variables: FxHashMap<Variable, Arc<Expr>>,
    stats: CacheStats,
}

impl ExprCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared `Constant` leaf for `value`, keyed by its bit pattern.
    pub fn constant(&mut self, value: f64) -> Arc<Expr> {
        if let Some(node) = self.constants.get(&value.to_bits()) {
            self.stats.hits += 1;
            return Arc::clone(node);
        }
        let node = Expr::constant(value);
        self.constants.insert(value.to_bits(), Arc::clone(&node));
        self.stats.nodes_created += 1;
        node
    }

    /// Shared `Variable` leaf named `name`.
    pub fn variable(&mut self, name: impl Into<Variable>) -> Arc<Expr> {
        let var = name.into();
        if let Some(node) = self.variables.get(&var) {
            self.stats.hits += 1;
            return Arc::clone(node);
        }
        let node = Expr::variable(var.clone());
        self.variables.insert(var, Arc::clone(&node));
        self.stats.nodes_created += 1;
        node
    }

    /// Returns the cached instance for a leaf equal to `expr`, registering
    /// `expr` itself when there is none. Inner nodes are returned unchanged.
    pub fn intern(&mut self, expr: &Arc<Expr>) -> Arc<Expr> {
        match &**expr {
            Expr::Constant(value) => self.intern_entry(CacheKey::Constant(value.to_bits()), expr),
            Expr::Variable(var) => self.intern_entry(CacheKey::Variable(var), expr),
            _ => Arc::clone(expr),
        }
    }

    fn intern_entry(&mut self, key: CacheKey<'_>, expr: &Arc<Expr>) -> Arc<Expr> {
        let existing = match key {
            CacheKey::Constant(bits) => self.constants.get(&bits),
            CacheKey::Variable(var) => self.variables.get(var),
        };
        if let Some(node) = existing {
            self.stats.hits += 1;
            return Arc::clone(node);
        }
        match key {
            CacheKey::Constant(bits) => {
                self.constants.insert(bits, Arc::clone(expr));
            }
            CacheKey::Variable(var) => {
                self.variables.insert(var.clone(), Arc::clone(expr));
            }
        }
        self.stats.nodes_created += 1;
        Arc::clone(expr)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of distinct cached leaves.
    pub fn len(&self) -> usize {
        self.constants.len() + self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.constants.clear();
        self.variables.clear();
        self.stats = CacheStats::default();
    }
}

#[derive(Clone, Copy)]
enum CacheKey<'a> {
    Constant(u64),
    Variable(&'a Variable),
}
