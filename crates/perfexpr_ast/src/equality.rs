//! Structural equality and hashing for [`Expr`].
//!
//! - `Constant` compares by IEEE bit pattern (`NaN == NaN`, `0.0 != -0.0`).
//! - `Addition`/`Multiplication` compare their operands as a multiset:
//!   order is ignored, multiplicity is not.
//! - Every other variant compares children pairwise in constructor order.
//!
//! The n-ary hash combines per-operand hashes with a commutative sum so it
//! stays consistent with the multiset equality.
//!
//! Comparing and hashing recurse once per tree level. Depths up to
//! [`RECURSIVE_DEPTH_LIMIT`](crate::RECURSIVE_DEPTH_LIMIT) are supported on
//! a default thread stack.

use crate::expression::{Expr, Operands};
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[inline]
fn same(a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
    Arc::ptr_eq(a, b) || **a == **b
}

fn same_multiset(a: &Operands, b: &Operands) -> bool {
    if a.len() != b.len() {
        return false;
    }
    // Fast path: identical order
    if a.iter().zip(b.iter()).all(|(x, y)| same(x, y)) {
        return true;
    }
    let mut used: SmallVec<[bool; 8]> = SmallVec::from_elem(false, b.len());
    'outer: for x in a.iter() {
        for (j, y) in b.iter().enumerate() {
            if !used[j] && same(x, y) {
                used[j] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        use Expr::*;
        match (self, other) {
            (Constant(a), Constant(b)) => a.to_bits() == b.to_bits(),
            (Variable(a), Variable(b)) => a == b,
            (Addition(a), Addition(b)) | (Multiplication(a), Multiplication(b)) => {
                same_multiset(a, b)
            }
            (Subtraction(l1, r1), Subtraction(l2, r2))
            | (Division(l1, r1), Division(l2, r2))
            | (Exponentiation(l1, r1), Exponentiation(l2, r2))
            | (Logarithm(l1, r1), Logarithm(l2, r2))
            | (Comparison(l1, r1), Comparison(l2, r2)) => same(l1, l2) && same(r1, r2),
            (NaturalLogarithm(a), NaturalLogarithm(b))
            | (ExponentialFunction(a), ExponentialFunction(b))
            | (Sine(a), Sine(b)) => same(a, b),
            (IfThenElse(c1, t1, e1), IfThenElse(c2, t2, e2)) => {
                same(c1, c2) && same(t1, t2) && same(e1, e2)
            }
            _ => false,
        }
    }
}

impl Eq for Expr {}

fn operand_hash(expr: &Expr) -> u64 {
    let mut hasher = FxHasher::default();
    expr.hash(&mut hasher);
    hasher.finish()
}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.kind() as u8).hash(state);
        match self {
            Expr::Constant(value) => value.to_bits().hash(state),
            Expr::Variable(var) => var.hash(state),
            Expr::Addition(ops) | Expr::Multiplication(ops) => {
                ops.len().hash(state);
                ops.iter()
                    .fold(0u64, |acc, op| acc.wrapping_add(operand_hash(op)))
                    .hash(state);
            }
            _ => {
                for child in self.children() {
                    child.hash(state);
                }
            }
        }
    }
}
