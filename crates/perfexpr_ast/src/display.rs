//! Display formatting for expressions.
//!
//! The rendering is canonical for a given tree (same tree, same string) but
//! is not meant to be parsed back. Parentheses follow operator precedence;
//! nested sums and products keep their parentheses so the tree shape stays
//! visible.
//!
//! Formatting recurses once per tree level. Depths up to
//! [`RECURSIVE_DEPTH_LIMIT`](crate::RECURSIVE_DEPTH_LIMIT) are supported on
//! a default thread stack.

use crate::expression::Expr;
use std::fmt;
use std::sync::Arc;

const PREC_COMPARISON: u8 = 1;
const PREC_SUM: u8 = 2;
const PREC_PRODUCT: u8 = 3;
const PREC_POWER: u8 = 4;
const PREC_ATOM: u8 = 9;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Comparison(..) => PREC_COMPARISON,
        Expr::Addition(_) | Expr::Subtraction(..) => PREC_SUM,
        Expr::Multiplication(_) | Expr::Division(..) => PREC_PRODUCT,
        Expr::Exponentiation(..) => PREC_POWER,
        // Negative literals read like a unary minus; wrap them when nested.
        Expr::Constant(v) if v.is_sign_negative() && !v.is_nan() => 0,
        Expr::Constant(_)
        | Expr::Variable(_)
        | Expr::Logarithm(..)
        | Expr::NaturalLogarithm(_)
        | Expr::ExponentialFunction(_)
        | Expr::Sine(_)
        | Expr::IfThenElse(..) => PREC_ATOM,
    }
}

/// Writes `child`, wrapped in parentheses when its precedence is below
/// `min_prec`.
fn write_operand(f: &mut fmt::Formatter<'_>, child: &Arc<Expr>, min_prec: u8) -> fmt::Result {
    if precedence(child) < min_prec {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

fn write_infix(
    f: &mut fmt::Formatter<'_>,
    lhs: &Arc<Expr>,
    op: &str,
    rhs: &Arc<Expr>,
    lhs_min: u8,
    rhs_min: u8,
) -> fmt::Result {
    write_operand(f, lhs, lhs_min)?;
    f.write_str(op)?;
    write_operand(f, rhs, rhs_min)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(v) => write!(f, "{}", v),
            Expr::Variable(var) => write!(f, "{}", var),
            Expr::Addition(ops) | Expr::Multiplication(ops) => {
                let (op, prec) = if matches!(self, Expr::Addition(_)) {
                    (" + ", PREC_SUM)
                } else {
                    (" * ", PREC_PRODUCT)
                };
                for (i, child) in ops.iter().enumerate() {
                    if i > 0 {
                        f.write_str(op)?;
                    }
                    write_operand(f, child, prec + 1)?;
                }
                Ok(())
            }
            // Left-associative: the right operand needs parens at equal precedence.
            Expr::Subtraction(l, r) => write_infix(f, l, " - ", r, PREC_SUM, PREC_SUM + 1),
            Expr::Division(l, r) => write_infix(f, l, " / ", r, PREC_PRODUCT, PREC_PRODUCT + 1),
            // Right-associative: the base needs parens at equal precedence.
            Expr::Exponentiation(b, e) => write_infix(f, b, "^", e, PREC_POWER + 1, PREC_POWER),
            Expr::Comparison(l, r) => write_infix(
                f,
                l,
                " < ",
                r,
                PREC_COMPARISON + 1,
                PREC_COMPARISON + 1,
            ),
            Expr::Logarithm(base, anti) => write!(f, "log({}, {})", base, anti),
            Expr::NaturalLogarithm(e) => write!(f, "ln({})", e),
            Expr::ExponentialFunction(e) => write!(f, "exp({})", e),
            Expr::Sine(e) => write!(f, "sin({})", e),
            Expr::IfThenElse(c, t, e) => write!(f, "ifzero({}, {}, {})", c, t, e),
        }
    }
}
