//! Compiler-checked variant dispatch types.
//!
//! [`ExprKind`] names the concrete variant behind an opaque expression
//! reference. Generic algorithms (cost tables, kind filters) key on it
//! instead of on strings, so a new expression variant shows up as a missing
//! match arm rather than a silent fallthrough.

use crate::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ExprKind enum
// =============================================================================

/// One-to-one mapping to `Expr` discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExprKind {
    Constant = 0,
    Variable = 1,
    Addition = 2,
    Multiplication = 3,
    Subtraction = 4,
    Division = 5,
    Exponentiation = 6,
    Logarithm = 7,
    NaturalLogarithm = 8,
    ExponentialFunction = 9,
    Sine = 10,
    Comparison = 11,
    IfThenElse = 12,
}

impl ExprKind {
    /// Total number of variants (used for iteration bounds).
    pub const COUNT: usize = 13;

    /// Every kind, in discriminant order.
    pub const ALL: [ExprKind; ExprKind::COUNT] = [
        ExprKind::Constant,
        ExprKind::Variable,
        ExprKind::Addition,
        ExprKind::Multiplication,
        ExprKind::Subtraction,
        ExprKind::Division,
        ExprKind::Exponentiation,
        ExprKind::Logarithm,
        ExprKind::NaturalLogarithm,
        ExprKind::ExponentialFunction,
        ExprKind::Sine,
        ExprKind::Comparison,
        ExprKind::IfThenElse,
    ];

    /// Convert an `Expr` reference to its `ExprKind`.
    ///
    /// This is exhaustive — the compiler will reject a missing arm when
    /// `Expr` gains a new variant.
    #[inline]
    pub fn from_expr(expr: &Expr) -> Self {
        match expr {
            Expr::Constant(..) => Self::Constant,
            Expr::Variable(..) => Self::Variable,
            Expr::Addition(..) => Self::Addition,
            Expr::Multiplication(..) => Self::Multiplication,
            Expr::Subtraction(..) => Self::Subtraction,
            Expr::Division(..) => Self::Division,
            Expr::Exponentiation(..) => Self::Exponentiation,
            Expr::Logarithm(..) => Self::Logarithm,
            Expr::NaturalLogarithm(..) => Self::NaturalLogarithm,
            Expr::ExponentialFunction(..) => Self::ExponentialFunction,
            Expr::Sine(..) => Self::Sine,
            Expr::Comparison(..) => Self::Comparison,
            Expr::IfThenElse(..) => Self::IfThenElse,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Constant => "Constant",
            Self::Variable => "Variable",
            Self::Addition => "Addition",
            Self::Multiplication => "Multiplication",
            Self::Subtraction => "Subtraction",
            Self::Division => "Division",
            Self::Exponentiation => "Exponentiation",
            Self::Logarithm => "Logarithm",
            Self::NaturalLogarithm => "NaturalLogarithm",
            Self::ExponentialFunction => "ExponentialFunction",
            Self::Sine => "Sine",
            Self::Comparison => "Comparison",
            Self::IfThenElse => "IfThenElse",
        }
    }

    /// `true` for the variants without children.
    #[inline]
    pub const fn is_leaf(self) -> bool {
        matches!(self, Self::Constant | Self::Variable)
    }

    /// Fixed child count, `None` for n-ary variants.
    pub const fn arity(self) -> Option<usize> {
        match self {
            Self::Constant | Self::Variable => Some(0),
            Self::NaturalLogarithm | Self::ExponentialFunction | Self::Sine => Some(1),
            Self::Subtraction
            | Self::Division
            | Self::Exponentiation
            | Self::Logarithm
            | Self::Comparison => Some(2),
            Self::IfThenElse => Some(3),
            Self::Addition | Self::Multiplication => None,
        }
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ExprKindSet — bitflag set
// =============================================================================

/// A compact set of [`ExprKind`] values stored as a `u16` bitmask.
///
/// ```
/// use perfexpr_ast::{ExprKind, ExprKindSet};
///
/// let set = ExprKindSet::ADDITION | ExprKindSet::SUBTRACTION;
/// assert!(set.contains(ExprKind::Addition));
/// assert!(!set.contains(ExprKind::Division));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExprKindSet(u16);

impl ExprKindSet {
    pub const EMPTY: Self = Self(0);

    /// Every variant.
    pub const ALL: Self = Self((1u16 << ExprKind::COUNT) - 1);

    #[inline]
    pub const fn of(kind: ExprKind) -> Self {
        Self(1u16 << kind as u8)
    }

    #[inline]
    pub const fn contains(self, kind: ExprKind) -> bool {
        self.0 & (1u16 << kind as u8) != 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over all kinds in this set (low to high).
    pub fn iter(self) -> impl Iterator<Item = ExprKind> {
        let bits = self.0;
        ExprKind::ALL
            .into_iter()
            .filter(move |k| bits & (1u16 << *k as u8) != 0)
    }
}

impl std::ops::BitOr for ExprKindSet {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for ExprKindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(ExprKind::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

impl ExprKindSet {
    pub const CONSTANT: Self = Self::of(ExprKind::Constant);
    pub const VARIABLE: Self = Self::of(ExprKind::Variable);
    pub const ADDITION: Self = Self::of(ExprKind::Addition);
    pub const MULTIPLICATION: Self = Self::of(ExprKind::Multiplication);
    pub const SUBTRACTION: Self = Self::of(ExprKind::Subtraction);
    pub const DIVISION: Self = Self::of(ExprKind::Division);
    pub const EXPONENTIATION: Self = Self::of(ExprKind::Exponentiation);
    pub const LOGARITHM: Self = Self::of(ExprKind::Logarithm);
    pub const NATURAL_LOGARITHM: Self = Self::of(ExprKind::NaturalLogarithm);
    pub const EXPONENTIAL_FUNCTION: Self = Self::of(ExprKind::ExponentialFunction);
    pub const SINE: Self = Self::of(ExprKind::Sine);
    pub const COMPARISON: Self = Self::of(ExprKind::Comparison);
    pub const IF_THEN_ELSE: Self = Self::of(ExprKind::IfThenElse);

    /// Leaves: Constant + Variable
    pub const LEAVES: Self = Self(Self::CONSTANT.0 | Self::VARIABLE.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_discriminant_order() {
        for (i, kind) in ExprKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
        }
    }

    #[test]
    fn set_all_contains_every_kind() {
        for kind in ExprKind::ALL {
            assert!(ExprKindSet::ALL.contains(kind), "{kind}");
        }
        assert_eq!(ExprKindSet::ALL.iter().count(), ExprKind::COUNT);
    }

    #[test]
    fn set_display() {
        let set = ExprKindSet::SINE | ExprKindSet::CONSTANT;
        assert_eq!(set.to_string(), "{Constant, Sine}");
        assert_eq!(ExprKindSet::EMPTY.to_string(), "{}");
    }

    #[test]
    fn leaves_have_zero_arity() {
        for kind in ExprKindSet::LEAVES.iter() {
            assert!(kind.is_leaf());
            assert_eq!(kind.arity(), Some(0));
        }
        assert_eq!(ExprKind::Addition.arity(), None);
        assert_eq!(ExprKind::IfThenElse.arity(), Some(3));
    }
}
