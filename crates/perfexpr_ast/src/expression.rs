//! The evaluable expression language.
//!
//! Expressions are immutable trees of reference-counted nodes. "Editing" a
//! tree always builds a new root; untouched subtrees are shared between the
//! old and the new tree.

use crate::assignment::VariableAssignment;
use crate::error::{AstError, EvalError};
use crate::kind::ExprKind;
use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

/// A named free variable. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Variable(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Variable::new(name)
    }
}

impl From<String> for Variable {
    fn from(name: String) -> Self {
        Variable(name)
    }
}

/// Operand collection of the n-ary variants. Always holds at least two
/// expressions; duplicates are kept and the order is the traversal order.
#[derive(Debug, Clone)]
pub struct Operands(Vec<Arc<Expr>>);

impl Operands {
    fn new(kind: ExprKind, items: Vec<Arc<Expr>>) -> Result<Self, AstError> {
        if items.len() < 2 {
            return Err(AstError::TooFewOperands {
                kind,
                found: items.len(),
            });
        }
        Ok(Operands(items))
    }

    pub fn to_vec(&self) -> Vec<Arc<Expr>> {
        self.0.clone()
    }
}

impl Deref for Operands {
    type Target = [Arc<Expr>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Operands {
    type Item = &'a Arc<Expr>;
    type IntoIter = std::slice::Iter<'a, Arc<Expr>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A node of the evaluable expression language.
///
/// Binary and ternary variants keep their constructor argument order, which
/// is also the order children are walked in.
#[derive(Debug, Clone)]
pub enum Expr {
    Constant(f64),
    Variable(Variable),
    Addition(Operands),
    Multiplication(Operands),
    /// (minuend, subtrahend)
    Subtraction(Arc<Expr>, Arc<Expr>),
    /// (dividend, divisor)
    Division(Arc<Expr>, Arc<Expr>),
    /// (base, exponent)
    Exponentiation(Arc<Expr>, Arc<Expr>),
    /// (base, antilogarithm)
    Logarithm(Arc<Expr>, Arc<Expr>),
    NaturalLogarithm(Arc<Expr>),
    /// e raised to the operand
    ExponentialFunction(Arc<Expr>),
    Sine(Arc<Expr>),
    /// (smaller, greater): 1.0 if smaller < greater, else 0.0
    Comparison(Arc<Expr>, Arc<Expr>),
    /// (condition, then, else): a condition of exactly 0.0 selects `then`
    IfThenElse(Arc<Expr>, Arc<Expr>, Arc<Expr>),
}

// Constructors
impl Expr {
    pub fn constant(value: f64) -> Arc<Self> {
        Arc::new(Expr::Constant(value))
    }

    pub fn variable(name: impl Into<Variable>) -> Arc<Self> {
        Arc::new(Expr::Variable(name.into()))
    }

    /// Sum of `summands`; fails with fewer than two.
    pub fn addition(
        summands: impl IntoIterator<Item = Arc<Expr>>,
    ) -> Result<Arc<Self>, AstError> {
        let ops = Operands::new(ExprKind::Addition, summands.into_iter().collect())?;
        Ok(Arc::new(Expr::Addition(ops)))
    }

    /// Sum of `first`, `second` and `rest`. Cannot fail: two summands are
    /// always there.
    pub fn addition_with(
        first: Arc<Expr>,
        second: Arc<Expr>,
        rest: impl IntoIterator<Item = Arc<Expr>>,
    ) -> Arc<Self> {
        let mut items = vec![first, second];
        items.extend(rest);
        Arc::new(Expr::Addition(Operands(items)))
    }

    /// Product of `factors`; fails with fewer than two.
    pub fn multiplication(
        factors: impl IntoIterator<Item = Arc<Expr>>,
    ) -> Result<Arc<Self>, AstError> {
        let ops = Operands::new(ExprKind::Multiplication, factors.into_iter().collect())?;
        Ok(Arc::new(Expr::Multiplication(ops)))
    }

    pub fn subtraction(minuend: Arc<Expr>, subtrahend: Arc<Expr>) -> Arc<Self> {
        Arc::new(Expr::Subtraction(minuend, subtrahend))
    }

    pub fn division(dividend: Arc<Expr>, divisor: Arc<Expr>) -> Arc<Self> {
        Arc::new(Expr::Division(dividend, divisor))
    }

    pub fn exponentiation(base: Arc<Expr>, exponent: Arc<Expr>) -> Arc<Self> {
        Arc::new(Expr::Exponentiation(base, exponent))
    }

    pub fn logarithm(base: Arc<Expr>, antilogarithm: Arc<Expr>) -> Arc<Self> {
        Arc::new(Expr::Logarithm(base, antilogarithm))
    }

    pub fn natural_logarithm(antilogarithm: Arc<Expr>) -> Arc<Self> {
        Arc::new(Expr::NaturalLogarithm(antilogarithm))
    }

    pub fn exponential_function(exponent: Arc<Expr>) -> Arc<Self> {
        Arc::new(Expr::ExponentialFunction(exponent))
    }

    pub fn sine(argument: Arc<Expr>) -> Arc<Self> {
        Arc::new(Expr::Sine(argument))
    }

    pub fn comparison(smaller: Arc<Expr>, greater: Arc<Expr>) -> Arc<Self> {
        Arc::new(Expr::Comparison(smaller, greater))
    }

    pub fn if_then_else(
        condition: Arc<Expr>,
        then_expr: Arc<Expr>,
        else_expr: Arc<Expr>,
    ) -> Arc<Self> {
        Arc::new(Expr::IfThenElse(condition, then_expr, else_expr))
    }
}

impl Expr {
    #[inline]
    pub fn kind(&self) -> ExprKind {
        ExprKind::from_expr(self)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.kind().is_leaf()
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Expr::Constant(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Expr::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// Children in traversal order (constructor argument order, or
    /// collection order for the n-ary variants).
    pub fn children(&self) -> SmallVec<[&Arc<Expr>; 4]> {
        let mut out = SmallVec::new();
        match self {
            Expr::Constant(_) | Expr::Variable(_) => {}
            Expr::Addition(ops) | Expr::Multiplication(ops) => out.extend(ops.iter()),
            Expr::Subtraction(l, r)
            | Expr::Division(l, r)
            | Expr::Exponentiation(l, r)
            | Expr::Logarithm(l, r)
            | Expr::Comparison(l, r) => {
                out.push(l);
                out.push(r);
            }
            Expr::NaturalLogarithm(e) | Expr::ExponentialFunction(e) | Expr::Sine(e) => {
                out.push(e)
            }
            Expr::IfThenElse(c, t, e) => {
                out.push(c);
                out.push(t);
                out.push(e);
            }
        }
        out
    }

    /// Type-preserving rebuild: applies `f` to every child in traversal
    /// order and returns a new node of the same variant holding the results.
    ///
    /// Returns `None` when every call handed back the very same child
    /// instance, so callers can keep the original node.
    pub fn map_children<F>(&self, mut f: F) -> Option<Expr>
    where
        F: FnMut(&Arc<Expr>) -> Arc<Expr>,
    {
        let mut changed = false;
        let mut map = |child: &Arc<Expr>| {
            let mapped = f(child);
            if !Arc::ptr_eq(&mapped, child) {
                changed = true;
            }
            mapped
        };

        let rebuilt = match self {
            Expr::Constant(_) | Expr::Variable(_) => return None,
            Expr::Addition(ops) => Expr::Addition(Operands(ops.iter().map(&mut map).collect())),
            Expr::Multiplication(ops) => {
                Expr::Multiplication(Operands(ops.iter().map(&mut map).collect()))
            }
            Expr::Subtraction(l, r) => {
                let l = map(l);
                Expr::Subtraction(l, map(r))
            }
            Expr::Division(l, r) => {
                let l = map(l);
                Expr::Division(l, map(r))
            }
            Expr::Exponentiation(l, r) => {
                let l = map(l);
                Expr::Exponentiation(l, map(r))
            }
            Expr::Logarithm(l, r) => {
                let l = map(l);
                Expr::Logarithm(l, map(r))
            }
            Expr::Comparison(l, r) => {
                let l = map(l);
                Expr::Comparison(l, map(r))
            }
            Expr::NaturalLogarithm(e) => Expr::NaturalLogarithm(map(e)),
            Expr::ExponentialFunction(e) => Expr::ExponentialFunction(map(e)),
            Expr::Sine(e) => Expr::Sine(map(e)),
            Expr::IfThenElse(c, t, e) => {
                let c = map(c);
                let t = map(t);
                Expr::IfThenElse(c, t, map(e))
            }
        };

        if changed {
            Some(rebuilt)
        } else {
            None
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

fn pop_value(values: &mut Vec<f64>) -> f64 {
    match values.pop() {
        Some(value) => value,
        None => unreachable!("value stack underflow"),
    }
}

/// Pending work of [`Expr::evaluate`].
enum Step<'a> {
    Eval(&'a Expr),
    /// All operands of the node are on the value stack.
    Apply(&'a Expr),
    /// The condition is on the value stack.
    Branch(&'a Expr, &'a Expr),
}

impl Expr {
    /// Evaluates the expression with the variable values of `assignment`.
    ///
    /// IEEE-754 semantics throughout: division by zero and logarithms of
    /// non-positive values yield infinities or NaN rather than errors. Only
    /// the branch selected by an `IfThenElse` is evaluated. Operands are
    /// evaluated in traversal order, so the first undefined variable in that
    /// order is the one reported.
    ///
    /// Stack-safe (iterative implementation using explicit stack).
    pub fn evaluate(&self, assignment: &VariableAssignment) -> Result<f64, EvalError> {
        let mut steps = vec![Step::Eval(self)];
        let mut values: Vec<f64> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Eval(Expr::Constant(value)) => values.push(*value),
                Step::Eval(Expr::Variable(var)) => {
                    let value = assignment
                        .get(var)
                        .ok_or_else(|| EvalError::UndefinedVariable {
                            variable: var.clone(),
                            assignment: Box::new(assignment.clone()),
                        })?;
                    values.push(value);
                }
                Step::Eval(Expr::IfThenElse(condition, then_expr, else_expr)) => {
                    steps.push(Step::Branch(&**then_expr, &**else_expr));
                    steps.push(Step::Eval(&**condition));
                }
                Step::Eval(node) => {
                    steps.push(Step::Apply(node));
                    let children = node.children();
                    steps.extend(children.into_iter().rev().map(|child| Step::Eval(&**child)));
                }
                Step::Branch(then_expr, else_expr) => {
                    let condition = pop_value(&mut values);
                    // NOTE: 0.0 selects the then-branch. Callers rely on this polarity.
                    let chosen = if condition == 0.0 { then_expr } else { else_expr };
                    steps.push(Step::Eval(chosen));
                }
                Step::Apply(node) => {
                    let start = values.len().saturating_sub(node.children().len());
                    let operands: SmallVec<[f64; 4]> = values.drain(start..).collect();
                    values.push(node.apply(&operands));
                }
            }
        }
        Ok(pop_value(&mut values))
    }

    /// Value of an inner node from the values of its operands.
    fn apply(&self, operands: &[f64]) -> f64 {
        match (self, operands) {
            (Expr::Addition(_), values) => values.iter().fold(0.0, |acc, v| acc + v),
            (Expr::Multiplication(_), values) => values.iter().fold(1.0, |acc, v| acc * v),
            (Expr::Subtraction(..), [minuend, subtrahend]) => minuend - subtrahend,
            (Expr::Division(..), [dividend, divisor]) => dividend / divisor,
            (Expr::Exponentiation(..), [base, exponent]) => base.powf(*exponent),
            (Expr::Logarithm(..), [base, antilogarithm]) => antilogarithm.ln() / base.ln(),
            (Expr::NaturalLogarithm(_), [antilogarithm]) => antilogarithm.ln(),
            (Expr::ExponentialFunction(_), [exponent]) => exponent.exp(),
            (Expr::Sine(_), [argument]) => argument.sin(),
            (Expr::Comparison(..), [smaller, greater]) => {
                if smaller < greater {
                    1.0
                } else {
                    0.0
                }
            }
            _ => unreachable!("{} applied to {} operands", self.kind(), operands.len()),
        }
    }
}

// =============================================================================
// Drop
// =============================================================================

/// Shared stand-in left behind in fields whose child was moved out by `Drop`.
fn detached() -> Arc<Expr> {
    static DETACHED: OnceLock<Arc<Expr>> = OnceLock::new();
    Arc::clone(DETACHED.get_or_init(|| Arc::new(Expr::Constant(0.0))))
}

impl Expr {
    /// Moves the uniquely owned inner children of `self` into `out`.
    fn detach_children(&mut self, out: &mut Vec<Arc<Expr>>) {
        let mut take = |child: &mut Arc<Expr>| {
            if !child.is_leaf() && Arc::strong_count(child) == 1 {
                out.push(std::mem::replace(child, detached()));
            }
        };
        match self {
            Expr::Constant(_) | Expr::Variable(_) => {}
            Expr::Addition(ops) | Expr::Multiplication(ops) => {
                for child in ops.0.iter_mut() {
                    take(child);
                }
            }
            Expr::Subtraction(l, r)
            | Expr::Division(l, r)
            | Expr::Exponentiation(l, r)
            | Expr::Logarithm(l, r)
            | Expr::Comparison(l, r) => {
                take(l);
                take(r);
            }
            Expr::NaturalLogarithm(e) | Expr::ExponentialFunction(e) | Expr::Sine(e) => take(e),
            Expr::IfThenElse(c, t, e) => {
                take(c);
                take(t);
                take(e);
            }
        }
    }
}

/// Tears deep trees down with an explicit stack instead of one nested
/// `drop` call per level.
impl Drop for Expr {
    fn drop(&mut self) {
        if self.is_leaf() {
            return;
        }
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(child) = pending.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child) {
                node.detach_children(&mut pending);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign(pairs: &[(&str, f64)]) -> VariableAssignment {
        pairs.iter().map(|(n, v)| (Variable::new(*n), *v)).collect()
    }

    #[test]
    fn addition_rejects_single_summand() {
        let err = Expr::addition(vec![Expr::constant(1.0)]).unwrap_err();
        assert_eq!(
            err,
            AstError::TooFewOperands {
                kind: ExprKind::Addition,
                found: 1
            }
        );
    }

    #[test]
    fn multiplication_rejects_empty() {
        let err = Expr::multiplication(Vec::new()).unwrap_err();
        assert!(matches!(err, AstError::TooFewOperands { found: 0, .. }));
    }

    #[test]
    fn children_follow_constructor_order() {
        let c = Expr::variable("c");
        let t = Expr::constant(1.0);
        let e = Expr::constant(2.0);
        let ite = Expr::if_then_else(c.clone(), t.clone(), e.clone());
        let kids = ite.children();
        assert!(Arc::ptr_eq(kids[0], &c));
        assert!(Arc::ptr_eq(kids[1], &t));
        assert!(Arc::ptr_eq(kids[2], &e));
    }

    #[test]
    fn map_children_identity_returns_none() {
        let sum = Expr::addition(vec![Expr::variable("a"), Expr::variable("b")]).unwrap();
        assert!(sum.map_children(Arc::clone).is_none());
        assert!(Expr::constant(3.0).map_children(Arc::clone).is_none());
    }

    #[test]
    fn map_children_preserves_variant_and_order() {
        let a = Expr::variable("a");
        let b = Expr::variable("b");
        let log = Expr::logarithm(a.clone(), b.clone());
        let rebuilt = log
            .map_children(|child| {
                if Arc::ptr_eq(child, &b) {
                    Expr::constant(8.0)
                } else {
                    Arc::clone(child)
                }
            })
            .unwrap();
        match &rebuilt {
            Expr::Logarithm(base, anti) => {
                assert!(Arc::ptr_eq(base, &a));
                assert_eq!(anti.as_constant(), Some(8.0));
            }
            other => panic!("expected Logarithm, got {other:?}"),
        }
    }

    #[test]
    fn evaluate_arithmetic() {
        let a = assign(&[("x", 10.0), ("y", 4.0)]);
        let x = Expr::variable("x");
        let y = Expr::variable("y");
        let sum = Expr::addition(vec![x.clone(), y.clone(), Expr::constant(1.0)]).unwrap();
        assert_eq!(sum.evaluate(&a).unwrap(), 15.0);
        let product = Expr::multiplication(vec![x.clone(), y.clone()]).unwrap();
        assert_eq!(product.evaluate(&a).unwrap(), 40.0);
        assert_eq!(Expr::division(x.clone(), y.clone()).evaluate(&a).unwrap(), 2.5);
        assert_eq!(
            Expr::exponentiation(y.clone(), Expr::constant(0.5))
                .evaluate(&a)
                .unwrap(),
            2.0
        );
    }

    #[test]
    fn evaluate_logarithms() {
        let a = VariableAssignment::new();
        let log = Expr::logarithm(Expr::constant(2.0), Expr::constant(8.0));
        assert!((log.evaluate(&a).unwrap() - 3.0).abs() < 1e-12);
        let ln = Expr::natural_logarithm(Expr::exponential_function(Expr::constant(2.0)));
        assert!((ln.evaluate(&a).unwrap() - 2.0).abs() < 1e-12);
        let ln_zero = Expr::natural_logarithm(Expr::constant(0.0));
        assert_eq!(ln_zero.evaluate(&a).unwrap(), f64::NEG_INFINITY);
        let ln_negative = Expr::natural_logarithm(Expr::constant(-1.0));
        assert!(ln_negative.evaluate(&a).unwrap().is_nan());
    }

    #[test]
    fn comparison_is_strict() {
        let a = VariableAssignment::new();
        let lt = Expr::comparison(Expr::constant(1.0), Expr::constant(2.0));
        let eq = Expr::comparison(Expr::constant(2.0), Expr::constant(2.0));
        let gt = Expr::comparison(Expr::constant(3.0), Expr::constant(2.0));
        assert_eq!(lt.evaluate(&a).unwrap(), 1.0);
        assert_eq!(eq.evaluate(&a).unwrap(), 0.0);
        assert_eq!(gt.evaluate(&a).unwrap(), 0.0);
    }

    #[test]
    fn if_then_else_only_evaluates_selected_branch() {
        let a = assign(&[("c", 0.0)]);
        let ite = Expr::if_then_else(
            Expr::variable("c"),
            Expr::constant(1.0),
            Expr::variable("unbound"),
        );
        assert_eq!(ite.evaluate(&a).unwrap(), 1.0);
    }

    #[test]
    fn undefined_variable_aborts_evaluation() {
        let a = assign(&[("x", 1.0)]);
        let sum = Expr::addition(vec![Expr::variable("x"), Expr::variable("q")]).unwrap();
        let err = sum.evaluate(&a).unwrap_err();
        assert_eq!(err.variable(), &Variable::new("q"));
        match err {
            EvalError::UndefinedVariable { assignment, .. } => assert_eq!(*assignment, a),
        }
    }

    #[test]
    fn addition_with_keeps_argument_order() {
        let (a, b, c) = (Expr::variable("a"), Expr::variable("b"), Expr::constant(1.0));
        let sum = Expr::addition_with(a.clone(), b.clone(), [c.clone()]);
        let kids = sum.children();
        assert_eq!(kids.len(), 3);
        assert!(Arc::ptr_eq(kids[0], &a));
        assert!(Arc::ptr_eq(kids[1], &b));
        assert!(Arc::ptr_eq(kids[2], &c));
        assert_eq!(Expr::addition_with(a, b, []).children().len(), 2);
    }

    #[test]
    fn undefined_variable_reports_first_in_traversal_order() {
        let a = assign(&[("x", 1.0)]);
        let expr = Expr::division(Expr::variable("p"), Expr::variable("q"));
        assert_eq!(expr.evaluate(&a).unwrap_err().variable(), &Variable::new("p"));
    }

    #[test]
    fn evaluate_deep_tree() {
        // ((x + 1) + 1) + ... nested 100_000 times
        let mut expr = Expr::variable("x");
        for _ in 0..100_000 {
            expr = Expr::addition(vec![expr, Expr::constant(1.0)]).unwrap();
        }
        assert_eq!(expr.evaluate(&assign(&[("x", 0.5)])).unwrap(), 100_000.5);
    }

    #[test]
    fn drop_deep_tree() {
        let mut expr = Expr::variable("x");
        for _ in 0..200_000 {
            expr = Expr::sine(expr);
        }
        drop(expr);
    }

    #[test]
    fn drop_keeps_shared_subtrees_alive() {
        let shared = Expr::sine(Expr::sine(Expr::variable("x")));
        let tower = (0..1_000).fold(Arc::clone(&shared), |inner, _| Expr::sine(inner));
        drop(tower);
        assert_eq!(Arc::strong_count(&shared), 1);
        assert_eq!(shared.to_string(), "sin(sin(x))");
    }
}
