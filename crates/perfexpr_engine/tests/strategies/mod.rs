use perfexpr_ast::{Expr, VariableAssignment};
use proptest::prelude::*;
use std::sync::Arc;

pub const VARIABLES: [&str; 3] = ["x", "y", "z"];

pub fn arb_leaf() -> impl Strategy<Value = Arc<Expr>> {
    prop_oneof![
        // Integer constants fold exactly
        (-10i32..10).prop_map(|n| Expr::constant(f64::from(n))),
        prop::sample::select(VARIABLES.to_vec()).prop_map(Expr::variable),
    ]
}

fn sum(items: Vec<Arc<Expr>>) -> Arc<Expr> {
    Expr::addition(items).expect("strategy yields at least two summands")
}

fn product(items: Vec<Arc<Expr>>) -> Arc<Expr> {
    Expr::multiplication(items).expect("strategy yields at least two factors")
}

/// Additive-heavy trees, the shapes the simplifier rewrites.
///
/// Variants whose value can jump on tiny rounding differences (comparisons,
/// branches) or overflow (exponentials, divisions) are left out so numeric
/// comparisons stay meaningful.
pub fn arb_additive_expr() -> impl Strategy<Value = Arc<Expr>> {
    arb_leaf().prop_recursive(
        4,  // levels deep
        48, // max size
        4,  // items per collection
        |inner| {
            prop_oneof![
                3 => prop::collection::vec(inner.clone(), 2..5).prop_map(sum),
                2 => (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::subtraction(l, r)),
                1 => prop::collection::vec(inner.clone(), 2..3).prop_map(product),
                1 => inner.prop_map(Expr::sine),
            ]
        },
    )
}

/// `count` assignments binding every variable to a value in `[-2, 2)`.
pub fn arb_assignments(count: usize) -> impl Strategy<Value = Vec<VariableAssignment>> {
    prop::collection::vec(prop::array::uniform3(-2.0f64..2.0), count).prop_map(|rows| {
        rows.into_iter()
            .map(|values| VARIABLES.into_iter().zip(values).collect::<VariableAssignment>())
            .collect()
    })
}
