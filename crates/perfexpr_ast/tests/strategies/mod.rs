use perfexpr_ast::Expr;
use proptest::prelude::*;
use std::sync::Arc;

pub fn arb_leaf() -> impl Strategy<Value = Arc<Expr>> {
    prop_oneof![
        // Small integers keep rendered trees readable in failure output
        (-10i32..10).prop_map(|n| Expr::constant(f64::from(n))),
        "[a-d]".prop_map(Expr::variable),
    ]
}

fn n_ary(
    inner: impl Strategy<Value = Arc<Expr>> + Clone,
    build: fn(Vec<Arc<Expr>>) -> Arc<Expr>,
) -> impl Strategy<Value = Arc<Expr>> {
    prop::collection::vec(inner, 2..4).prop_map(build)
}

fn sum(items: Vec<Arc<Expr>>) -> Arc<Expr> {
    Expr::addition(items).expect("strategy yields at least two summands")
}

fn product(items: Vec<Arc<Expr>>) -> Arc<Expr> {
    Expr::multiplication(items).expect("strategy yields at least two factors")
}

/// Random trees over every variant.
pub fn arb_expr() -> impl Strategy<Value = Arc<Expr>> {
    arb_leaf().prop_recursive(
        4,  // levels deep
        48, // max size
        4,  // items per collection
        |inner| {
            prop_oneof![
                n_ary(inner.clone(), sum),
                n_ary(inner.clone(), product),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::subtraction(l, r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::division(l, r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::exponentiation(l, r)),
                (inner.clone(), inner.clone()).prop_map(|(b, a)| Expr::logarithm(b, a)),
                inner.clone().prop_map(Expr::natural_logarithm),
                inner.clone().prop_map(Expr::exponential_function),
                inner.clone().prop_map(Expr::sine),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::comparison(l, r)),
                (inner.clone(), inner.clone(), inner)
                    .prop_map(|(c, t, e)| Expr::if_then_else(c, t, e)),
            ]
        },
    )
}
