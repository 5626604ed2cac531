//! Contract tests for the read-only traversal.
//!
//! Every entered node gets exactly one exit call, exits come in reverse
//! order of entry, and positions reflect depth and preorder numbering.

mod strategies;

use perfexpr_ast::{count_nodes, walk, Expr, ExprWalker, Flow, Position};
use proptest::prelude::*;
use std::sync::Arc;

/// Records the enter/exit protocol and checks stack discipline on the fly.
#[derive(Default)]
struct Recorder {
    stack: Vec<(usize, *const Expr)>,
    enters: usize,
    exits: usize,
    violations: Vec<String>,
}

impl ExprWalker for Recorder {
    fn enter_fallback(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enters += 1;
        if at.visit != self.enters {
            self.violations
                .push(format!("visit {} reported as {}", self.enters, at.visit));
        }
        if at.depth != self.stack.len() {
            self.violations
                .push(format!("depth {} with stack {}", at.depth, self.stack.len()));
        }
        self.stack.push((at.visit, Arc::as_ptr(node)));
        Flow::Descend
    }

    fn exit_fallback(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.exits += 1;
        match self.stack.pop() {
            Some((visit, ptr)) if visit == at.visit && ptr == Arc::as_ptr(node) => {}
            other => self
                .violations
                .push(format!("exit of visit {} but top was {:?}", at.visit, other)),
        }
        Flow::Descend
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn enters_equal_exits_in_stack_order(expr in strategies::arb_expr()) {
        let mut recorder = Recorder::default();
        let summary = walk(&expr, &mut recorder);
        let total = count_nodes(&expr);

        prop_assert!(recorder.violations.is_empty(), "{:?}", recorder.violations);
        prop_assert!(recorder.stack.is_empty());
        prop_assert_eq!(recorder.enters, total);
        prop_assert_eq!(recorder.exits, total);
        prop_assert_eq!(summary.visits, total);
    }

    #[test]
    fn walker_can_be_reused(expr in strategies::arb_expr()) {
        let mut recorder = Recorder::default();
        let first = walk(&expr, &mut recorder);
        recorder.enters = 0;
        let second = walk(&expr, &mut recorder);
        // Counters restart with every walk
        prop_assert_eq!(first, second);
        prop_assert!(recorder.violations.is_empty(), "{:?}", recorder.violations);
    }
}

#[test]
fn shared_subtree_is_visited_per_occurrence() {
    let shared = Expr::exponential_function(Expr::variable("x"));
    let expr = Expr::addition(vec![shared.clone(), shared.clone(), shared]).unwrap();
    let mut recorder = Recorder::default();
    walk(&expr, &mut recorder);
    assert_eq!(recorder.enters, 7);
    assert_eq!(recorder.exits, 7);
    assert!(recorder.violations.is_empty());
}

#[test]
fn children_follow_constructor_order() {
    #[derive(Default)]
    struct Names(Vec<String>);
    impl ExprWalker for Names {
        fn enter_variable(&mut self, node: &Arc<Expr>, _at: Position) -> Flow {
            if let Some(var) = node.as_variable() {
                self.0.push(var.name().to_string());
            }
            Flow::Descend
        }
    }

    let expr = Expr::if_then_else(
        Expr::variable("cond"),
        Expr::division(Expr::variable("dividend"), Expr::variable("divisor")),
        Expr::multiplication(vec![Expr::variable("f1"), Expr::variable("f2")]).unwrap(),
    );
    let mut names = Names::default();
    walk(&expr, &mut names);
    assert_eq!(names.0, vec!["cond", "dividend", "divisor", "f1", "f2"]);
}

/// Prunes on enter of every `Sine` and on exit of the variable `stop`.
#[derive(Default)]
struct Pruner {
    entered: Vec<String>,
    exited: usize,
}

impl ExprWalker for Pruner {
    fn enter_fallback(&mut self, node: &Arc<Expr>, _at: Position) -> Flow {
        self.entered.push(node.to_string());
        Flow::Descend
    }

    fn enter_sine(&mut self, node: &Arc<Expr>, at: Position) -> Flow {
        self.enter_fallback(node, at);
        Flow::Prune
    }

    fn exit_fallback(&mut self, node: &Arc<Expr>, _at: Position) -> Flow {
        self.exited += 1;
        match node.as_variable() {
            Some(var) if var.name() == "stop" => Flow::Prune,
            _ => Flow::Descend,
        }
    }
}

#[test]
fn prune_on_enter_skips_children_only() {
    let expr = Expr::addition(vec![Expr::sine(Expr::variable("hidden")), Expr::variable("seen")])
        .unwrap();
    let mut pruner = Pruner::default();
    let summary = walk(&expr, &mut pruner);

    assert_eq!(pruner.entered, vec![expr.to_string(), "sin(hidden)".into(), "seen".into()]);
    // Pruned nodes still get their exit call
    assert_eq!(pruner.exited, 3);
    assert_eq!(summary.visits, 3);
}

#[test]
fn prune_on_exit_skips_remaining_siblings() {
    let expr = Expr::multiplication(vec![
        Expr::variable("a"),
        Expr::variable("stop"),
        Expr::variable("skipped"),
    ])
    .unwrap();
    let mut pruner = Pruner::default();
    walk(&expr, &mut pruner);

    assert_eq!(pruner.entered.len(), 3);
    assert!(!pruner.entered.iter().any(|s| s == "skipped"));
    // Pruning is scoped to the parent: the next walk descends normally
    let mut fresh = Pruner::default();
    walk(&Expr::division(Expr::variable("x"), Expr::variable("y")), &mut fresh);
    assert_eq!(fresh.entered.len(), 3);
}
