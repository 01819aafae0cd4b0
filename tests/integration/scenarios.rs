//! End-to-end scenarios driven through the assignment builtins exactly
//! as an embedding front end would.

use quern_engine::diagnostics::Diagnostic;
use quern_engine::evaluate::EvalLimits;
use quern_foundation::{Expr, SymbolId};
use quern_runtime::Session;

fn blank() -> Expr {
    Expr::normal(SymbolId::BLANK, [])
}

fn typed_blank(head: SymbolId) -> Expr {
    Expr::normal(SymbolId::BLANK, [Expr::symbol(head)])
}

fn named(name: SymbolId, inner: Expr) -> Expr {
    Expr::normal(SymbolId::PATTERN, [Expr::symbol(name), inner])
}

fn call(session: &mut Session, name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    let head = session.symbol(name);
    Expr::normal(head, args)
}

#[test]
fn factorial_via_down_values() {
    let mut session = Session::new();
    let fac = session.symbol("fac");
    let n = session.symbol("n");

    // fac[0] = 1
    let base = call(
        &mut session,
        "Set",
        [Expr::normal(fac, [Expr::int(0)]), Expr::int(1)],
    );
    session.evaluate(&base).unwrap();

    // fac[n_Integer] /; n > 0 := n * fac[n - 1]
    let pattern = Expr::normal(
        SymbolId::CONDITION,
        [
            Expr::normal(fac, [named(n, typed_blank(SymbolId::INTEGER))]),
            call(&mut session, "Greater", [Expr::symbol(n), Expr::int(0)]),
        ],
    );
    let predecessor = call(&mut session, "Plus", [Expr::symbol(n), Expr::int(-1)]);
    let body = call(
        &mut session,
        "Times",
        [Expr::symbol(n), Expr::normal(fac, [predecessor])],
    );
    let recursive = call(&mut session, "SetDelayed", [pattern, body]);
    let defined = session.evaluate(&recursive).unwrap();
    assert_eq!(defined.expr, Expr::symbol(SymbolId::NULL));

    let result = session.evaluate(&Expr::normal(fac, [Expr::int(5)])).unwrap();
    assert_eq!(result.expr, Expr::int(120));
    assert!(result.is_clean());

    // The guard keeps fac[-3] symbolic instead of recursing forever.
    let negative = session
        .evaluate(&Expr::normal(fac, [Expr::int(-3)]))
        .unwrap();
    assert_eq!(negative.expr, Expr::normal(fac, [Expr::int(-3)]));
}

#[test]
fn sequence_binding_scenario() {
    // f[x__, y_] := {{x}, y} over f[1, 2, 3]: x takes Sequence[1, 2].
    let mut session = Session::new();
    let f = session.symbol("f");
    let x = session.symbol("x");
    let y = session.symbol("y");

    let pattern = Expr::normal(
        f,
        [
            named(x, Expr::normal(SymbolId::BLANK_SEQUENCE, [])),
            named(y, blank()),
        ],
    );
    let body = Expr::list([Expr::list([Expr::symbol(x)]), Expr::symbol(y)]);
    let definition = call(&mut session, "SetDelayed", [pattern, body]);
    session.evaluate(&definition).unwrap();

    let result = session
        .evaluate(&Expr::normal(
            f,
            [Expr::int(1), Expr::int(2), Expr::int(3)],
        ))
        .unwrap();
    assert_eq!(
        result.expr,
        Expr::list([
            Expr::list([Expr::int(1), Expr::int(2)]),
            Expr::int(3)
        ])
    );
}

#[test]
fn runaway_rule_hits_iteration_limit_without_crashing() {
    let mut session = Session::with_limits(EvalLimits {
        recursion_limit: 32,
        iteration_limit: 32,
    });
    let f = session.symbol("f");
    let x = session.symbol("x");

    // f[x_] := f[x] + 1
    let pattern = Expr::normal(f, [named(x, blank())]);
    let body = call(
        &mut session,
        "Plus",
        [Expr::normal(f, [Expr::symbol(x)]), Expr::int(1)],
    );
    let definition = call(&mut session, "SetDelayed", [pattern, body]);
    session.evaluate(&definition).unwrap();

    let result = session.evaluate(&Expr::normal(f, [Expr::int(1)])).unwrap();
    assert!(result.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::IterationLimitReached { .. } | Diagnostic::RecursionLimitReached { .. }
    )));

    // The session survives and keeps evaluating.
    let sum = call(&mut session, "Plus", [Expr::int(1), Expr::int(1)]);
    let after = session.evaluate(&sum).unwrap();
    assert_eq!(after.expr, Expr::int(2));
}

#[test]
fn listable_arithmetic_threads_over_lists() {
    let mut session = Session::new();
    let expr = call(
        &mut session,
        "Plus",
        [
            Expr::list([Expr::int(1), Expr::int(2), Expr::int(3)]),
            Expr::int(10),
        ],
    );
    let result = session.evaluate(&expr).unwrap();
    assert_eq!(
        result.expr,
        Expr::list([Expr::int(11), Expr::int(12), Expr::int(13)])
    );
}

#[test]
fn orderless_evaluation_matches_across_argument_orders() {
    let mut session = Session::new();
    let a = session.symbol("a");
    let b = session.symbol("b");

    let forward = call(
        &mut session,
        "Plus",
        [Expr::symbol(a), Expr::symbol(b), Expr::int(1)],
    );
    let shuffled = call(
        &mut session,
        "Plus",
        [Expr::int(1), Expr::symbol(b), Expr::symbol(a)],
    );

    let lhs = session.evaluate(&forward).unwrap().expr;
    let rhs = session.evaluate(&shuffled).unwrap().expr;
    assert_eq!(lhs, rhs);
}

#[test]
fn if_evaluates_only_the_taken_branch() {
    let mut session = Session::new();
    let x = session.symbol("x");

    // x = 0; If[x == 0, "zero", 1/x]
    let assign = call(&mut session, "Set", [Expr::symbol(x), Expr::int(0)]);
    session.evaluate(&assign).unwrap();

    let condition = call(&mut session, "Equal", [Expr::symbol(x), Expr::int(0)]);
    let fallback = call(&mut session, "Divide", [Expr::int(1), Expr::symbol(x)]);
    let expr = call(
        &mut session,
        "If",
        [condition, Expr::string("zero"), fallback],
    );

    let result = session.evaluate(&expr).unwrap();
    assert_eq!(result.expr, Expr::string("zero"));
    // The held 1/0 branch never ran, so no division diagnostic appears.
    assert!(result.is_clean());
}

#[test]
fn up_values_let_arguments_claim_expressions() {
    let mut session = Session::new();
    let g = session.symbol("g");
    let unit = session.symbol("unit");

    // g[unit] ^= 7
    let definition = call(
        &mut session,
        "UpSet",
        [Expr::normal(g, [Expr::symbol(unit)]), Expr::int(7)],
    );
    session.evaluate(&definition).unwrap();

    let result = session
        .evaluate(&Expr::normal(g, [Expr::symbol(unit)]))
        .unwrap();
    assert_eq!(result.expr, Expr::int(7));

    // Other g calls are untouched.
    let other = session.evaluate(&Expr::normal(g, [Expr::int(1)])).unwrap();
    assert_eq!(other.expr, Expr::normal(g, [Expr::int(1)]));
}

#[test]
fn interrupt_flag_cancels_between_iterations() {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    let mut session = Session::new();
    let flag = Arc::new(AtomicBool::new(true));
    session.set_interrupt(Some(flag.clone()));

    let expr = call(&mut session, "Plus", [Expr::int(1), Expr::int(2)]);
    let result = session.evaluate(&expr).unwrap();
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::Interrupted))
    );

    // Clearing the flag restores normal evaluation.
    session.set_interrupt(None);
    let result = session.evaluate(&expr).unwrap();
    assert_eq!(result.expr, Expr::int(3));
}
