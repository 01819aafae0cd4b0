//! Evaluator loop behavior: attributes, fixed points, limits.

use quern_engine::diagnostics::Diagnostic;
use quern_engine::evaluate::{Context, EvalLimits, Evaluator};
use quern_foundation::{Expr, SymbolId};
use quern_symbols::{Attributes, RuleSlot};

fn blank() -> Expr {
    Expr::normal(SymbolId::BLANK, [])
}

fn named(name: SymbolId, inner: Expr) -> Expr {
    Expr::normal(SymbolId::PATTERN, [Expr::symbol(name), inner])
}

#[test]
fn evaluation_reaches_a_fixed_point() {
    let mut ctx = Context::new();
    let mut evaluator = Evaluator::new();

    let f = ctx.interner.intern("f");
    let g = ctx.interner.intern("g");
    let x = ctx.interner.intern("x");

    // f[x_] -> g[x], g[x_] -> x: two chained rewrites.
    ctx.symbols
        .define_rule(
            f,
            RuleSlot::Down,
            Expr::normal(f, [named(x, blank())]),
            Expr::normal(g, [Expr::symbol(x)]),
            false,
        )
        .unwrap();
    ctx.symbols
        .define_rule(
            g,
            RuleSlot::Down,
            Expr::normal(g, [named(x, blank())]),
            Expr::symbol(x),
            false,
        )
        .unwrap();

    let result = evaluator
        .evaluate(&Expr::normal(f, [Expr::int(9)]), &mut ctx)
        .unwrap();
    assert_eq!(result, Expr::int(9));

    // Idempotence: evaluating the result changes nothing.
    let again = evaluator.evaluate(&result, &mut ctx).unwrap();
    assert_eq!(again, result);
}

#[test]
fn orderless_evaluation_is_permutation_invariant() {
    let mut ctx = Context::new();
    let mut evaluator = Evaluator::new();

    let f = ctx.interner.intern("f");
    ctx.symbols.add_attributes(f, Attributes::ORDERLESS).unwrap();
    let a = ctx.interner.intern("a");
    let b = ctx.interner.intern("b");

    let elements = [Expr::int(2), Expr::symbol(a), Expr::symbol(b), Expr::string("s")];
    let forward = Expr::normal(f, elements.clone());
    let reversed = Expr::normal(f, elements.iter().rev().cloned());

    let lhs = evaluator.evaluate(&forward, &mut ctx).unwrap();
    let rhs = evaluator.evaluate(&reversed, &mut ctx).unwrap();
    assert_eq!(lhs, rhs);
}

#[test]
fn flat_evaluation_is_associativity_invariant() {
    let mut ctx = Context::new();
    let mut evaluator = Evaluator::new();

    let f = ctx.interner.intern("f");
    ctx.symbols.add_attributes(f, Attributes::FLAT).unwrap();
    let a = ctx.interner.intern("a");
    let b = ctx.interner.intern("b");
    let c = ctx.interner.intern("c");

    let nested = Expr::normal(
        f,
        [
            Expr::symbol(a),
            Expr::normal(f, [Expr::symbol(b), Expr::symbol(c)]),
        ],
    );
    let flat = Expr::normal(f, [Expr::symbol(a), Expr::symbol(b), Expr::symbol(c)]);

    assert_eq!(
        evaluator.evaluate(&nested, &mut ctx).unwrap(),
        evaluator.evaluate(&flat, &mut ctx).unwrap()
    );
}

#[test]
fn runaway_rule_reports_a_limit_and_returns() {
    let mut ctx = Context::new();
    let mut evaluator = Evaluator::with_limits(EvalLimits {
        recursion_limit: 32,
        iteration_limit: 32,
    });

    let f = ctx.interner.intern("f");
    let g = ctx.interner.intern("g");
    let x = ctx.interner.intern("x");
    // f[x_] -> g[f[x]] grows forever.
    ctx.symbols
        .define_rule(
            f,
            RuleSlot::Down,
            Expr::normal(f, [named(x, blank())]),
            Expr::normal(g, [Expr::normal(f, [Expr::symbol(x)])]),
            false,
        )
        .unwrap();

    let result = evaluator.evaluate(&Expr::normal(f, [Expr::int(1)]), &mut ctx);
    assert!(result.is_ok(), "limits are diagnostics, not errors");

    let diagnostics = evaluator.drain_diagnostics();
    assert!(diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::IterationLimitReached { .. } | Diagnostic::RecursionLimitReached { .. }
    )));
}

#[test]
fn up_values_fire_before_down_values_of_the_head() {
    let mut ctx = Context::new();
    let mut evaluator = Evaluator::new();

    let f = ctx.interner.intern("f");
    let special = ctx.interner.intern("special");
    let x = ctx.interner.intern("x");

    // Generic down-value on f, plus an up-value attached to `special`
    // that claims f[special] for itself.
    ctx.symbols
        .define_rule(
            f,
            RuleSlot::Down,
            Expr::normal(f, [named(x, blank())]),
            Expr::string("down"),
            false,
        )
        .unwrap();
    ctx.symbols
        .define_rule(
            special,
            RuleSlot::Up,
            Expr::normal(f, [Expr::symbol(special)]),
            Expr::string("up"),
            false,
        )
        .unwrap();

    let via_up = evaluator
        .evaluate(&Expr::normal(f, [Expr::symbol(special)]), &mut ctx)
        .unwrap();
    assert_eq!(via_up, Expr::string("up"));

    let via_down = evaluator
        .evaluate(&Expr::normal(f, [Expr::int(1)]), &mut ctx)
        .unwrap();
    assert_eq!(via_down, Expr::string("down"));
}

#[test]
fn delayed_rules_resubstitute_on_each_application() {
    let mut ctx = Context::new();
    let mut evaluator = Evaluator::new();

    let wrap = ctx.interner.intern("wrap");
    let x = ctx.interner.intern("x");
    // wrap[x_] :> List[x, x] duplicates whatever it receives.
    ctx.symbols
        .define_rule(
            wrap,
            RuleSlot::Down,
            Expr::normal(wrap, [named(x, blank())]),
            Expr::list([Expr::symbol(x), Expr::symbol(x)]),
            true,
        )
        .unwrap();

    let result = evaluator
        .evaluate(&Expr::normal(wrap, [Expr::string("v")]), &mut ctx)
        .unwrap();
    assert_eq!(
        result,
        Expr::list([Expr::string("v"), Expr::string("v")])
    );
}

#[test]
fn held_arguments_do_not_evaluate() {
    let mut ctx = Context::new();
    let mut evaluator = Evaluator::new();

    let hold = ctx.interner.intern("myHold");
    ctx.symbols.add_attributes(hold, Attributes::HOLD_ALL).unwrap();
    let x = ctx.interner.intern("x");
    ctx.symbols.set_own_value(x, Expr::int(5), false).unwrap();

    let held = evaluator
        .evaluate(&Expr::normal(hold, [Expr::symbol(x)]), &mut ctx)
        .unwrap();
    assert_eq!(held, Expr::normal(hold, [Expr::symbol(x)]));

    // Without the attribute the symbol resolves.
    let plain = ctx.interner.intern("plain");
    let resolved = evaluator
        .evaluate(&Expr::normal(plain, [Expr::symbol(x)]), &mut ctx)
        .unwrap();
    assert_eq!(resolved, Expr::normal(plain, [Expr::int(5)]));
}
