//! Control-flow builtins.
//!
//! These lean on hold attributes: `If` holds its branches so only the
//! chosen one is evaluated, `CompoundExpression` holds everything and
//! evaluates its parts strictly in order through the scope.

use quern_engine::builtins::BuiltinOutcome;
use quern_engine::evaluate::EvalScope;
use quern_foundation::{Expr, Result, SymbolId};
use quern_symbols::Attributes;

use super::{BuiltinSpec, declined, rewritten};

/// Builtins contributed by this module.
pub(crate) const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "If",
        func: if_,
        attributes: Attributes::HOLD_REST,
    },
    BuiltinSpec {
        name: "CompoundExpression",
        func: compound_expression,
        attributes: Attributes::HOLD_ALL,
    },
    BuiltinSpec {
        name: "ReleaseHold",
        func: release_hold,
        attributes: Attributes::empty(),
    },
];

fn if_(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    if !(2..=4).contains(&elements.len()) {
        return declined();
    }
    // The condition is the only unheld argument, so it arrives evaluated.
    match elements[0].as_symbol() {
        Some(SymbolId::TRUE) => rewritten(elements[1].clone()),
        Some(SymbolId::FALSE) => rewritten(
            elements
                .get(2)
                .cloned()
                .unwrap_or_else(|| Expr::symbol(SymbolId::NULL)),
        ),
        // Undecided condition: the optional fourth argument is the
        // fallback; otherwise the If stays symbolic.
        _ => match elements.get(3) {
            Some(fallback) => rewritten(fallback.clone()),
            None => declined(),
        },
    }
}

fn compound_expression(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let mut last = Expr::symbol(SymbolId::NULL);
    for element in expr.elements() {
        last = scope.evaluate(&element)?;
    }
    rewritten(last)
}

fn release_hold(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [argument] = elements.as_slice() else {
        return declined();
    };
    if argument.has_head(SymbolId::HOLD) || argument.has_head(SymbolId::HOLD_COMPLETE) {
        let mut inner = argument.elements();
        return rewritten(match inner.len() {
            1 => inner.pop().expect("one element"),
            _ => Expr::sequence(inner),
        });
    }
    rewritten(argument.clone())
}
