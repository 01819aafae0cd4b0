//! Comparison and logic builtins.
//!
//! Numeric comparisons are exact: reals compare by their exact decimal
//! value, and `2 == 2.0` is `True`. Comparisons that cannot be decided
//! (symbolic operands, complex order) are left unevaluated.

use std::cmp::Ordering;

use quern_engine::builtins::BuiltinOutcome;
use quern_engine::evaluate::EvalScope;
use quern_foundation::{Expr, Number, Result, SymbolId};
use quern_symbols::Attributes;

use super::{BuiltinSpec, declined, rewritten};

/// Builtins contributed by this module.
pub(crate) const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "Equal",
        func: equal,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Unequal",
        func: unequal,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Less",
        func: |expr, scope| chain(expr, scope, |o| o == Ordering::Less),
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "LessEqual",
        func: |expr, scope| chain(expr, scope, |o| o != Ordering::Greater),
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Greater",
        func: |expr, scope| chain(expr, scope, |o| o == Ordering::Greater),
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "GreaterEqual",
        func: |expr, scope| chain(expr, scope, |o| o != Ordering::Less),
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "SameQ",
        func: same_q,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Not",
        func: not,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "And",
        func: and,
        attributes: Attributes::HOLD_ALL.union(Attributes::FLAT)
            .union(Attributes::ONE_IDENTITY),
    },
    BuiltinSpec {
        name: "Or",
        func: or,
        attributes: Attributes::HOLD_ALL.union(Attributes::FLAT)
            .union(Attributes::ONE_IDENTITY),
    },
];

/// Decides structural-or-numeric equality; `None` means undecidable.
fn decide_equal(a: &Expr, b: &Expr) -> Option<bool> {
    if a == b {
        return Some(true);
    }
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => Some(numbers_equal(x, y)),
        _ => match (a, b) {
            (Expr::String(x), Expr::String(y)) => Some(x == y),
            _ => None,
        },
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match x.cmp_value(y) {
        Some(ordering) => ordering == Ordering::Equal,
        // At least one side is complex: compare parts by value.
        None => {
            x.re().cmp_value(&y.re()) == Some(Ordering::Equal)
                && x.im().cmp_value(&y.im()) == Some(Ordering::Equal)
        }
    }
}

fn equal(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    if elements.len() < 2 {
        return rewritten(Expr::truth());
    }
    let mut all_decided = true;
    for pair in elements.windows(2) {
        match decide_equal(&pair[0], &pair[1]) {
            Some(false) => return rewritten(Expr::falsehood()),
            Some(true) => {}
            None => all_decided = false,
        }
    }
    if all_decided {
        rewritten(Expr::truth())
    } else {
        declined()
    }
}

fn unequal(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    if elements.len() < 2 {
        return rewritten(Expr::truth());
    }
    let mut all_decided = true;
    for (i, a) in elements.iter().enumerate() {
        for b in &elements[i + 1..] {
            match decide_equal(a, b) {
                Some(true) => return rewritten(Expr::falsehood()),
                Some(false) => {}
                None => all_decided = false,
            }
        }
    }
    if all_decided {
        rewritten(Expr::truth())
    } else {
        declined()
    }
}

/// N-ary ordering chain over non-complex numbers.
fn chain(
    expr: &Expr,
    _scope: &mut EvalScope<'_>,
    accept: impl Fn(Ordering) -> bool,
) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    if elements.len() < 2 {
        return rewritten(Expr::truth());
    }
    for pair in elements.windows(2) {
        let (Some(a), Some(b)) = (pair[0].as_number(), pair[1].as_number()) else {
            return declined();
        };
        match a.cmp_value(b) {
            Some(ordering) if accept(ordering) => {}
            Some(_) => return rewritten(Expr::falsehood()),
            None => return declined(),
        }
    }
    rewritten(Expr::truth())
}

fn same_q(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let identical = elements.windows(2).all(|pair| pair[0] == pair[1]);
    rewritten(Expr::boolean(identical))
}

fn not(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [argument] = elements.as_slice() else {
        return declined();
    };
    match argument.as_symbol() {
        Some(SymbolId::TRUE) => rewritten(Expr::falsehood()),
        Some(SymbolId::FALSE) => rewritten(Expr::truth()),
        _ => declined(),
    }
}

fn and(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    // HoldAll: evaluate left to right, short-circuiting on False.
    let mut residual = Vec::new();
    for element in expr.elements() {
        let value = scope.evaluate(&element)?;
        match value.as_symbol() {
            Some(SymbolId::FALSE) => return rewritten(Expr::falsehood()),
            Some(SymbolId::TRUE) => {}
            _ => residual.push(value),
        }
    }
    match residual.len() {
        0 => rewritten(Expr::truth()),
        1 => rewritten(residual.pop().expect("one element")),
        _ => rewritten(Expr::compound(expr.head(), residual)),
    }
}

fn or(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    // HoldAll: evaluate left to right, short-circuiting on True.
    let mut residual = Vec::new();
    for element in expr.elements() {
        let value = scope.evaluate(&element)?;
        match value.as_symbol() {
            Some(SymbolId::TRUE) => return rewritten(Expr::truth()),
            Some(SymbolId::FALSE) => {}
            _ => residual.push(value),
        }
    }
    match residual.len() {
        0 => rewritten(Expr::falsehood()),
        1 => rewritten(residual.pop().expect("one element")),
        _ => rewritten(Expr::compound(expr.head(), residual)),
    }
}
