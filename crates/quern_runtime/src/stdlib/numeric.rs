//! Numeric query builtins: `Precision` and `Accuracy`.
//!
//! Exact values report infinite precision; a compound expression reports
//! the minimum over its inexact leaves, mirroring how significance
//! arithmetic degrades through an expression.

use quern_engine::builtins::BuiltinOutcome;
use quern_engine::evaluate::EvalScope;
use quern_foundation::{Expr, Number, Precision, Result, SymbolId};
use quern_symbols::Attributes;

use super::{BuiltinSpec, declined, rewritten};

/// Builtins contributed by this module.
pub(crate) const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "Precision",
        func: precision,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Accuracy",
        func: accuracy,
        attributes: Attributes::empty(),
    },
];

/// Minimum precision of the inexact parts of an expression; `None` means
/// everything is exact (infinite precision).
fn precision_of(expr: &Expr) -> Option<Precision> {
    match expr {
        Expr::Number(n) => n.precision(),
        Expr::String(_) | Expr::Symbol(_) => None,
        Expr::Compound(compound) => {
            let mut minimum: Option<Precision> = None;
            for element in compound.elements.iter().chain(std::iter::once(&compound.head)) {
                if let Some(p) = precision_of(element) {
                    minimum = Some(match minimum {
                        None => p,
                        Some(m) if p.digits() < m.digits() => p,
                        Some(m) => m,
                    });
                }
            }
            minimum
        }
    }
}

/// Minimum accuracy of the inexact parts; `None` means everything is
/// exact (infinite accuracy).
fn accuracy_of(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Number(n) => number_accuracy(n),
        Expr::String(_) | Expr::Symbol(_) => None,
        Expr::Compound(compound) => compound
            .elements
            .iter()
            .chain(std::iter::once(&compound.head))
            .filter_map(accuracy_of)
            .min(),
    }
}

fn number_accuracy(n: &Number) -> Option<i64> {
    match n {
        Number::Int(_) | Number::Rational(_) => None,
        Number::Real(r) => Some(r.accuracy()),
        Number::Complex(re, im) => match (number_accuracy(re), number_accuracy(im)) {
            (None, a) | (a, None) => a,
            (Some(x), Some(y)) => Some(x.min(y)),
        },
    }
}

fn precision(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [argument] = elements.as_slice() else {
        return declined();
    };
    rewritten(match precision_of(argument) {
        None => Expr::symbol(SymbolId::INFINITY),
        Some(Precision::Machine) => Expr::symbol(SymbolId::MACHINE_PRECISION),
        Some(Precision::Digits(d)) => Expr::int(i64::from(d)),
    })
}

fn accuracy(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [argument] = elements.as_slice() else {
        return declined();
    };
    rewritten(match accuracy_of(argument) {
        None => Expr::symbol(SymbolId::INFINITY),
        Some(a) => Expr::int(a),
    })
}
