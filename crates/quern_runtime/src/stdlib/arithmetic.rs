//! Arithmetic builtins over the numeric tower.
//!
//! `Plus` and `Times` fold their numeric arguments exactly (or with
//! significance tracking once a real is involved) and keep symbolic
//! arguments untouched. `Minus`, `Subtract`, and `Divide` rewrite into
//! `Plus`/`Times`/`Power` normal forms.

use num_traits::ToPrimitive;

use quern_engine::builtins::BuiltinOutcome;
use quern_engine::evaluate::EvalScope;
use quern_foundation::{Expr, Number, Result};
use quern_symbols::Attributes;

use super::{BuiltinSpec, declined, rewritten};

const NUMERIC_FLAGS: Attributes = Attributes::FLAT
    .union(Attributes::ORDERLESS)
    .union(Attributes::LISTABLE)
    .union(Attributes::ONE_IDENTITY)
    .union(Attributes::NUMERIC_FUNCTION);

/// Builtins contributed by this module.
pub(crate) const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "Plus",
        func: plus,
        attributes: NUMERIC_FLAGS,
    },
    BuiltinSpec {
        name: "Times",
        func: times,
        attributes: NUMERIC_FLAGS,
    },
    BuiltinSpec {
        name: "Power",
        func: power,
        attributes: Attributes::LISTABLE
            .union(Attributes::ONE_IDENTITY)
            .union(Attributes::NUMERIC_FUNCTION),
    },
    BuiltinSpec {
        name: "Minus",
        func: minus,
        attributes: Attributes::LISTABLE.union(Attributes::NUMERIC_FUNCTION),
    },
    BuiltinSpec {
        name: "Subtract",
        func: subtract,
        attributes: Attributes::LISTABLE.union(Attributes::NUMERIC_FUNCTION),
    },
    BuiltinSpec {
        name: "Divide",
        func: divide,
        attributes: Attributes::LISTABLE.union(Attributes::NUMERIC_FUNCTION),
    },
    BuiltinSpec {
        name: "Abs",
        func: abs,
        attributes: Attributes::LISTABLE.union(Attributes::NUMERIC_FUNCTION),
    },
    BuiltinSpec {
        name: "Sign",
        func: sign,
        attributes: Attributes::LISTABLE.union(Attributes::NUMERIC_FUNCTION),
    },
];

/// Folds the numeric arguments of an n-ary operation, returning the fold,
/// the remaining symbolic arguments in order, and how many numbers were
/// folded.
fn fold_numeric(
    elements: &[Expr],
    identity: Number,
    op: impl Fn(&Number, &Number) -> Number,
) -> (Number, Vec<Expr>, usize) {
    let mut accumulator = identity;
    let mut symbolic = Vec::new();
    let mut folded = 0usize;
    for element in elements {
        match element.as_number() {
            Some(n) => {
                accumulator = op(&accumulator, n);
                folded += 1;
            }
            None => symbolic.push(element.clone()),
        }
    }
    (accumulator, symbolic, folded)
}

fn plus(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let (sum, symbolic, folded) = fold_numeric(&elements, Number::zero(), Number::add);

    if symbolic.is_empty() {
        return rewritten(Expr::number(sum));
    }

    let dropped_zero = sum.is_zero();
    let mut out = Vec::with_capacity(symbolic.len() + 1);
    if !dropped_zero {
        out.push(Expr::number(sum));
    }
    out.extend(symbolic);

    if out.len() == 1 {
        return rewritten(out.pop().expect("one element"));
    }
    if folded >= 2 || (folded == 1 && dropped_zero) {
        return rewritten(Expr::compound(expr.head(), out));
    }
    declined()
}

fn is_infinite_marker(expr: &Expr) -> bool {
    matches!(
        expr.as_symbol(),
        Some(quern_foundation::SymbolId::INFINITY | quern_foundation::SymbolId::COMPLEX_INFINITY)
    )
}

fn times(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let (product, symbolic, folded) = fold_numeric(&elements, Number::one(), Number::mul);

    // Zero annihilates, exactly or at the zero's precision; zero times a
    // directed or directionless infinity has no defined value.
    if folded > 0 && product.is_zero() {
        if symbolic.iter().any(is_infinite_marker) {
            let marker = scope.fault_marker(quern_foundation::NumericFault::Indeterminate);
            return rewritten(marker);
        }
        return rewritten(Expr::number(product));
    }
    if symbolic.is_empty() {
        return rewritten(Expr::number(product));
    }

    let dropped_one = product == Number::one();
    let mut out = Vec::with_capacity(symbolic.len() + 1);
    if !dropped_one {
        out.push(Expr::number(product));
    }
    out.extend(symbolic);

    if out.len() == 1 {
        return rewritten(out.pop().expect("one element"));
    }
    if folded >= 2 || (folded == 1 && dropped_one) {
        return rewritten(Expr::compound(expr.head(), out));
    }
    declined()
}

fn power(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [base, exponent] = elements.as_slice() else {
        return declined();
    };

    if let Some(e) = exponent.as_number() {
        if e.is_exact_zero() {
            // 0^0 is indeterminate; anything else to the zeroth power is 1.
            if base.as_number().is_some_and(Number::is_zero) {
                let marker = scope.fault_marker(quern_foundation::NumericFault::Indeterminate);
                return rewritten(marker);
            }
            return rewritten(Expr::int(1));
        }
        if *e == Number::one() {
            return rewritten(base.clone());
        }
        if let Some(b) = base.as_number() {
            if let Some(k) = e.as_i64().and_then(|k| i32::try_from(k).ok()) {
                return match b.pow_i(k) {
                    Ok(result) => rewritten(Expr::number(result)),
                    Err(fault) => rewritten(scope.fault_marker(fault)),
                };
            }
            // Inexact exponent over a positive real base: machine fallback.
            if !b.is_exact() || !e.is_exact() {
                if let Some(result) = machine_power(b, e) {
                    return rewritten(Expr::number(result));
                }
            }
        }
    }
    declined()
}

fn machine_power(base: &Number, exponent: &Number) -> Option<Number> {
    let b = to_f64(base)?;
    let e = to_f64(exponent)?;
    if b <= 0.0 {
        return None;
    }
    Number::machine_real(b.powf(e))
}

fn to_f64(n: &Number) -> Option<f64> {
    let rational = n.to_rational()?;
    Some(rational.numer().to_f64()? / rational.denom().to_f64()?)
}

fn minus(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [argument] = elements.as_slice() else {
        return declined();
    };
    let times = scope.interner().intern("Times");
    rewritten(Expr::normal(times, [Expr::int(-1), argument.clone()]))
}

fn subtract(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [minuend, subtrahend] = elements.as_slice() else {
        return declined();
    };
    let plus = scope.interner().intern("Plus");
    let times = scope.interner().intern("Times");
    rewritten(Expr::normal(
        plus,
        [
            minuend.clone(),
            Expr::normal(times, [Expr::int(-1), subtrahend.clone()]),
        ],
    ))
}

fn divide(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [numerator, denominator] = elements.as_slice() else {
        return declined();
    };
    // Numeric division goes straight through the tower, so 0/0 reports
    // Indeterminate rather than folding through the Times normal form.
    if let (Some(n), Some(d)) = (numerator.as_number(), denominator.as_number()) {
        return match n.div(d) {
            Ok(result) => rewritten(Expr::number(result)),
            Err(fault) => rewritten(scope.fault_marker(fault)),
        };
    }
    let times = scope.interner().intern("Times");
    let power = scope.interner().intern("Power");
    rewritten(Expr::normal(
        times,
        [
            numerator.clone(),
            Expr::normal(power, [denominator.clone(), Expr::int(-1)]),
        ],
    ))
}

fn abs(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [argument] = elements.as_slice() else {
        return declined();
    };
    match argument.as_number().and_then(Number::abs) {
        Some(result) => rewritten(Expr::number(result)),
        None => declined(),
    }
}

fn sign(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [argument] = elements.as_slice() else {
        return declined();
    };
    match argument.as_number().and_then(Number::signum) {
        Some(result) => rewritten(Expr::number(result)),
        None => declined(),
    }
}
