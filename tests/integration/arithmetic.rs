//! Session-level arithmetic: exactness, precision queries, and the
//! symbolic markers for undefined operations.

use quern_engine::diagnostics::Diagnostic;
use quern_foundation::{Expr, Number, Precision, Real, SymbolId};
use quern_runtime::Session;

fn call(session: &mut Session, name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    let head = session.symbol(name);
    Expr::normal(head, args)
}

fn rational(n: i64, d: i64) -> Expr {
    Expr::number(Number::rational(n, d).unwrap())
}

#[test]
fn exact_rational_arithmetic() {
    let mut session = Session::new();

    // 1/3 + 1/6 == 1/2, exactly.
    let expr = call(&mut session, "Plus", [rational(1, 3), rational(1, 6)]);
    let result = session.evaluate(&expr).unwrap();
    assert_eq!(result.expr, rational(1, 2));

    // 10 / 4 == 5/2, never a float.
    let expr = call(&mut session, "Divide", [Expr::int(10), Expr::int(4)]);
    let result = session.evaluate(&expr).unwrap();
    assert_eq!(result.expr, rational(5, 2));
}

#[test]
fn numeric_folding_keeps_symbolic_terms() {
    let mut session = Session::new();
    let z = session.symbol("z");

    // 1 + z + 2 folds the numbers and keeps z.
    let expr = call(
        &mut session,
        "Plus",
        [Expr::int(1), Expr::symbol(z), Expr::int(2)],
    );
    let result = session.evaluate(&expr).unwrap();

    let plus = session.lookup("Plus").unwrap();
    assert_eq!(
        result.expr,
        Expr::normal(plus, [Expr::int(3), Expr::symbol(z)])
    );
}

#[test]
fn division_by_zero_yields_complex_infinity() {
    let mut session = Session::new();
    let expr = call(&mut session, "Divide", [Expr::int(1), Expr::int(0)]);
    let result = session.evaluate(&expr).unwrap();
    assert_eq!(result.expr, Expr::symbol(SymbolId::COMPLEX_INFINITY));
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::DivisionByZero))
    );
}

#[test]
fn zero_over_zero_is_indeterminate() {
    let mut session = Session::new();
    let expr = call(&mut session, "Divide", [Expr::int(0), Expr::int(0)]);
    let result = session.evaluate(&expr).unwrap();
    assert_eq!(result.expr, Expr::symbol(SymbolId::INDETERMINATE));
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::IndeterminateValue))
    );
}

#[test]
fn power_folds_integer_exponents() {
    let mut session = Session::new();

    let expr = call(&mut session, "Power", [Expr::int(2), Expr::int(10)]);
    assert_eq!(session.evaluate(&expr).unwrap().expr, Expr::int(1024));

    let expr = call(&mut session, "Power", [Expr::int(2), Expr::int(-2)]);
    assert_eq!(session.evaluate(&expr).unwrap().expr, rational(1, 4));

    // 0^0 is indeterminate.
    let expr = call(&mut session, "Power", [Expr::int(0), Expr::int(0)]);
    assert_eq!(
        session.evaluate(&expr).unwrap().expr,
        Expr::symbol(SymbolId::INDETERMINATE)
    );
}

#[test]
fn precision_query_tracks_significance_loss() {
    let mut session = Session::new();

    let fine = Expr::real(Real::from_bigint(&1.into(), Precision::Digits(10)));
    let coarse = Expr::real(Real::from_bigint(&2.into(), Precision::Digits(3)));
    let sum = call(&mut session, "Plus", [fine, coarse]);
    let query = call(&mut session, "Precision", [sum]);

    let result = session.evaluate(&query).unwrap();
    let Expr::Number(Number::Int(digits)) = &result.expr else {
        panic!("Precision of a tracked real is an integer digit count");
    };
    assert!(*digits <= 3.into());
}

#[test]
fn precision_of_exact_values_is_infinite() {
    let mut session = Session::new();
    let query = call(&mut session, "Precision", [rational(1, 3)]);
    let result = session.evaluate(&query).unwrap();
    assert_eq!(result.expr, Expr::symbol(SymbolId::INFINITY));
}

#[test]
fn precision_of_machine_reals_is_the_sentinel() {
    let mut session = Session::new();
    let machine = Expr::number(Number::machine_real(2.5).unwrap());
    let query = call(&mut session, "Precision", [machine]);
    let result = session.evaluate(&query).unwrap();
    assert_eq!(result.expr, Expr::symbol(SymbolId::MACHINE_PRECISION));
}

#[test]
fn mixed_exact_and_real_sums_promote() {
    let mut session = Session::new();

    // 1/2 + 0.5 (machine) is a machine real, not a rational.
    let machine_half = Expr::number(Number::machine_real(0.5).unwrap());
    let expr = call(&mut session, "Plus", [rational(1, 2), machine_half]);
    let result = session.evaluate(&expr).unwrap();

    let Expr::Number(Number::Real(real)) = &result.expr else {
        panic!("mixed sum must be a real");
    };
    assert!(real.precision().is_machine());
    assert_eq!(
        Number::Real(real.clone()).cmp_value(&Number::int(1)),
        Some(std::cmp::Ordering::Equal)
    );
}

#[test]
fn comparisons_decide_numerically() {
    let mut session = Session::new();

    let expr = call(&mut session, "Less", [Expr::int(1), rational(3, 2), Expr::int(2)]);
    assert_eq!(session.evaluate(&expr).unwrap().expr, Expr::truth());

    let machine_two = Expr::number(Number::machine_real(2.0).unwrap());
    let expr = call(&mut session, "Equal", [Expr::int(2), machine_two]);
    assert_eq!(session.evaluate(&expr).unwrap().expr, Expr::truth());

    // Symbolic comparisons stay unevaluated.
    let w = session.symbol("w");
    let expr = call(&mut session, "Less", [Expr::symbol(w), Expr::int(1)]);
    let result = session.evaluate(&expr).unwrap();
    let less = session.lookup("Less").unwrap();
    assert_eq!(result.expr.head_symbol(), Some(less));
}

#[test]
fn abs_and_sign() {
    let mut session = Session::new();

    let expr = call(&mut session, "Abs", [Expr::int(-7)]);
    assert_eq!(session.evaluate(&expr).unwrap().expr, Expr::int(7));

    let expr = call(&mut session, "Sign", [rational(-2, 3)]);
    assert_eq!(session.evaluate(&expr).unwrap().expr, Expr::int(-1));
}
