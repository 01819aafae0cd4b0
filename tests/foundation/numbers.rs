//! Numeric tower behavior: exactness, promotion, significance tracking.

use std::cmp::Ordering;

use quern_foundation::{MACHINE_DIGITS, Number, NumericFault, Precision, Real};

fn rational(n: i64, d: i64) -> Number {
    Number::rational(n, d).unwrap()
}

fn real_digits(value: i64, digits: u32) -> Real {
    Real::from_bigint(&value.into(), Precision::Digits(digits))
}

#[test]
fn exactness_is_preserved() {
    // 1/3 + 1/6 is exactly 1/2, never a float.
    let sum = rational(1, 3).add(&rational(1, 6));
    assert_eq!(sum, rational(1, 2));
    assert!(sum.is_exact());

    // 2/4 collapses to lowest terms, 4/2 to an integer.
    assert_eq!(rational(2, 4), rational(1, 2));
    assert_eq!(rational(4, 2), Number::int(2));
}

#[test]
fn division_never_drops_to_floats() {
    let q = Number::int(10).div(&Number::int(4)).unwrap();
    assert_eq!(q, rational(5, 2));
    assert!(q.is_exact());
}

#[test]
fn division_by_zero_is_a_fault_not_a_panic() {
    assert_eq!(
        Number::int(7).div(&Number::zero()),
        Err(NumericFault::DivisionByZero)
    );
    assert_eq!(
        Number::zero().div(&Number::zero()),
        Err(NumericFault::Indeterminate)
    );
}

#[test]
fn precision_propagates_through_addition() {
    // 10-digit + 3-digit => at most 3 digits.
    let fine = Number::real(real_digits(1, 10));
    let coarse = Number::real(real_digits(2, 3));
    let sum = fine.add(&coarse);
    let Some(Precision::Digits(digits)) = sum.precision() else {
        panic!("sum of reals must carry explicit precision");
    };
    assert!(digits <= 3);
}

#[test]
fn precision_propagates_through_multiplication() {
    let fine = Number::real(real_digits(3, 20));
    let coarse = Number::real(real_digits(7, 5));
    let product = fine.mul(&coarse);
    assert_eq!(product.precision(), Some(Precision::Digits(5)));
}

#[test]
fn exact_operand_promotes_to_real_precision() {
    let real = Number::real(real_digits(2, 6));
    let sum = rational(1, 2).add(&real);
    let Some(Precision::Digits(digits)) = sum.precision() else {
        panic!("mixed sum must be a tracked real");
    };
    assert!(digits <= 6);

    // Value is exact within the tracked digits: 0.5 + 2 = 2.5.
    assert_eq!(
        sum.cmp_value(&rational(5, 2)),
        Some(Ordering::Equal)
    );
}

#[test]
fn machine_precision_is_contagious() {
    let machine = Number::machine_real(1.5).unwrap();
    let tracked = Number::real(real_digits(2, 50));
    assert_eq!(machine.add(&tracked).precision(), Some(Precision::Machine));
    assert_eq!(
        machine.mul(&tracked).precision(),
        Some(Precision::Machine)
    );
    assert_eq!(Precision::Machine.digits(), MACHINE_DIGITS);
}

#[test]
fn complex_collapses_only_on_exact_zero() {
    let collapsed = Number::complex(Number::int(5), Number::zero());
    assert_eq!(collapsed, Number::int(5));

    let kept = Number::complex(
        Number::int(5),
        Number::real(Real::zero(Precision::Machine)),
    );
    assert!(matches!(kept, Number::Complex(_, _)));
}

#[test]
fn complex_arithmetic_is_componentwise_exact() {
    // (2 + 3i) + (1 - 3i) = 3
    let a = Number::complex(Number::int(2), Number::int(3));
    let b = Number::complex(Number::int(1), Number::int(-3));
    assert_eq!(a.add(&b), Number::int(3));

    // i * i = -1
    let i = Number::complex(Number::zero(), Number::one());
    assert_eq!(i.mul(&i), Number::int(-1));
}

#[test]
fn powers_of_exact_numbers_stay_exact() {
    assert_eq!(Number::int(3).pow_i(4).unwrap(), Number::int(81));
    assert_eq!(rational(1, 2).pow_i(-3).unwrap(), Number::int(8));
    assert_eq!(
        Number::int(10).pow_i(-2).unwrap(),
        rational(1, 100)
    );
}

#[test]
fn cross_layer_comparison_is_by_value() {
    let half_real = Number::machine_real(0.5).unwrap();
    assert_eq!(
        rational(1, 2).cmp_value(&half_real),
        Some(Ordering::Equal)
    );
    assert_eq!(
        Number::int(1).cmp_value(&half_real),
        Some(Ordering::Greater)
    );
}
