//! Arbitrary-precision reals with significance tracking.
//!
//! A [`Real`] is a decimal significand times a power of ten, plus a tracked
//! [`Precision`]: either the machine-precision sentinel or an explicit count
//! of significant decimal digits. Arithmetic propagates precision by
//! significance rules: addition and subtraction are limited by the least
//! accurate operand after alignment, multiplication and division by the
//! least precise operand.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// Significant decimal digits carried by a machine-precision real.
///
/// Used as the working precision whenever a machine-precision operand meets
/// a tracked-precision one.
pub const MACHINE_DIGITS: u32 = 16;

/// Tracked precision of a [`Real`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    /// Machine precision. Sticky: any operation with a machine-precision
    /// operand yields a machine-precision result.
    Machine,
    /// Explicit count of significant decimal digits.
    Digits(u32),
}

impl Precision {
    /// The number of significant digits this precision represents.
    #[must_use]
    pub const fn digits(self) -> u32 {
        match self {
            Self::Machine => MACHINE_DIGITS,
            Self::Digits(d) => d,
        }
    }

    /// Combines two precisions for a relative-error operation (mul, div).
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Machine, _) | (_, Self::Machine) => Self::Machine,
            (Self::Digits(a), Self::Digits(b)) => Self::Digits(a.min(b)),
        }
    }

    /// Returns true for the machine-precision sentinel.
    #[must_use]
    pub const fn is_machine(self) -> bool {
        matches!(self, Self::Machine)
    }
}

/// An arbitrary-precision real number with significance tracking.
///
/// The value is `significand * 10^exponent`. The significand carries no
/// trailing zeros (they are folded into the exponent), so each value has a
/// unique representation and structural equality is well defined.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Real {
    significand: BigInt,
    exponent: i64,
    precision: Precision,
}

impl Real {
    /// Creates a real from raw parts, normalizing the significand.
    #[must_use]
    pub fn from_parts(significand: BigInt, exponent: i64, precision: Precision) -> Self {
        let mut real = Self {
            significand,
            exponent,
            precision,
        };
        real.normalize();
        real
    }

    /// Creates a real equal to an exact integer at the given precision.
    #[must_use]
    pub fn from_bigint(value: &BigInt, precision: Precision) -> Self {
        Self::from_parts(value.clone(), 0, precision).rounded(precision.digits())
    }

    /// Creates a real equal to an exact rational at the given precision.
    #[must_use]
    pub fn from_rational(value: &BigRational, precision: Precision) -> Self {
        if value.is_zero() {
            return Self::zero(precision);
        }

        let p = precision.digits().max(1);
        // First scale estimate from digit counts; one correction pass below.
        let mut scale = digits_of(value.numer()) as i64 - digits_of(value.denom()) as i64 + 1;
        loop {
            let shift = i64::from(p) - scale;
            let scaled = value * shifted_unit(shift);
            let significand = round_rational(&scaled);
            let got = digits_of(&significand) as i64;
            if got > i64::from(p) {
                scale += 1;
            } else if got < i64::from(p) && !significand.is_zero() {
                scale -= 1;
            } else {
                return Self::from_parts(significand, scale - i64::from(p), precision);
            }
        }
    }

    /// Creates a machine-precision real from an `f64`.
    ///
    /// Returns `None` for NaN and infinities, which have no finite decimal
    /// representation.
    #[must_use]
    pub fn try_from_f64(value: f64) -> Option<Self> {
        let rational = BigRational::from_float(value)?;
        Some(Self::from_rational(&rational, Precision::Machine))
    }

    /// The zero real at the given precision.
    #[must_use]
    pub fn zero(precision: Precision) -> Self {
        Self {
            significand: BigInt::zero(),
            exponent: 0,
            precision,
        }
    }

    /// Returns true if this real is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.significand.is_zero()
    }

    /// Returns true if this real is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.significand.sign() == Sign::Minus
    }

    /// The tracked precision.
    #[must_use]
    pub const fn precision(&self) -> Precision {
        self.precision
    }

    /// Decimal exponent of the value: |value| lies in
    /// `[10^(scale-1), 10^scale)`. Zero reports scale 0.
    #[must_use]
    pub fn scale(&self) -> i64 {
        if self.is_zero() {
            0
        } else {
            digits_of(&self.significand) as i64 + self.exponent
        }
    }

    /// Accuracy in decimal digits: correct digits to the right of the
    /// decimal point, `precision - scale`.
    #[must_use]
    pub fn accuracy(&self) -> i64 {
        i64::from(self.precision.digits()) - self.scale()
    }

    /// The exact rational value of this real.
    #[must_use]
    pub fn to_rational(&self) -> BigRational {
        BigRational::from(self.significand.clone()) * shifted_unit(self.exponent)
    }

    /// Approximates this real as an `f64`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let rational = self.to_rational();
        rational.numer().to_f64().unwrap_or(f64::NAN)
            / rational.denom().to_f64().unwrap_or(f64::NAN)
    }

    /// Returns this real rounded to at most `digits` significant digits,
    /// keeping the precision tag.
    #[must_use]
    pub fn rounded(&self, digits: u32) -> Self {
        let current = digits_of(&self.significand);
        if current <= digits.max(1) {
            return self.clone();
        }
        let drop = current - digits.max(1);
        let divisor = pow10(u64::from(drop));
        let significand = div_round(&self.significand, &divisor);
        Self::from_parts(
            significand,
            self.exponent + i64::from(drop),
            self.precision,
        )
    }

    /// Returns this real re-tagged and rounded to an explicit precision.
    #[must_use]
    pub fn with_precision(&self, precision: Precision) -> Self {
        let mut real = self.rounded(precision.digits());
        real.precision = precision;
        real
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> Self {
        Self {
            significand: -&self.significand,
            exponent: self.exponent,
            precision: self.precision,
        }
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            significand: self.significand.abs(),
            exponent: self.exponent,
            precision: self.precision,
        }
    }

    /// Addition under significance rules: the result's accuracy is the
    /// minimum of the operands' accuracies.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let exponent = self.exponent.min(other.exponent);
        let a = &self.significand * pow10((self.exponent - exponent) as u64);
        let b = &other.significand * pow10((other.exponent - exponent) as u64);
        let raw = Self::from_parts(a + b, exponent, Precision::Machine);

        if self.precision.is_machine() || other.precision.is_machine() {
            return raw.with_precision(Precision::Machine);
        }

        let accuracy = self.accuracy().min(other.accuracy());
        let digits = (accuracy + raw.scale()).clamp(0, i64::from(u32::MAX));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let digits = digits as u32;
        raw.with_precision(Precision::Digits(digits))
    }

    /// Subtraction; precision follows [`Real::add`].
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Multiplication: result precision is the minimum operand precision.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let precision = self.precision.combine(other.precision);
        Self::from_parts(
            &self.significand * &other.significand,
            self.exponent + other.exponent,
            precision,
        )
        .with_precision(precision)
    }

    /// Division: result precision is the minimum operand precision.
    ///
    /// Returns `None` when `other` is exactly zero.
    #[must_use]
    pub fn div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let precision = self.precision.combine(other.precision);
        let quotient = self.to_rational() / other.to_rational();
        Some(Self::from_rational(&quotient, precision))
    }

    /// Raises this real to a non-negative integer power by repeated
    /// squaring, carrying guard digits and rounding once at the end.
    #[must_use]
    pub fn pow_u64(&self, mut exp: u64) -> Self {
        let precision = self.precision;
        let working = precision.digits() + 4;

        let mut result = Self::from_parts(BigInt::from(1), 0, precision);
        let mut base = self.clone();
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(&base).rounded(working);
            }
            base = base.mul(&base).rounded(working);
            exp >>= 1;
        }
        result.with_precision(precision)
    }

    /// Exact numeric comparison.
    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => Ordering::Equal,
            _ => self.to_rational().cmp(&other.to_rational()),
        }
    }

    fn normalize(&mut self) {
        if self.significand.is_zero() {
            self.exponent = 0;
            return;
        }
        let ten = BigInt::from(10);
        while (&self.significand % &ten).is_zero() {
            self.significand = &self.significand / &ten;
            self.exponent += 1;
        }
    }
}

impl fmt::Debug for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}e{}", self.significand, self.exponent)?;
        match self.precision {
            Precision::Machine => write!(f, "`m"),
            Precision::Digits(d) => write!(f, "`{d}"),
        }
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

/// Number of decimal digits of `|value|`; zero reports 0.
fn digits_of(value: &BigInt) -> u32 {
    if value.is_zero() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let digits = value.abs().to_str_radix(10).len() as u32;
    digits
}

/// `10^exp` as a `BigInt`.
#[allow(clippy::cast_possible_truncation)]
fn pow10(exp: u64) -> BigInt {
    num_traits::pow(BigInt::from(10), exp as usize)
}

/// `10^shift` as an exact rational, for any sign of `shift`.
#[allow(clippy::cast_sign_loss)]
fn shifted_unit(shift: i64) -> BigRational {
    if shift >= 0 {
        BigRational::from(pow10(shift as u64))
    } else {
        BigRational::new(BigInt::from(1), pow10(shift.unsigned_abs()))
    }
}

/// Rounds a rational to the nearest integer, half away from zero.
fn round_rational(value: &BigRational) -> BigInt {
    div_round(value.numer(), value.denom())
}

/// Integer division rounded to nearest, half away from zero.
fn div_round(numer: &BigInt, denom: &BigInt) -> BigInt {
    let quotient = numer / denom;
    let remainder = numer % denom;
    if &remainder.abs() * 2 >= denom.abs() {
        let bump = if (numer.sign() == Sign::Minus) == (denom.sign() == Sign::Minus) {
            BigInt::from(1)
        } else {
            BigInt::from(-1)
        };
        quotient + bump
    } else {
        quotient
    }
}
