//! The numeric tower: exact integers and rationals, significance-tracked
//! reals, and complex numbers over all of them.
//!
//! Promotion rules: exact with exact stays exact; exact with a real is
//! promoted to that real's precision before combining; anything with a
//! complex operand is lifted to complex and combined componentwise.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::intern::SymbolId;
use crate::real::{Precision, Real};

/// Undefined outcomes of numeric operations.
///
/// These are not engine errors: the evaluator converts them into the
/// symbolic markers `ComplexInfinity` and `Indeterminate`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumericFault {
    /// Division of a nonzero value by exact or inexact zero.
    DivisionByZero,
    /// An operation with no defined value, such as `0/0` or `0^0`.
    Indeterminate,
}

/// A number in the tower.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Number {
    /// Exact arbitrary-precision integer.
    Int(BigInt),
    /// Exact rational in lowest terms; never integer-valued (construction
    /// collapses those to `Int`) and the denominator is always positive.
    Rational(BigRational),
    /// Arbitrary-precision real with tracked precision.
    Real(Real),
    /// Complex number; parts are never themselves complex, and an exactly
    /// zero imaginary part collapses to the real part at construction.
    Complex(Box<Number>, Box<Number>),
}

impl Number {
    /// An exact integer.
    #[must_use]
    pub fn int(value: impl Into<BigInt>) -> Self {
        Self::Int(value.into())
    }

    /// An exact rational, reduced to lowest terms; collapses to `Int` when
    /// integer-valued. Returns a fault for a zero denominator.
    pub fn rational(
        numer: impl Into<BigInt>,
        denom: impl Into<BigInt>,
    ) -> Result<Self, NumericFault> {
        let numer = numer.into();
        let denom = denom.into();
        if denom.is_zero() {
            return Err(if numer.is_zero() {
                NumericFault::Indeterminate
            } else {
                NumericFault::DivisionByZero
            });
        }
        Ok(Self::from_big_rational(BigRational::new(numer, denom)))
    }

    /// Wraps a rational, collapsing integer values to `Int`.
    #[must_use]
    pub fn from_big_rational(value: BigRational) -> Self {
        if value.is_integer() {
            Self::Int(value.to_integer())
        } else {
            Self::Rational(value)
        }
    }

    /// Wraps a real.
    #[must_use]
    pub fn real(value: Real) -> Self {
        Self::Real(value)
    }

    /// A machine-precision real from an `f64`; `None` for NaN/infinities.
    #[must_use]
    pub fn machine_real(value: f64) -> Option<Self> {
        Real::try_from_f64(value).map(Self::Real)
    }

    /// A complex number; collapses when the imaginary part is exactly zero.
    ///
    /// Exactly zero means the exact integer 0 — an inexact `0.` imaginary
    /// part keeps the number complex.
    #[must_use]
    pub fn complex(re: Self, im: Self) -> Self {
        if im.is_exact_zero() {
            re
        } else {
            Self::Complex(Box::new(re), Box::new(im))
        }
    }

    /// The exact integer zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::Int(BigInt::zero())
    }

    /// The exact integer one.
    #[must_use]
    pub fn one() -> Self {
        Self::Int(BigInt::one())
    }

    /// Head symbol of this number as an atom: `Integer`, `Rational`,
    /// `Real`, or `Complex`.
    #[must_use]
    pub const fn head_symbol(&self) -> SymbolId {
        match self {
            Self::Int(_) => SymbolId::INTEGER,
            Self::Rational(_) => SymbolId::RATIONAL,
            Self::Real(_) => SymbolId::REAL,
            Self::Complex(_, _) => SymbolId::COMPLEX,
        }
    }

    /// Returns true for `Int` and `Rational` (and nothing else).
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Rational(_))
    }

    /// Returns true only for the exact integer zero.
    #[must_use]
    pub fn is_exact_zero(&self) -> bool {
        matches!(self, Self::Int(n) if n.is_zero())
    }

    /// Returns true for any zero value, exact or inexact.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int(n) => n.is_zero(),
            Self::Rational(_) => false,
            Self::Real(r) => r.is_zero(),
            Self::Complex(re, im) => re.is_zero() && im.is_zero(),
        }
    }

    /// Attempts to extract a small integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => n.to_i64(),
            _ => None,
        }
    }

    /// Exact rational value for non-complex numbers (reals are exactly
    /// decimal rationals).
    #[must_use]
    pub fn to_rational(&self) -> Option<BigRational> {
        match self {
            Self::Int(n) => Some(BigRational::from(n.clone())),
            Self::Rational(r) => Some(r.clone()),
            Self::Real(r) => Some(r.to_rational()),
            Self::Complex(_, _) => None,
        }
    }

    /// The tracked precision of the least precise real component, if any
    /// component is inexact.
    #[must_use]
    pub fn precision(&self) -> Option<Precision> {
        match self {
            Self::Int(_) | Self::Rational(_) => None,
            Self::Real(r) => Some(r.precision()),
            Self::Complex(re, im) => match (re.precision(), im.precision()) {
                (None, p) | (p, None) => p,
                (Some(a), Some(b)) => Some(if a.digits() <= b.digits() { a } else { b }),
            },
        }
    }

    /// This number promoted to a real at the given precision. Complex
    /// numbers are returned unchanged.
    #[must_use]
    pub fn to_real(&self, precision: Precision) -> Self {
        match self {
            Self::Int(n) => Self::Real(Real::from_bigint(n, precision)),
            Self::Rational(r) => Self::Real(Real::from_rational(r, precision)),
            Self::Real(_) | Self::Complex(_, _) => self.clone(),
        }
    }

    /// Real part; the number itself for non-complex values.
    #[must_use]
    pub fn re(&self) -> Self {
        match self {
            Self::Complex(re, _) => (**re).clone(),
            _ => self.clone(),
        }
    }

    /// Imaginary part; exact zero for non-complex values.
    #[must_use]
    pub fn im(&self) -> Self {
        match self {
            Self::Complex(_, im) => (**im).clone(),
            _ => Self::zero(),
        }
    }

    /// Addition with promotion.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        match promote(self, other) {
            Promoted::Exact(a, b) => Self::from_big_rational(a + b),
            Promoted::Real(a, b) => Self::Real(a.add(&b)),
            Promoted::Complex(ar, ai, br, bi) => Self::complex(ar.add(&br), ai.add(&bi)),
        }
    }

    /// Subtraction with promotion.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Multiplication with promotion.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        match promote(self, other) {
            Promoted::Exact(a, b) => Self::from_big_rational(a * b),
            Promoted::Real(a, b) => Self::Real(a.mul(&b)),
            Promoted::Complex(ar, ai, br, bi) => {
                // (ar + ai i)(br + bi i)
                let re = ar.mul(&br).sub(&ai.mul(&bi));
                let im = ar.mul(&bi).add(&ai.mul(&br));
                Self::complex(re, im)
            }
        }
    }

    /// Division with promotion. An exact `0/0` is indeterminate; any other
    /// division by zero is a `DivisionByZero` fault.
    pub fn div(&self, other: &Self) -> Result<Self, NumericFault> {
        if other.is_zero() {
            return Err(if self.is_exact_zero() {
                NumericFault::Indeterminate
            } else {
                NumericFault::DivisionByZero
            });
        }
        match promote(self, other) {
            Promoted::Exact(a, b) => Ok(Self::from_big_rational(a / b)),
            Promoted::Real(a, b) => a
                .div(&b)
                .map(Self::Real)
                .ok_or(NumericFault::DivisionByZero),
            Promoted::Complex(ar, ai, br, bi) => {
                // Multiply by the conjugate of the denominator.
                let norm = br.mul(&br).add(&bi.mul(&bi));
                let re = ar.mul(&br).add(&ai.mul(&bi)).div(&norm)?;
                let im = ai.mul(&br).sub(&ar.mul(&bi)).div(&norm)?;
                Ok(Self::complex(re, im))
            }
        }
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> Self {
        match self {
            Self::Int(n) => Self::Int(-n),
            Self::Rational(r) => Self::Rational(-r),
            Self::Real(r) => Self::Real(r.neg()),
            Self::Complex(re, im) => Self::Complex(Box::new(re.neg()), Box::new(im.neg())),
        }
    }

    /// Absolute value for non-complex numbers; `None` for complex (which
    /// would need a square root).
    #[must_use]
    pub fn abs(&self) -> Option<Self> {
        match self {
            Self::Int(n) => Some(Self::Int(n.abs())),
            Self::Rational(r) => Some(Self::Rational(r.abs())),
            Self::Real(r) => Some(Self::Real(r.abs())),
            Self::Complex(_, _) => None,
        }
    }

    /// Sign as an exact integer (-1, 0, 1) for non-complex numbers.
    #[must_use]
    pub fn signum(&self) -> Option<Self> {
        let value = match self {
            Self::Int(n) => n.signum(),
            Self::Rational(r) => r.numer().signum(),
            Self::Real(r) => {
                if r.is_zero() {
                    BigInt::zero()
                } else if r.is_negative() {
                    BigInt::from(-1)
                } else {
                    BigInt::one()
                }
            }
            Self::Complex(_, _) => return None,
        };
        Some(Self::Int(value))
    }

    /// Integer power. `0^0` and `0^negative` fault; everything else is
    /// exact for exact bases and significance-tracked for real bases.
    pub fn pow_i(&self, exp: i32) -> Result<Self, NumericFault> {
        if self.is_zero() {
            return match exp.cmp(&0) {
                Ordering::Greater => Ok(self.clone()),
                Ordering::Equal => Err(NumericFault::Indeterminate),
                Ordering::Less => Err(NumericFault::DivisionByZero),
            };
        }
        if exp == 0 {
            return Ok(Self::one());
        }

        let magnitude = exp.unsigned_abs();
        let positive = match self {
            Self::Int(n) => Self::Int(num_traits::pow(n.clone(), magnitude as usize)),
            Self::Rational(r) => {
                Self::from_big_rational(num_traits::pow(r.clone(), magnitude as usize))
            }
            Self::Real(r) => Self::Real(r.pow_u64(u64::from(magnitude))),
            Self::Complex(_, _) => {
                let mut acc = Self::one();
                for _ in 0..magnitude {
                    acc = acc.mul(self);
                }
                acc
            }
        };

        if exp < 0 {
            Self::one().div(&positive)
        } else {
            Ok(positive)
        }
    }

    /// Exact value comparison for non-complex numbers; `None` when either
    /// side is complex (complex numbers are not ordered).
    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Option<Ordering> {
        match (self.to_rational(), other.to_rational()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }

    /// Canonical total order used by expression ordering: by real part,
    /// then imaginary part, then exactness rank (exact before inexact),
    /// then precision.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let re = rational_of(&self.re()).cmp(&rational_of(&other.re()));
        if re != Ordering::Equal {
            return re;
        }
        let im = rational_of(&self.im()).cmp(&rational_of(&other.im()));
        if im != Ordering::Equal {
            return im;
        }
        let rank = variant_rank(self).cmp(&variant_rank(other));
        if rank != Ordering::Equal {
            return rank;
        }
        precision_rank(self).cmp(&precision_rank(other))
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Self::Real(r) => write!(f, "{r:?}"),
            Self::Complex(re, im) => write!(f, "Complex[{re:?}, {im:?}]"),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Self::Real(r) => write!(f, "{r}"),
            Self::Complex(re, im) => write!(f, "{re} + {im} I"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Int(BigInt::from(value))
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Self::Int(value)
    }
}

/// Operand pair after promotion to a common layer of the tower.
enum Promoted {
    Exact(BigRational, BigRational),
    Real(Real, Real),
    Complex(Number, Number, Number, Number),
}

fn promote(a: &Number, b: &Number) -> Promoted {
    if let (Number::Complex(_, _), _) | (_, Number::Complex(_, _)) = (a, b) {
        return Promoted::Complex(a.re(), a.im(), b.re(), b.im());
    }
    match (a, b) {
        (Number::Real(x), Number::Real(y)) => Promoted::Real(x.clone(), y.clone()),
        (Number::Real(x), other) => {
            let Number::Real(y) = other.to_real(x.precision()) else {
                unreachable!("non-complex promotion always yields a real")
            };
            Promoted::Real(x.clone(), y)
        }
        (other, Number::Real(y)) => {
            let Number::Real(x) = other.to_real(y.precision()) else {
                unreachable!("non-complex promotion always yields a real")
            };
            Promoted::Real(x, y.clone())
        }
        _ => {
            let x = a.to_rational().expect("exact operand");
            let y = b.to_rational().expect("exact operand");
            Promoted::Exact(x, y)
        }
    }
}

fn rational_of(n: &Number) -> BigRational {
    n.to_rational().unwrap_or_else(|| BigRational::zero())
}

const fn variant_rank(n: &Number) -> u8 {
    match n {
        Number::Int(_) => 0,
        Number::Rational(_) => 1,
        Number::Real(_) => 2,
        Number::Complex(_, _) => 3,
    }
}

fn precision_rank(n: &Number) -> u32 {
    n.precision().map_or(u32::MAX, Precision::digits)
}
