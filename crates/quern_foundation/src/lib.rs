//! Expression model, numeric tower, and interning for Quern.
//!
//! This crate provides:
//! - [`Expr`] - Immutable symbolic expression trees
//! - [`Number`] - The numeric tower (integer, rational, real, complex)
//! - [`Real`] - Significance-tracked arbitrary-precision reals
//! - [`SymbolId`] / [`Interner`] - Symbol interning
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod expr;
pub mod intern;
pub mod number;
pub mod pattern;
pub mod real;

pub use error::{EngineLimit, Error, ErrorContext, ErrorKind, Result};
pub use expr::{Compound, Expr, ExprVec};
pub use intern::{Interner, SymbolId};
pub use number::{Number, NumericFault};
pub use pattern::{PatternView, pattern_core, view};
pub use real::{MACHINE_DIGITS, Precision, Real};
