//! Session management and the reference builtin library for Quern.
//!
//! A [`Session`] owns one interner, one symbol table, one builtin registry,
//! and one evaluator. Sessions are fully independent: there is no global
//! state, and concurrent sessions on separate threads never share a table.
//!
//! The [`stdlib`] module is the reference slice of the builtin catalog:
//! enough arithmetic, comparison, control, structural, and assignment
//! builtins to exercise every part of the core engine.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod session;
pub mod stdlib;

pub use session::{Evaluated, Session};
