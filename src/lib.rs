//! Quern - Symbolic computation engine
//!
//! This crate re-exports all layers of the Quern system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: quern_runtime    — Sessions, reference builtin library
//! Layer 2: quern_engine     — Pattern matcher, rule engine, evaluator
//! Layer 1: quern_symbols    — Attributes, rules, symbol table
//! Layer 0: quern_foundation — Expressions, numeric tower, interning
//! ```

pub use quern_engine as engine;
pub use quern_foundation as foundation;
pub use quern_runtime as runtime;
pub use quern_symbols as symbols;
