//! Pattern matching, rule application, and the fixed-point evaluator for
//! Quern.
//!
//! This crate provides:
//! - [`Matcher`] / [`Bindings`] - The pattern matcher/unifier
//! - [`apply_rules`] - First-matching-rule dispatch over sorted rule sets
//! - [`Evaluator`] / [`Context`] - The attribute-driven evaluation loop
//! - [`BuiltinRegistry`] - Dispatch to externally registered builtins
//! - [`Diagnostic`] / [`DiagnosticSink`] - Structured evaluator warnings

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builtins;
pub mod diagnostics;
pub mod evaluate;
pub mod pattern;
pub mod rules;
pub mod subst;

pub use builtins::{BuiltinFn, BuiltinOutcome, BuiltinRegistry};
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use evaluate::{Context, EvalLimits, EvalScope, Evaluator};
pub use pattern::{Bindings, MatchEnv, Matcher, TableEnv};
pub use rules::{RuleOutcome, apply_rules};
pub use subst::substitute;
