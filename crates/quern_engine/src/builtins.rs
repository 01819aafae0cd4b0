//! Dispatch registry for builtin evaluators.
//!
//! The core does not know any builtin by name. The embedding layer
//! registers a capability per symbol at startup; during evaluation the
//! engine looks the head symbol up and offers it the normalized
//! expression. A builtin may decline, leaving the expression to the rule
//! engine.

use std::collections::HashMap;

use quern_foundation::{Expr, Result, SymbolId};

use crate::evaluate::EvalScope;

/// What a builtin did with the expression it was offered.
#[derive(Debug)]
pub enum BuiltinOutcome {
    /// The builtin claimed the call; evaluation restarts on the result.
    Rewritten(Expr),
    /// Not this builtin's call; fall through to the rule engine.
    Declined,
}

/// A builtin evaluator callable from the evaluation loop.
///
/// The function receives the whole normalized expression (head and
/// arguments already processed per the head's attributes) and a scope for
/// recursive evaluation, symbol table access, and diagnostics.
#[derive(Copy, Clone)]
pub struct BuiltinFn {
    /// Name for debugging.
    pub name: &'static str,
    /// The evaluator itself.
    pub func: fn(&Expr, &mut EvalScope<'_>) -> Result<BuiltinOutcome>,
}

impl std::fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}

/// Registry mapping head symbols to builtin evaluators.
#[derive(Clone, Debug, Default)]
pub struct BuiltinRegistry {
    entries: HashMap<SymbolId, BuiltinFn>,
}

impl BuiltinRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a builtin for a symbol, replacing any existing one.
    pub fn register(&mut self, symbol: SymbolId, builtin: BuiltinFn) {
        self.entries.insert(symbol, builtin);
    }

    /// Looks up the builtin for a symbol.
    #[must_use]
    pub fn get(&self, symbol: SymbolId) -> Option<BuiltinFn> {
        self.entries.get(&symbol).copied()
    }

    /// Returns true if a builtin is registered for the symbol.
    #[must_use]
    pub fn contains(&self, symbol: SymbolId) -> bool {
        self.entries.contains_key(&symbol)
    }

    /// Number of registered builtins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no builtin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
