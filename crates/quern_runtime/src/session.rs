//! Session state for embedding the engine.
//!
//! The session owns the interner, the symbol table, the builtin registry,
//! and the evaluator configuration. One evaluation call runs to a fixed
//! point (or a resource limit) before returning; diagnostics collected
//! along the way are handed back with the result.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use quern_engine::evaluate::{Context, EvalLimits, Evaluator};
use quern_engine::diagnostics::Diagnostic;
use quern_foundation::{Expr, Interner, Result, SymbolId};
use quern_symbols::SymbolTable;

use crate::stdlib;

/// The result of one top-level evaluation: the fixed-point expression and
/// every diagnostic recorded on the way there.
#[derive(Clone, Debug)]
pub struct Evaluated {
    /// The evaluated expression.
    pub expr: Expr,
    /// Diagnostics recorded during this call, oldest first.
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluated {
    /// Returns true if the evaluation finished without diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// An independent evaluation session.
pub struct Session {
    context: Context,
    evaluator: Evaluator,
}

impl Session {
    /// Creates a session with the reference stdlib installed and default
    /// limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(EvalLimits::default())
    }

    /// Creates a session with explicit evaluator limits.
    #[must_use]
    pub fn with_limits(limits: EvalLimits) -> Self {
        let mut context = Context::new();
        stdlib::install(&mut context);
        Self {
            context,
            evaluator: Evaluator::with_limits(limits),
        }
    }

    /// Interns a symbol name.
    pub fn symbol(&mut self, name: &str) -> SymbolId {
        self.context.interner.intern(name)
    }

    /// Looks up a symbol without interning it.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.context.interner.lookup(name)
    }

    /// The interner.
    #[must_use]
    pub const fn interner(&self) -> &Interner {
        &self.context.interner
    }

    /// The symbol table.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.context.symbols
    }

    /// The symbol table, mutable. Intended for embedders installing
    /// definitions outside the assignment builtins.
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.context.symbols
    }

    /// The evaluation context (interner, table, builtin registry).
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Installs a cancellation flag polled between rewrite iterations.
    pub fn set_interrupt(&mut self, interrupt: Option<Arc<AtomicBool>>) {
        self.evaluator.set_interrupt(interrupt);
    }

    /// Evaluates an expression to its fixed point.
    ///
    /// # Errors
    /// Propagates builtin errors. Resource-limit conditions are returned
    /// as diagnostics on the [`Evaluated`], not as errors.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Evaluated> {
        let result = self.evaluator.evaluate(expr, &mut self.context)?;
        Ok(Evaluated {
            expr: result,
            diagnostics: self.evaluator.drain_diagnostics(),
        })
    }

    /// Renders an expression in full form using this session's interner.
    #[must_use]
    pub fn format(&self, expr: &Expr) -> String {
        expr.to_full_form(&self.context.interner)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
