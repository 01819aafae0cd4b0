//! The fixed-point evaluator.
//!
//! An expression is evaluated by repeatedly applying one rewrite step until
//! nothing changes: normalize the compound per its head's attributes, offer
//! it to the builtin registry, then to up-values of its arguments, then to
//! down- or sub-values of its head. Iteration and recursion limits bound
//! the loop; hitting one is a reported, non-fatal outcome that returns the
//! last expression reached.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use quern_foundation::{Expr, Interner, NumericFault, Result, SymbolId};
use quern_symbols::{Attributes, RuleSlot, SymbolTable};

use crate::builtins::{BuiltinOutcome, BuiltinRegistry};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::pattern::{MatchEnv, Matcher};
use crate::rules::{RuleOutcome, apply_rules};

/// Resource limits for one top-level evaluation call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum expression nesting depth.
    pub recursion_limit: usize,
    /// Maximum rewrite iterations at one depth.
    pub iteration_limit: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            recursion_limit: 1024,
            iteration_limit: 4096,
        }
    }
}

/// Everything the evaluator reads during evaluation: the interner, the
/// symbol table, and the builtin registry. One per session; never shared
/// between sessions.
pub struct Context {
    /// Symbol interner.
    pub interner: Interner,
    /// The symbol table. The evaluator only reads it; assignment builtins
    /// mutate it through [`EvalScope`].
    pub symbols: SymbolTable,
    /// Builtin dispatch registry, populated by the embedding layer.
    pub builtins: BuiltinRegistry,
}

impl Context {
    /// Creates a context with reserved symbols interned and nothing else.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            symbols: SymbolTable::new(),
            builtins: BuiltinRegistry::new(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// The evaluator: limits, cancellation flag, and the diagnostic sink.
pub struct Evaluator {
    limits: EvalLimits,
    interrupt: Option<Arc<AtomicBool>>,
    sink: DiagnosticSink,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Creates an evaluator with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(EvalLimits::default())
    }

    /// Creates an evaluator with explicit limits.
    #[must_use]
    pub fn with_limits(limits: EvalLimits) -> Self {
        Self {
            limits,
            interrupt: None,
            sink: DiagnosticSink::new(),
        }
    }

    /// The configured limits.
    #[must_use]
    pub const fn limits(&self) -> EvalLimits {
        self.limits
    }

    /// Installs a cancellation flag, polled between rewrite iterations.
    /// Aborts happen between rule applications, never inside one.
    pub fn set_interrupt(&mut self, interrupt: Option<Arc<AtomicBool>>) {
        self.interrupt = interrupt;
    }

    /// The buffered diagnostics.
    #[must_use]
    pub const fn diagnostics(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Drains all buffered diagnostics.
    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.sink.drain()
    }

    /// Evaluates an expression to its fixed point.
    ///
    /// # Errors
    /// Propagates errors raised by builtins; resource-limit conditions are
    /// diagnostics, not errors.
    pub fn evaluate(&mut self, expr: &Expr, ctx: &mut Context) -> Result<Expr> {
        self.eval_at(expr, ctx, 0)
    }

    pub(crate) fn eval_at(&mut self, expr: &Expr, ctx: &mut Context, depth: usize) -> Result<Expr> {
        if depth >= self.limits.recursion_limit {
            self.sink.push(Diagnostic::RecursionLimitReached { depth });
            return Ok(expr.clone());
        }

        let mut current = expr.clone();
        let mut iterations = 0usize;
        loop {
            if self.is_interrupted() {
                self.sink.push(Diagnostic::Interrupted);
                break;
            }
            if iterations >= self.limits.iteration_limit {
                self.sink.push(Diagnostic::IterationLimitReached {
                    head: current.head_symbol(),
                    limit: self.limits.iteration_limit,
                });
                break;
            }
            let next = self.eval_once(&current, ctx, depth)?;
            if next == current {
                break;
            }
            current = next;
            iterations += 1;
        }
        Ok(current)
    }

    /// One rewrite step. Returning the input unchanged means a fixed point.
    fn eval_once(&mut self, expr: &Expr, ctx: &mut Context, depth: usize) -> Result<Expr> {
        match expr {
            Expr::Number(_) | Expr::String(_) => Ok(expr.clone()),
            Expr::Symbol(id) => Ok(ctx
                .symbols
                .own_value(*id)
                .map_or_else(|| expr.clone(), |own| own.value.clone())),
            Expr::Compound(_) => self.eval_compound(expr, ctx, depth),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn eval_compound(&mut self, expr: &Expr, ctx: &mut Context, depth: usize) -> Result<Expr> {
        let compound = expr.as_compound().expect("compound expression");

        let head = self.eval_at(&compound.head, ctx, depth + 1)?;
        let head_symbol = head.as_symbol();

        // Evaluate[…] is transparent: it evaluates its contents and
        // disappears, even though it mostly appears inside held arguments.
        if head_symbol == Some(SymbolId::EVALUATE) {
            return self.eval_override(compound.elements.iter(), ctx, depth);
        }

        let attrs = head_symbol.map_or_else(Attributes::empty, |s| ctx.symbols.attributes(s));
        let hold_complete = attrs.contains(Attributes::HOLD_ALL_COMPLETE);

        // Step 2: evaluate the non-held elements, honoring Evaluate
        // overrides inside held positions (except under HoldAllComplete).
        let mut elements: Vec<Expr> = compound.elements.iter().cloned().collect();
        for (index, element) in elements.iter_mut().enumerate() {
            let held = if hold_complete {
                true
            } else if index == 0 {
                attrs.holds_first()
            } else {
                attrs.holds_rest()
            };
            if !held || (!hold_complete && element.has_head(SymbolId::EVALUATE)) {
                *element = self.eval_at(element, ctx, depth + 1)?;
            }
        }

        // Splice Sequence arguments.
        if !hold_complete
            && !attrs.contains(Attributes::SEQUENCE_HOLD)
            && elements.iter().any(|e| e.has_head(SymbolId::SEQUENCE))
        {
            let mut spliced = Vec::with_capacity(elements.len());
            for element in elements {
                if element.has_head(SymbolId::SEQUENCE) {
                    spliced.extend(element.elements());
                } else {
                    spliced.push(element);
                }
            }
            elements = spliced;
        }

        // Step 3: Flat heads flatten nested same-head compounds.
        if attrs.contains(Attributes::FLAT) {
            if let Some(symbol) = head_symbol {
                if elements.iter().any(|e| e.has_head(symbol)) {
                    elements = flatten_into(symbol, elements);
                }
            }
        }

        // Step 4: Orderless heads sort into canonical order.
        if attrs.contains(Attributes::ORDERLESS) {
            elements.sort_by(Expr::canonical_cmp);
        }

        let normalized = Expr::compound(head.clone(), elements.iter().cloned());

        // Step 5: Listable heads thread over List arguments.
        if attrs.contains(Attributes::LISTABLE)
            && elements.iter().any(|e| e.has_head(SymbolId::LIST))
        {
            match thread_listable(&head, &elements) {
                Some(threaded) => return Ok(threaded),
                None => {
                    self.sink.push(Diagnostic::ListableLengthMismatch {
                        head: head_symbol.unwrap_or(SymbolId::LIST),
                    });
                }
            }
        }

        // Step 6: builtin dispatch.
        if let Some(symbol) = head_symbol {
            if let Some(builtin) = ctx.builtins.get(symbol) {
                let mut scope = EvalScope {
                    evaluator: &mut *self,
                    ctx: &mut *ctx,
                    depth,
                };
                if let BuiltinOutcome::Rewritten(result) = (builtin.func)(&normalized, &mut scope)?
                {
                    return Ok(result);
                }
            }
        }

        // Step 7a: up-values of each argument's head, left to right.
        if !hold_complete {
            for element in &elements {
                let Some(key) = up_value_key(element) else {
                    continue;
                };
                let rules = ctx.symbols.rules(key, RuleSlot::Up);
                if rules.is_empty() {
                    continue;
                }
                let rules = rules.clone();
                let matcher = Matcher::new();
                let mut env = EngineEnv {
                    evaluator: &mut *self,
                    ctx: &mut *ctx,
                    depth,
                };
                if let RuleOutcome::Applied(result) =
                    apply_rules(&rules, &normalized, &matcher, &mut env)
                {
                    return Ok(result);
                }
            }
        }

        // Step 7b: down-values of a symbol head, or sub-values of the base
        // head for curried expressions.
        let slot_rules = match head_symbol {
            Some(symbol) => Some((symbol, RuleSlot::Down)),
            None => normalized
                .base_head_symbol()
                .map(|symbol| (symbol, RuleSlot::Sub)),
        };
        if let Some((symbol, slot)) = slot_rules {
            let rules = ctx.symbols.rules(symbol, slot);
            if !rules.is_empty() {
                let rules = rules.clone();
                let matcher = Matcher::new();
                let mut env = EngineEnv {
                    evaluator: &mut *self,
                    ctx: &mut *ctx,
                    depth,
                };
                if let RuleOutcome::Applied(result) =
                    apply_rules(&rules, &normalized, &matcher, &mut env)
                {
                    return Ok(result);
                }
            }
        }

        Ok(normalized)
    }

    /// Evaluates the contents of an `Evaluate[…]` wrapper and drops it.
    fn eval_override<'e>(
        &mut self,
        elements: impl Iterator<Item = &'e Expr>,
        ctx: &mut Context,
        depth: usize,
    ) -> Result<Expr> {
        let mut evaluated = Vec::new();
        for element in elements {
            evaluated.push(self.eval_at(element, ctx, depth + 1)?);
        }
        Ok(match evaluated.len() {
            1 => evaluated.pop().expect("one element"),
            _ => Expr::sequence(evaluated),
        })
    }

    fn is_interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// The scope handed to builtins: recursive evaluation, table access (the
/// sanctioned mutation path for assignment builtins), the interner, and
/// the diagnostic sink.
pub struct EvalScope<'a> {
    evaluator: &'a mut Evaluator,
    ctx: &'a mut Context,
    depth: usize,
}

impl EvalScope<'_> {
    /// Recursively evaluates an expression at the current depth.
    ///
    /// # Errors
    /// Propagates builtin errors, as [`Evaluator::evaluate`] does.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Expr> {
        self.evaluator.eval_at(expr, self.ctx, self.depth + 1)
    }

    /// The symbol table, mutable: assignment builtins define and clear
    /// values here.
    pub fn symbols(&mut self) -> &mut SymbolTable {
        &mut self.ctx.symbols
    }

    /// The symbol table, read-only.
    #[must_use]
    pub fn symbols_ref(&self) -> &SymbolTable {
        &self.ctx.symbols
    }

    /// The interner.
    pub fn interner(&mut self) -> &mut Interner {
        &mut self.ctx.interner
    }

    /// Records a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.evaluator.sink.push(diagnostic);
    }

    /// Converts a numeric fault into its symbolic marker, recording the
    /// matching diagnostic.
    pub fn fault_marker(&mut self, fault: NumericFault) -> Expr {
        match fault {
            NumericFault::DivisionByZero => {
                self.emit(Diagnostic::DivisionByZero);
                Expr::symbol(SymbolId::COMPLEX_INFINITY)
            }
            NumericFault::Indeterminate => {
                self.emit(Diagnostic::IndeterminateValue);
                Expr::symbol(SymbolId::INDETERMINATE)
            }
        }
    }

    /// Matches a pattern against a subject under this scope's symbol table
    /// and guard evaluation.
    #[must_use]
    pub fn matches(&mut self, pattern: &Expr, subject: &Expr) -> Vec<crate::pattern::Bindings> {
        let matcher = Matcher::new();
        let mut env = EngineEnv {
            evaluator: &mut *self.evaluator,
            ctx: &mut *self.ctx,
            depth: self.depth,
        };
        matcher.matches(pattern, subject, &mut env)
    }
}

/// Match environment backed by the live evaluator: guards are evaluated
/// for real, attributes and defaults come from the session table.
struct EngineEnv<'a> {
    evaluator: &'a mut Evaluator,
    ctx: &'a mut Context,
    depth: usize,
}

impl MatchEnv for EngineEnv<'_> {
    fn attributes(&self, symbol: SymbolId) -> Attributes {
        self.ctx.symbols.attributes(symbol)
    }

    fn default_value(&self, symbol: SymbolId) -> Option<Expr> {
        self.ctx.symbols.default_value(symbol).cloned()
    }

    fn eval_condition(&mut self, test: &Expr) -> bool {
        self.evaluator
            .eval_at(test, self.ctx, self.depth + 1)
            .map(|result| result == Expr::truth())
            .unwrap_or(false)
    }
}

fn up_value_key(element: &Expr) -> Option<SymbolId> {
    element.as_symbol().or_else(|| element.base_head_symbol())
}

/// Recursively splices nested same-head compounds.
fn flatten_into(head: SymbolId, elements: Vec<Expr>) -> Vec<Expr> {
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        if element.has_head(head) {
            out.extend(flatten_into(head, element.elements()));
        } else {
            out.push(element);
        }
    }
    out
}

/// Threads a listable head over its `List` arguments, broadcasting
/// scalars. Returns `None` when the lists disagree on length.
fn thread_listable(head: &Expr, elements: &[Expr]) -> Option<Expr> {
    let mut length: Option<usize> = None;
    for element in elements {
        if element.has_head(SymbolId::LIST) {
            let len = element.len();
            match length {
                None => length = Some(len),
                Some(expected) if expected != len => return None,
                Some(_) => {}
            }
        }
    }
    let length = length?;

    let rows = (0..length).map(|i| {
        let args = elements.iter().map(|element| {
            if element.has_head(SymbolId::LIST) {
                element
                    .as_compound()
                    .and_then(|c| c.elements.get(i).cloned())
                    .expect("index within checked length")
            } else {
                element.clone()
            }
        });
        Expr::compound(head.clone(), args.collect::<Vec<_>>())
    });
    Some(Expr::list(rows.collect::<Vec<_>>()))
}
