//! Assignment builtins: the sanctioned mutation path into the symbol
//! table.
//!
//! The evaluator itself never writes the table; these builtins do, and a
//! rejected definition (protected symbol, malformed pattern) becomes a
//! `DefinitionRejected` diagnostic plus `$Failed`, leaving existing rules
//! untouched.

use quern_engine::builtins::BuiltinOutcome;
use quern_engine::diagnostics::Diagnostic;
use quern_engine::evaluate::EvalScope;
use quern_foundation::{Error, Expr, Result, SymbolId};
use quern_symbols::{Attributes, RuleSlot};

use super::{BuiltinSpec, declined, rewritten};

/// Builtins contributed by this module.
pub(crate) const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "Set",
        func: set,
        attributes: Attributes::HOLD_FIRST.union(Attributes::SEQUENCE_HOLD),
    },
    BuiltinSpec {
        name: "SetDelayed",
        func: set_delayed,
        attributes: Attributes::HOLD_ALL.union(Attributes::SEQUENCE_HOLD),
    },
    BuiltinSpec {
        name: "UpSet",
        func: up_set,
        attributes: Attributes::HOLD_FIRST.union(Attributes::SEQUENCE_HOLD),
    },
    BuiltinSpec {
        name: "UpSetDelayed",
        func: up_set_delayed,
        attributes: Attributes::HOLD_ALL.union(Attributes::SEQUENCE_HOLD),
    },
    BuiltinSpec {
        name: "TagSet",
        func: tag_set,
        attributes: Attributes::HOLD_ALL.union(Attributes::SEQUENCE_HOLD),
    },
    BuiltinSpec {
        name: "Unset",
        func: unset,
        attributes: Attributes::HOLD_FIRST,
    },
    BuiltinSpec {
        name: "Clear",
        func: clear,
        attributes: Attributes::HOLD_ALL,
    },
    BuiltinSpec {
        name: "ClearAll",
        func: clear_all,
        attributes: Attributes::HOLD_ALL,
    },
    BuiltinSpec {
        name: "SetAttributes",
        func: set_attributes,
        attributes: Attributes::HOLD_FIRST,
    },
    BuiltinSpec {
        name: "ClearAttributes",
        func: clear_attributes,
        attributes: Attributes::HOLD_FIRST,
    },
    BuiltinSpec {
        name: "Attributes",
        func: attributes,
        attributes: Attributes::HOLD_ALL,
    },
    BuiltinSpec {
        name: "Default",
        func: default,
        attributes: Attributes::empty(),
    },
];

/// Reports a rejected definition and substitutes `$Failed`.
fn rejected(scope: &mut EvalScope<'_>, symbol: Option<SymbolId>, error: &Error) -> Expr {
    scope.emit(Diagnostic::DefinitionRejected {
        symbol,
        reason: error.to_string(),
    });
    Expr::symbol(SymbolId::FAILED)
}

/// The symbol a definition attaches to, given its left-hand side.
/// `Pattern` and `Condition` wrappers around the whole pattern are
/// transparent.
fn assignment_target(lhs: &Expr) -> Option<SymbolId> {
    let core = quern_foundation::pattern::pattern_core(lhs);
    match core {
        Expr::Symbol(id) => Some(*id),
        Expr::Compound(_) => core.base_head_symbol(),
        _ => None,
    }
}

/// Installs a definition for `lhs`, choosing own-, down-, or sub-values by
/// the shape of its pattern core (guards around the whole pattern do not
/// change where the rule attaches). `Default[f] = value` routes to the
/// symbol's default value.
fn define(
    scope: &mut EvalScope<'_>,
    lhs: &Expr,
    rhs: Expr,
    delayed: bool,
) -> quern_foundation::Result<()> {
    if let Expr::Symbol(id) = lhs {
        return scope.symbols().set_own_value(*id, rhs, delayed);
    }
    let core = quern_foundation::pattern::pattern_core(lhs);
    match core {
        Expr::Compound(compound) => {
            let default_head = scope.interner().intern("Default");
            if compound.head.as_symbol() == Some(default_head) {
                if let [Expr::Symbol(target)] = core.elements().as_slice() {
                    return scope.symbols().set_default_value(*target, rhs);
                }
                return Err(Error::malformed_rule(
                    "Default assignment needs a single symbol argument",
                ));
            }
            match compound.head.as_symbol() {
                Some(head) => scope
                    .symbols()
                    .define_rule(head, RuleSlot::Down, lhs.clone(), rhs, delayed),
                None => match core.base_head_symbol() {
                    Some(base) => scope
                        .symbols()
                        .define_rule(base, RuleSlot::Sub, lhs.clone(), rhs, delayed),
                    None => Err(Error::malformed_rule(
                        "left-hand side has no symbol to attach the rule to",
                    )),
                },
            }
        }
        _ => Err(Error::malformed_rule("cannot assign to an atom")),
    }
}

fn set(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [lhs, rhs] = elements.as_slice() else {
        return declined();
    };
    match define(scope, lhs, rhs.clone(), false) {
        Ok(()) => rewritten(rhs.clone()),
        Err(error) => rewritten(rejected(scope, assignment_target(lhs), &error)),
    }
}

fn set_delayed(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [lhs, rhs] = elements.as_slice() else {
        return declined();
    };
    match define(scope, lhs, rhs.clone(), true) {
        Ok(()) => rewritten(Expr::symbol(SymbolId::NULL)),
        Err(error) => rewritten(rejected(scope, assignment_target(lhs), &error)),
    }
}

/// Symbols an up-value definition attaches to: each argument itself, or
/// its base head for compound arguments.
fn up_value_targets(lhs: &Expr) -> Vec<SymbolId> {
    let lhs = quern_foundation::pattern::pattern_core(lhs);
    let mut targets = Vec::new();
    for element in lhs.elements() {
        let key = element
            .as_symbol()
            .or_else(|| element.base_head_symbol());
        if let Some(key) = key {
            if !targets.contains(&key) {
                targets.push(key);
            }
        }
    }
    targets
}

fn up_set_common(
    scope: &mut EvalScope<'_>,
    lhs: &Expr,
    rhs: &Expr,
    delayed: bool,
) -> Expr {
    if quern_foundation::pattern::pattern_core(lhs).as_compound().is_none() {
        let error = Error::malformed_rule("up-value needs a compound left-hand side");
        return rejected(scope, None, &error);
    }

    let mut defined = 0usize;
    let mut last_error = None;
    for target in up_value_targets(lhs) {
        match scope
            .symbols()
            .define_rule(target, RuleSlot::Up, lhs.clone(), rhs.clone(), delayed)
        {
            Ok(()) => defined += 1,
            Err(error) => last_error = Some((target, error)),
        }
    }

    if defined == 0 {
        let (target, error) = last_error.unwrap_or_else(|| {
            (
                SymbolId::FAILED,
                Error::malformed_rule("no argument can carry the up-value"),
            )
        });
        return rejected(scope, Some(target), &error);
    }
    if delayed {
        Expr::symbol(SymbolId::NULL)
    } else {
        rhs.clone()
    }
}

fn up_set(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [lhs, rhs] = elements.as_slice() else {
        return declined();
    };
    rewritten(up_set_common(scope, lhs, rhs, false))
}

fn up_set_delayed(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [lhs, rhs] = elements.as_slice() else {
        return declined();
    };
    rewritten(up_set_common(scope, lhs, rhs, true))
}

fn tag_set(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [tag, lhs, rhs] = elements.as_slice() else {
        return declined();
    };
    let Some(tag) = tag.as_symbol() else {
        return declined();
    };
    // TagSet is immediate: the held right-hand side is evaluated now.
    let rhs = scope.evaluate(rhs)?;

    let core = quern_foundation::pattern::pattern_core(lhs);
    let slot = if core.head_symbol() == Some(tag) {
        RuleSlot::Down
    } else if core.base_head_symbol() == Some(tag) {
        RuleSlot::Sub
    } else {
        RuleSlot::Up
    };
    match scope
        .symbols()
        .define_rule(tag, slot, lhs.clone(), rhs.clone(), false)
    {
        Ok(()) => rewritten(rhs),
        Err(error) => rewritten(rejected(scope, Some(tag), &error)),
    }
}

fn unset(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [lhs] = elements.as_slice() else {
        return declined();
    };
    let removed = match lhs {
        Expr::Symbol(id) => scope.symbols().clear_own_value(*id),
        Expr::Compound(_) => {
            let core = quern_foundation::pattern::pattern_core(lhs);
            match core.as_compound().and_then(|c| c.head.as_symbol()) {
                Some(head) => scope.symbols().remove_rule(head, RuleSlot::Down, lhs),
                None => core
                    .base_head_symbol()
                    .is_some_and(|base| scope.symbols().remove_rule(base, RuleSlot::Sub, lhs)),
            }
        }
        _ => false,
    };
    if removed {
        rewritten(Expr::symbol(SymbolId::NULL))
    } else {
        rewritten(Expr::symbol(SymbolId::FAILED))
    }
}

fn clear_common(
    expr: &Expr,
    scope: &mut EvalScope<'_>,
    clear: fn(&mut quern_symbols::SymbolTable, SymbolId),
) -> Result<BuiltinOutcome> {
    for element in expr.elements() {
        let Some(symbol) = element.as_symbol() else {
            return declined();
        };
        if scope.symbols_ref().is_protected(symbol) {
            let error = Error::protected_symbol(symbol);
            let failed = rejected(scope, Some(symbol), &error);
            return rewritten(failed);
        }
        clear(scope.symbols(), symbol);
    }
    rewritten(Expr::symbol(SymbolId::NULL))
}

fn clear(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    clear_common(expr, scope, quern_symbols::SymbolTable::clear)
}

fn clear_all(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    clear_common(expr, scope, quern_symbols::SymbolTable::clear_all)
}

/// Resolves an attribute specification: one attribute symbol or a list.
fn attribute_set(scope: &mut EvalScope<'_>, spec: &Expr) -> Option<Attributes> {
    let names: Vec<Expr> = if spec.has_head(SymbolId::LIST) {
        spec.elements()
    } else {
        vec![spec.clone()]
    };
    let mut attrs = Attributes::empty();
    for name in names {
        let symbol = name.as_symbol()?;
        let text = scope.interner().name(symbol)?.to_owned();
        attrs = attrs.union(Attributes::from_name(&text)?);
    }
    Some(attrs)
}

fn set_attributes(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [target, spec] = elements.as_slice() else {
        return declined();
    };
    let Some(symbol) = target.as_symbol() else {
        return declined();
    };
    let Some(attrs) = attribute_set(scope, spec) else {
        return declined();
    };
    match scope.symbols().add_attributes(symbol, attrs) {
        Ok(()) => rewritten(Expr::symbol(SymbolId::NULL)),
        Err(error) => rewritten(rejected(scope, Some(symbol), &error)),
    }
}

fn clear_attributes(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [target, spec] = elements.as_slice() else {
        return declined();
    };
    let Some(symbol) = target.as_symbol() else {
        return declined();
    };
    let Some(attrs) = attribute_set(scope, spec) else {
        return declined();
    };
    scope.symbols().remove_attributes(symbol, attrs);
    rewritten(Expr::symbol(SymbolId::NULL))
}

fn attributes(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [target] = elements.as_slice() else {
        return declined();
    };
    let Some(symbol) = target.as_symbol() else {
        return declined();
    };
    let attrs = scope.symbols_ref().attributes(symbol);
    let mut names = Vec::new();
    for &(name, flag) in Attributes::NAMES {
        if attrs.contains(flag) {
            names.push(Expr::symbol(scope.interner().intern(name)));
        }
    }
    rewritten(Expr::list(names))
}

fn default(expr: &Expr, scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [target] = elements.as_slice() else {
        return declined();
    };
    let Some(symbol) = target.as_symbol() else {
        return declined();
    };
    match scope.symbols_ref().default_value(symbol) {
        Some(value) => rewritten(value.clone()),
        None => declined(),
    }
}
