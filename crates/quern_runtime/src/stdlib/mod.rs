//! The reference builtin library.
//!
//! Each submodule contributes a table of builtins; [`install`] interns
//! their names, registers them in the dispatch registry, applies their
//! attributes and defaults, and finally protects every system symbol
//! against user definitions.

pub mod arithmetic;
pub mod assign;
pub mod compare;
pub mod control;
pub mod numeric;
pub mod structure;

use quern_engine::builtins::{BuiltinFn, BuiltinOutcome};
use quern_engine::evaluate::{Context, EvalScope};
use quern_foundation::{Expr, Result, SymbolId};
use quern_symbols::Attributes;

/// One builtin to install: name, evaluator, attributes of its symbol.
pub(crate) struct BuiltinSpec {
    pub name: &'static str,
    pub func: fn(&Expr, &mut EvalScope<'_>) -> Result<BuiltinOutcome>,
    pub attributes: Attributes,
}

/// Heads that carry attributes but no builtin evaluator.
const ATTRIBUTE_ONLY: &[(&str, Attributes)] = &[
    ("Hold", Attributes::HOLD_ALL),
    ("HoldComplete", Attributes::HOLD_ALL_COMPLETE),
    ("Pattern", Attributes::HOLD_FIRST),
    ("Condition", Attributes::HOLD_ALL),
    ("Rule", Attributes::SEQUENCE_HOLD),
    ("RuleDelayed", Attributes::SEQUENCE_HOLD.union(Attributes::HOLD_REST)),
];

/// Reserved symbols protected against user definitions even though they
/// carry no evaluator of their own.
const PROTECTED_RESERVED: &[SymbolId] = &[
    SymbolId::LIST,
    SymbolId::SEQUENCE,
    SymbolId::BLANK,
    SymbolId::BLANK_SEQUENCE,
    SymbolId::BLANK_NULL_SEQUENCE,
    SymbolId::PATTERN,
    SymbolId::OPTIONAL,
    SymbolId::CONDITION,
    SymbolId::ALTERNATIVES,
    SymbolId::RULE,
    SymbolId::RULE_DELAYED,
    SymbolId::HOLD,
    SymbolId::HOLD_COMPLETE,
    SymbolId::EVALUATE,
    SymbolId::TRUE,
    SymbolId::FALSE,
    SymbolId::NULL,
    SymbolId::INDETERMINATE,
    SymbolId::COMPLEX_INFINITY,
    SymbolId::INFINITY,
    SymbolId::MACHINE_PRECISION,
    SymbolId::INTEGER,
    SymbolId::RATIONAL,
    SymbolId::REAL,
    SymbolId::COMPLEX,
    SymbolId::STRING,
    SymbolId::SYMBOL,
];

/// Installs the reference stdlib into a fresh context.
///
/// # Panics
/// Panics if a stdlib attribute table is internally inconsistent; this is
/// a startup-time programming error, not a user-reachable condition.
pub fn install(ctx: &mut Context) {
    let tables = [
        arithmetic::BUILTINS,
        compare::BUILTINS,
        control::BUILTINS,
        structure::BUILTINS,
        assign::BUILTINS,
        numeric::BUILTINS,
    ];

    let mut system: Vec<SymbolId> = PROTECTED_RESERVED.to_vec();

    for spec in tables.iter().flat_map(|t| t.iter()) {
        let symbol = ctx.interner.intern(spec.name);
        ctx.builtins.register(
            symbol,
            BuiltinFn {
                name: spec.name,
                func: spec.func,
            },
        );
        ctx.symbols
            .set_attributes(symbol, spec.attributes)
            .expect("stdlib attribute sets are consistent");
        system.push(symbol);
    }

    for &(name, attributes) in ATTRIBUTE_ONLY {
        let symbol = ctx.interner.intern(name);
        ctx.symbols
            .set_attributes(symbol, attributes)
            .expect("stdlib attribute sets are consistent");
        system.push(symbol);
    }

    // Symbol defaults backing Optional patterns, set before protection.
    let plus = ctx.interner.intern("Plus");
    ctx.symbols
        .set_default_value(plus, Expr::int(0))
        .expect("Plus is not yet protected");
    let times = ctx.interner.intern("Times");
    ctx.symbols
        .set_default_value(times, Expr::int(1))
        .expect("Times is not yet protected");
    let power = ctx.interner.intern("Power");
    ctx.symbols
        .set_default_value(power, Expr::int(1))
        .expect("Power is not yet protected");

    for symbol in system {
        ctx.symbols
            .add_attributes(symbol, Attributes::PROTECTED)
            .expect("adding Protected never conflicts");
    }
}

/// Shorthand for a claimed rewrite.
pub(crate) fn rewritten(expr: Expr) -> Result<BuiltinOutcome> {
    Ok(BuiltinOutcome::Rewritten(expr))
}

/// Shorthand for declining a call.
pub(crate) fn declined() -> Result<BuiltinOutcome> {
    Ok(BuiltinOutcome::Declined)
}
