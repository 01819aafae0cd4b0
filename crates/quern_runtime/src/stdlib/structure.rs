//! Structural builtins: inspecting and rebuilding expression trees.

use quern_engine::builtins::BuiltinOutcome;
use quern_engine::evaluate::EvalScope;
use quern_foundation::{Expr, Result};
use quern_symbols::Attributes;

use super::{BuiltinSpec, declined, rewritten};

/// Builtins contributed by this module.
pub(crate) const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "Head",
        func: head,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Length",
        func: length,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "First",
        func: first,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Rest",
        func: rest,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Apply",
        func: apply,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Map",
        func: map,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Flatten",
        func: flatten,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "Sort",
        func: sort,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "AtomQ",
        func: atom_q,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "IntegerQ",
        func: integer_q,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "NumberQ",
        func: number_q,
        attributes: Attributes::empty(),
    },
    BuiltinSpec {
        name: "OrderedQ",
        func: ordered_q,
        attributes: Attributes::empty(),
    },
];

fn one_argument(expr: &Expr) -> Option<Expr> {
    let elements = expr.elements();
    match elements.as_slice() {
        [single] => Some(single.clone()),
        _ => None,
    }
}

fn head(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    match one_argument(expr) {
        Some(argument) => rewritten(argument.head()),
        None => declined(),
    }
}

fn length(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    match one_argument(expr) {
        Some(argument) => rewritten(Expr::int(i64::try_from(argument.len()).unwrap_or(i64::MAX))),
        None => declined(),
    }
}

fn first(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let Some(argument) = one_argument(expr) else {
        return declined();
    };
    match argument.as_compound().and_then(|c| c.elements.front()) {
        Some(element) => rewritten(element.clone()),
        None => declined(),
    }
}

fn rest(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let Some(argument) = one_argument(expr) else {
        return declined();
    };
    let Some(compound) = argument.as_compound() else {
        return declined();
    };
    if compound.elements.is_empty() {
        return declined();
    }
    let elements = compound.elements.iter().skip(1).cloned();
    rewritten(Expr::compound(compound.head.clone(), elements.collect::<Vec<_>>()))
}

fn apply(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [function, target] = elements.as_slice() else {
        return declined();
    };
    match target.as_compound() {
        Some(compound) => rewritten(Expr::compound(
            function.clone(),
            compound.elements.iter().cloned().collect::<Vec<_>>(),
        )),
        None => declined(),
    }
}

fn map(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let elements = expr.elements();
    let [function, target] = elements.as_slice() else {
        return declined();
    };
    match target.as_compound() {
        Some(compound) => {
            let mapped = compound
                .elements
                .iter()
                .map(|element| Expr::compound(function.clone(), [element.clone()]));
            rewritten(Expr::compound(
                compound.head.clone(),
                mapped.collect::<Vec<_>>(),
            ))
        }
        // Atoms have no parts to map over.
        None => rewritten(target.clone()),
    }
}

fn flatten(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let Some(argument) = one_argument(expr) else {
        return declined();
    };
    let Some(head_symbol) = argument.head_symbol() else {
        return declined();
    };
    let Some(compound) = argument.as_compound() else {
        return declined();
    };

    fn splice(head: quern_foundation::SymbolId, elements: &[Expr], out: &mut Vec<Expr>) {
        for element in elements {
            if element.has_head(head) {
                splice(head, &element.elements(), out);
            } else {
                out.push(element.clone());
            }
        }
    }

    let mut flattened = Vec::with_capacity(compound.elements.len());
    splice(
        head_symbol,
        &compound.elements.iter().cloned().collect::<Vec<_>>(),
        &mut flattened,
    );
    rewritten(Expr::compound(compound.head.clone(), flattened))
}

fn sort(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let Some(argument) = one_argument(expr) else {
        return declined();
    };
    match argument.as_compound() {
        Some(compound) => {
            let mut elements: Vec<Expr> = compound.elements.iter().cloned().collect();
            elements.sort_by(Expr::canonical_cmp);
            rewritten(Expr::compound(compound.head.clone(), elements))
        }
        None => declined(),
    }
}

fn atom_q(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    match one_argument(expr) {
        Some(argument) => rewritten(Expr::boolean(argument.is_atom())),
        None => declined(),
    }
}

fn integer_q(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    match one_argument(expr) {
        Some(argument) => rewritten(Expr::boolean(matches!(
            argument.as_number(),
            Some(quern_foundation::Number::Int(_))
        ))),
        None => declined(),
    }
}

fn number_q(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    match one_argument(expr) {
        Some(argument) => rewritten(Expr::boolean(argument.as_number().is_some())),
        None => declined(),
    }
}

fn ordered_q(expr: &Expr, _scope: &mut EvalScope<'_>) -> Result<BuiltinOutcome> {
    let Some(argument) = one_argument(expr) else {
        return declined();
    };
    match argument.as_compound() {
        Some(compound) => {
            let elements: Vec<&Expr> = compound.elements.iter().collect();
            let ordered = elements
                .windows(2)
                .all(|pair| pair[0].canonical_cmp(pair[1]) != std::cmp::Ordering::Greater);
            rewritten(Expr::boolean(ordered))
        }
        None => rewritten(Expr::truth()),
    }
}
