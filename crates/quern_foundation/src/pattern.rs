//! Structural views of pattern constructs.
//!
//! Patterns are ordinary expressions; the engine recognizes them by their
//! reserved head symbols at match time. [`PatternView`] is the shared
//! classification used by both the specificity scorer and the matcher, so
//! the two can never disagree about what a node means.

use crate::expr::{Expr, ExprVec};
use crate::intern::SymbolId;

/// What a pattern node means, structurally.
#[derive(Clone, Copy)]
pub enum PatternView<'a> {
    /// `Blank[]` or `Blank[head]`: matches exactly one expression.
    Blank {
        /// Required head of the matched expression, if constrained.
        head: Option<&'a Expr>,
    },
    /// `BlankSequence[]` or `BlankSequence[head]`: one or more siblings.
    BlankSequence {
        /// Required head of every matched sibling, if constrained.
        head: Option<&'a Expr>,
    },
    /// `BlankNullSequence[]` or `BlankNullSequence[head]`: zero or more
    /// siblings.
    BlankNullSequence {
        /// Required head of every matched sibling, if constrained.
        head: Option<&'a Expr>,
    },
    /// `Pattern[name, sub]`: binds `name` to whatever `sub` matches.
    Named {
        /// The pattern variable.
        name: SymbolId,
        /// The wrapped pattern.
        pattern: &'a Expr,
    },
    /// `Optional[pattern]` or `Optional[pattern, default]`: may match
    /// without consuming input, binding the default instead.
    Optional {
        /// The wrapped pattern.
        pattern: &'a Expr,
        /// The explicit default, when given.
        default: Option<&'a Expr>,
    },
    /// `Condition[pattern, test]`: solutions are filtered by the guard.
    Guarded {
        /// The wrapped pattern.
        pattern: &'a Expr,
        /// The guard expression, evaluated with bindings substituted.
        test: &'a Expr,
    },
    /// `Alternatives[p1, p2, …]`: ordered choice.
    Alternatives {
        /// The branches, tried left to right.
        branches: &'a ExprVec,
    },
    /// Anything else: matched literally (atoms by equality, compounds
    /// recursively).
    Literal,
}

/// Classifies a pattern node by its head symbol.
#[must_use]
pub fn view(pattern: &Expr) -> PatternView<'_> {
    let Some(compound) = pattern.as_compound() else {
        return PatternView::Literal;
    };
    let Some(head) = compound.head.as_symbol() else {
        return PatternView::Literal;
    };
    let elements = &compound.elements;
    match head {
        SymbolId::BLANK if elements.len() <= 1 => PatternView::Blank {
            head: elements.front(),
        },
        SymbolId::BLANK_SEQUENCE if elements.len() <= 1 => PatternView::BlankSequence {
            head: elements.front(),
        },
        SymbolId::BLANK_NULL_SEQUENCE if elements.len() <= 1 => PatternView::BlankNullSequence {
            head: elements.front(),
        },
        SymbolId::PATTERN if elements.len() == 2 => {
            match elements.front().and_then(Expr::as_symbol) {
                Some(name) => PatternView::Named {
                    name,
                    pattern: elements.get(1).expect("two elements"),
                },
                None => PatternView::Literal,
            }
        }
        SymbolId::OPTIONAL if elements.len() == 1 || elements.len() == 2 => {
            PatternView::Optional {
                pattern: elements.front().expect("at least one element"),
                default: elements.get(1),
            }
        }
        SymbolId::CONDITION if elements.len() == 2 => PatternView::Guarded {
            pattern: elements.front().expect("two elements"),
            test: elements.get(1).expect("two elements"),
        },
        SymbolId::ALTERNATIVES => PatternView::Alternatives { branches: elements },
        _ => PatternView::Literal,
    }
}

/// Strips `Pattern` and `Condition` wrappers, yielding the structural core
/// of a rule pattern. `Condition[f[x_], test]` has the core `f[x_]`.
#[must_use]
pub fn pattern_core(pattern: &Expr) -> &Expr {
    match view(pattern) {
        PatternView::Named { pattern: inner, .. } | PatternView::Guarded { pattern: inner, .. } => {
            pattern_core(inner)
        }
        _ => pattern,
    }
}
