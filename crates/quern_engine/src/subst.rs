//! Substitution of bindings into replacement templates.

use quern_foundation::{Expr, SymbolId};

use crate::pattern::Bindings;

/// Substitutes bound pattern variables into a template.
///
/// A variable bound to `Sequence[…]` splices into the surrounding argument
/// list, so a rule like `f[x__] -> g[x]` rewrites `f[1, 2]` to `g[1, 2]`.
/// Literal `Sequence` heads already present in the template are left alone;
/// whether those splice is the evaluator's decision (`SequenceHold`).
#[must_use]
pub fn substitute(template: &Expr, bindings: &Bindings) -> Expr {
    if bindings.is_empty() {
        return template.clone();
    }
    match template {
        Expr::Symbol(id) => bindings
            .get(*id)
            .cloned()
            .unwrap_or_else(|| template.clone()),
        Expr::Number(_) | Expr::String(_) => template.clone(),
        Expr::Compound(compound) => {
            let head = substitute(&compound.head, bindings);
            let mut elements = Vec::with_capacity(compound.elements.len());
            for element in &compound.elements {
                let was_variable =
                    matches!(element, Expr::Symbol(id) if bindings.get(*id).is_some());
                let substituted = substitute(element, bindings);
                if was_variable && substituted.has_head(SymbolId::SEQUENCE) {
                    elements.extend(substituted.elements());
                } else {
                    elements.push(substituted);
                }
            }
            Expr::compound(head, elements)
        }
    }
}
