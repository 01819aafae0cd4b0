//! Rule application: first matching rule in specificity order wins.

use quern_foundation::Expr;
use quern_symbols::RuleSet;

use crate::pattern::{MatchEnv, Matcher};
use crate::subst::substitute;

/// Outcome of trying a rule set against an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleOutcome {
    /// A rule matched; the substituted replacement is returned.
    Applied(Expr),
    /// No rule in the set applied. Not an error.
    NotApplied,
}

impl RuleOutcome {
    /// The replacement expression, if a rule applied.
    #[must_use]
    pub fn into_applied(self) -> Option<Expr> {
        match self {
            Self::Applied(expr) => Some(expr),
            Self::NotApplied => None,
        }
    }
}

/// Walks a rule set in dispatch order and applies the first rule whose
/// pattern matches.
///
/// The set is already sorted most-specific-first with stable insertion
/// order as the tie-break, so "first match" implements "most specific
/// wins, else first-defined wins". Guard failures surface as match
/// failures inside the matcher, so a rule whose `Condition` rejects every
/// candidate binding falls through to the next rule.
#[must_use]
pub fn apply_rules(
    rules: &RuleSet,
    expr: &Expr,
    matcher: &Matcher,
    env: &mut dyn MatchEnv,
) -> RuleOutcome {
    let arity = expr.len();
    for rule in rules.candidates(arity) {
        let solutions = matcher.matches(&rule.pattern, expr, env);
        if let Some(bindings) = solutions.first() {
            return RuleOutcome::Applied(substitute(&rule.replacement, bindings));
        }
    }
    RuleOutcome::NotApplied
}
