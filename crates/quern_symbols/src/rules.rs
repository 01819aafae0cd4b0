//! Rewrite rules and their specificity ordering.
//!
//! Rule lists are kept sorted by pattern specificity so that dispatch can
//! walk them front to back: the most specific matching rule wins, and rules
//! of equal specificity apply in definition order.

use quern_foundation::pattern::{PatternView, view};
use quern_foundation::Expr;

/// Where a rule is attached on its owning symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RuleSlot {
    /// Fires when the symbol is the head of the expression being evaluated.
    Down,
    /// Fires when the symbol appears as (the head of) an argument of the
    /// expression being evaluated.
    Up,
    /// Fires when the symbol is the base head of a curried expression like
    /// `f[a][b]`.
    Sub,
}

/// A single rewrite rule: pattern, replacement template, and ordering keys.
#[derive(Clone, Debug)]
pub struct RewriteRule {
    /// The pattern to match.
    pub pattern: Expr,
    /// The replacement template the bindings are substituted into.
    pub replacement: Expr,
    /// Delayed rules re-evaluate the replacement on every application;
    /// immediate rules store an already-evaluated right-hand side.
    pub delayed: bool,
    /// Specificity score; higher is more specific.
    pub specificity: u32,
    /// Fixed argument count, when the pattern admits exactly one arity.
    /// Used to skip candidates cheaply before matching.
    pub arity: Option<usize>,
    /// Insertion sequence number; the tie-break for equal specificity.
    pub seq: u64,
}

/// An ordered list of rewrite rules for one slot of one symbol.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
    next_seq: u64,
}

impl RuleSet {
    /// A shared empty rule set, for symbols with no entry.
    pub(crate) const EMPTY_REF: &'static Self = &Self {
        rules: Vec::new(),
        next_seq: 0,
    };

    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rules in dispatch order (most specific first, stable within
    /// equal specificity).
    #[must_use]
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Rules that could match an expression with the given argument count.
    pub fn candidates(&self, arity: usize) -> impl Iterator<Item = &RewriteRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.arity.is_none_or(|a| a == arity))
    }

    /// Inserts a rule, keeping the list sorted by descending specificity.
    ///
    /// A rule whose pattern is structurally identical to an existing rule's
    /// pattern replaces that rule in place, keeping its position.
    pub fn insert(&mut self, pattern: Expr, replacement: Expr, delayed: bool) {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.pattern == pattern) {
            existing.replacement = replacement;
            existing.delayed = delayed;
            return;
        }

        let rule = RewriteRule {
            specificity: specificity(&pattern),
            arity: fixed_arity(&pattern),
            seq: self.next_seq,
            pattern,
            replacement,
            delayed,
        };
        self.next_seq += 1;

        // First position whose specificity is strictly lower; equal
        // specificity keeps definition order.
        let position = self
            .rules
            .iter()
            .position(|r| r.specificity < rule.specificity)
            .unwrap_or(self.rules.len());
        self.rules.insert(position, rule);
    }

    /// Removes the rule with a structurally identical pattern.
    ///
    /// Returns true if a rule was removed.
    pub fn remove(&mut self, pattern: &Expr) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| &r.pattern != pattern);
        self.rules.len() != before
    }

    /// Removes all rules.
    pub fn clear(&mut self) {
        self.rules.clear();
    }
}

/// Computes the specificity score of a pattern.
///
/// Literal nodes score highest, head-constrained blanks above bare blanks,
/// single blanks above sequence blanks. Scores sum over the tree, so a
/// structurally richer pattern outranks a coarser one; a guard adds a
/// small bonus. The resulting order reproduces "most specific wins" with
/// insertion order as the tie-break for incomparable patterns.
#[must_use]
pub fn specificity(pattern: &Expr) -> u32 {
    match view(pattern) {
        PatternView::Blank { head } => {
            if head.is_some() {
                8
            } else {
                4
            }
        }
        PatternView::BlankSequence { head } => {
            if head.is_some() {
                3
            } else {
                2
            }
        }
        PatternView::BlankNullSequence { head } => {
            if head.is_some() {
                2
            } else {
                1
            }
        }
        PatternView::Named { pattern: sub, .. } | PatternView::Optional { pattern: sub, .. } => {
            specificity(sub)
        }
        PatternView::Guarded { pattern: sub, .. } => specificity(sub).saturating_add(1),
        PatternView::Alternatives { branches } => {
            branches.iter().map(specificity).min().unwrap_or(0)
        }
        PatternView::Literal => match pattern.as_compound() {
            None => 16,
            Some(compound) => {
                let mut score = specificity(&compound.head);
                for element in &compound.elements {
                    score = score.saturating_add(specificity(element));
                }
                score
            }
        },
    }
}

/// The fixed top-level arity of a compound pattern, if it has one.
///
/// `Pattern` and `Condition` wrappers around the whole rule pattern are
/// looked through. Patterns with sequence blanks or optionals among their
/// top-level elements can match several arities and report `None`.
#[must_use]
pub fn fixed_arity(pattern: &Expr) -> Option<usize> {
    let core = quern_foundation::pattern::pattern_core(pattern);
    let compound = core.as_compound()?;
    for element in &compound.elements {
        if !consumes_exactly_one(element) {
            return None;
        }
    }
    Some(compound.elements.len())
}

fn consumes_exactly_one(pattern: &Expr) -> bool {
    match view(pattern) {
        PatternView::Blank { .. } | PatternView::Literal => true,
        PatternView::BlankSequence { .. }
        | PatternView::BlankNullSequence { .. }
        | PatternView::Optional { .. } => false,
        PatternView::Named { pattern: sub, .. } | PatternView::Guarded { pattern: sub, .. } => {
            consumes_exactly_one(sub)
        }
        PatternView::Alternatives { branches } => branches.iter().all(consumes_exactly_one),
    }
}
