//! The pattern matcher/unifier.
//!
//! Matches a pattern expression against an evaluated subject, producing
//! every binding set in a deterministic order. Failure is not an error; it
//! is the empty solution list. Sequence blanks enumerate run lengths
//! shortest first, `Alternatives` commits to the first branch that yields
//! any solution, and subjects with `Orderless` or `Flat` heads are matched
//! up to argument order and associativity.

use std::collections::HashMap;

use quern_foundation::pattern::{PatternView, view};
use quern_foundation::{Expr, SymbolId};
use quern_symbols::{Attributes, SymbolTable};

use crate::subst::substitute;

/// What the matcher needs from its surroundings: attribute lookup for
/// `Orderless`/`Flat` handling, symbol defaults for `Optional`, and a way
/// to evaluate `Condition` guards.
pub trait MatchEnv {
    /// The attribute set of a symbol.
    fn attributes(&self, symbol: SymbolId) -> Attributes;

    /// The default value backing `Optional` patterns without an explicit
    /// default, keyed by the surrounding head symbol.
    fn default_value(&self, symbol: SymbolId) -> Option<Expr>;

    /// Evaluates a guard expression (with bindings already substituted)
    /// and reports whether it yielded `True`.
    fn eval_condition(&mut self, test: &Expr) -> bool;
}

/// A [`MatchEnv`] over a bare symbol table, with no evaluator attached.
///
/// Guards are satisfied only by the literal symbol `True`. Used by tests
/// and by callers that match purely structural patterns.
pub struct TableEnv<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> TableEnv<'a> {
    /// Creates an environment reading the given table.
    #[must_use]
    pub const fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }
}

impl MatchEnv for TableEnv<'_> {
    fn attributes(&self, symbol: SymbolId) -> Attributes {
        self.symbols.attributes(symbol)
    }

    fn default_value(&self, symbol: SymbolId) -> Option<Expr> {
        self.symbols.default_value(symbol).cloned()
    }

    fn eval_condition(&mut self, test: &Expr) -> bool {
        *test == Expr::truth()
    }
}

/// A set of pattern-variable bindings.
///
/// Rebinding a variable requires structural equality with the existing
/// value; the repeated-variable consistency constraint lives here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    values: HashMap<SymbolId, Expr>,
}

impl Bindings {
    /// Creates an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a binding by variable.
    #[must_use]
    pub fn get(&self, name: SymbolId) -> Option<&Expr> {
        self.values.get(&name)
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates all bindings.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Expr)> {
        self.values.iter().map(|(&k, v)| (k, v))
    }

    /// Extends this binding set with `name -> value`.
    ///
    /// Returns `None` if `name` is already bound to a structurally
    /// different value (the consistency check).
    #[must_use]
    pub fn bound(&self, name: SymbolId, value: Expr) -> Option<Self> {
        if let Some(existing) = self.values.get(&name) {
            return (*existing == value).then(|| self.clone());
        }
        let mut extended = self.clone();
        extended.values.insert(name, value);
        Some(extended)
    }
}

/// Flattening context when matching under a `Flat` head: a single blank
/// may capture a run of siblings rewrapped in the head.
struct FlatHead {
    head: Expr,
}

/// The pattern matcher.
///
/// Stateless apart from its depth limit; one instance can serve any number
/// of match calls.
pub struct Matcher {
    depth_limit: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    /// Default bound on matcher recursion depth.
    pub const DEFAULT_DEPTH_LIMIT: usize = 512;

    /// Creates a matcher with the default depth limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            depth_limit: Self::DEFAULT_DEPTH_LIMIT,
        }
    }

    /// Creates a matcher with an explicit depth limit.
    #[must_use]
    pub fn with_depth_limit(depth_limit: usize) -> Self {
        Self { depth_limit }
    }

    /// Matches `pattern` against `subject`, returning every binding set.
    ///
    /// The subject is assumed to be in evaluated form. An empty result
    /// means the rule does not apply; it is never an error.
    #[must_use]
    pub fn matches(
        &self,
        pattern: &Expr,
        subject: &Expr,
        env: &mut dyn MatchEnv,
    ) -> Vec<Bindings> {
        self.match_expr(pattern, subject, &Bindings::new(), env, 0)
    }

    fn match_expr(
        &self,
        pattern: &Expr,
        subject: &Expr,
        bindings: &Bindings,
        env: &mut dyn MatchEnv,
        depth: usize,
    ) -> Vec<Bindings> {
        if depth > self.depth_limit {
            return Vec::new();
        }
        match view(pattern) {
            PatternView::Named { name, pattern: inner } => self
                .match_expr(inner, subject, bindings, env, depth + 1)
                .into_iter()
                .filter_map(|sol| sol.bound(name, subject.clone()))
                .collect(),
            // In single-expression position, sequence blanks behave like
            // blanks: they match the one expression at hand.
            PatternView::Blank { head }
            | PatternView::BlankSequence { head }
            | PatternView::BlankNullSequence { head } => {
                if head_matches(subject, head) {
                    vec![bindings.clone()]
                } else {
                    Vec::new()
                }
            }
            // The position is occupied, so the default is irrelevant.
            PatternView::Optional { pattern: inner, .. } => {
                self.match_expr(inner, subject, bindings, env, depth + 1)
            }
            PatternView::Guarded { pattern: inner, test } => self
                .filter_guard(
                    self.match_expr(inner, subject, bindings, env, depth + 1),
                    test,
                    env,
                ),
            PatternView::Alternatives { branches } => {
                for branch in branches {
                    let solutions = self.match_expr(branch, subject, bindings, env, depth + 1);
                    if !solutions.is_empty() {
                        return solutions;
                    }
                }
                Vec::new()
            }
            PatternView::Literal => {
                if pattern.is_atom() {
                    return if pattern == subject {
                        vec![bindings.clone()]
                    } else {
                        Vec::new()
                    };
                }
                self.match_compound(pattern, subject, bindings, env, depth)
            }
        }
    }

    fn match_compound(
        &self,
        pattern: &Expr,
        subject: &Expr,
        bindings: &Bindings,
        env: &mut dyn MatchEnv,
        depth: usize,
    ) -> Vec<Bindings> {
        let pat = pattern.as_compound().expect("literal compound pattern");
        let Some(sub) = subject.as_compound() else {
            return Vec::new();
        };

        let head_solutions = self.match_expr(&pat.head, &sub.head, bindings, env, depth + 1);
        if head_solutions.is_empty() {
            return Vec::new();
        }

        let head_symbol = sub.head.as_symbol();
        let attrs = head_symbol.map_or_else(Attributes::empty, |s| env.attributes(s));

        // Under a Flat head both sides are viewed through the implicit
        // associativity: nested same-head compounds become one argument run.
        let (pat_elements, sub_elements): (Vec<Expr>, Vec<Expr>) =
            if attrs.contains(Attributes::FLAT) {
                (
                    flattened_elements(head_symbol, &pat.elements.iter().cloned().collect::<Vec<_>>()),
                    flattened_elements(head_symbol, &sub.elements.iter().cloned().collect::<Vec<_>>()),
                )
            } else {
                (
                    pat.elements.iter().cloned().collect(),
                    sub.elements.iter().cloned().collect(),
                )
            };

        let flat = attrs
            .contains(Attributes::FLAT)
            .then(|| FlatHead {
                head: sub.head.clone(),
            });

        let mut out = Vec::new();
        for head_sol in head_solutions {
            if attrs.contains(Attributes::ORDERLESS) {
                out.extend(self.match_orderless(
                    &pat_elements,
                    &sub_elements,
                    &head_sol,
                    env,
                    depth,
                    flat.as_ref(),
                    head_symbol,
                ));
            } else {
                out.extend(self.match_sequence(
                    &pat_elements,
                    &sub_elements,
                    &head_sol,
                    env,
                    depth,
                    flat.as_ref(),
                    head_symbol,
                ));
            }
        }
        out
    }

    /// Matches an ordered pattern list against an ordered subject run.
    /// Sequence blanks enumerate run lengths shortest first and backtrack
    /// on downstream failure.
    #[allow(clippy::too_many_arguments)]
    fn match_sequence(
        &self,
        patterns: &[Expr],
        subjects: &[Expr],
        bindings: &Bindings,
        env: &mut dyn MatchEnv,
        depth: usize,
        flat: Option<&FlatHead>,
        owner: Option<SymbolId>,
    ) -> Vec<Bindings> {
        if depth > self.depth_limit {
            return Vec::new();
        }
        let Some((first, rest)) = patterns.split_first() else {
            return if subjects.is_empty() {
                vec![bindings.clone()]
            } else {
                Vec::new()
            };
        };

        let (min_take, max_take) = consume_range(first, flat.is_some());
        let rest_min: usize = rest.iter().map(|p| consume_range(p, flat.is_some()).0).sum();
        let available = subjects.len().saturating_sub(rest_min);
        if min_take > available {
            return Vec::new();
        }

        let mut out = Vec::new();
        for take in min_take..=max_take.min(available) {
            let (run, remaining) = subjects.split_at(take);
            for sol in self.match_run(first, run, bindings, env, depth, flat, owner) {
                out.extend(self.match_sequence(rest, remaining, &sol, env, depth, flat, owner));
            }
        }
        out
    }

    /// Matches one pattern against a run of `k` sibling subjects.
    #[allow(clippy::too_many_arguments)]
    fn match_run(
        &self,
        pattern: &Expr,
        run: &[Expr],
        bindings: &Bindings,
        env: &mut dyn MatchEnv,
        depth: usize,
        flat: Option<&FlatHead>,
        owner: Option<SymbolId>,
    ) -> Vec<Bindings> {
        if depth > self.depth_limit {
            return Vec::new();
        }
        match view(pattern) {
            PatternView::Named { name, pattern: inner } => {
                let value = run_value(inner, run, flat);
                self.match_run(inner, run, bindings, env, depth + 1, flat, owner)
                    .into_iter()
                    .filter_map(|sol| sol.bound(name, value.clone()))
                    .collect()
            }
            PatternView::Guarded { pattern: inner, test } => self.filter_guard(
                self.match_run(inner, run, bindings, env, depth + 1, flat, owner),
                test,
                env,
            ),
            PatternView::Optional { pattern: inner, default } => {
                if run.len() == 1 {
                    return self.match_run(inner, run, bindings, env, depth + 1, flat, owner);
                }
                // Absent position: bind against the explicit default or the
                // owning symbol's default value.
                let fallback = default
                    .cloned()
                    .or_else(|| owner.and_then(|s| env.default_value(s)));
                match fallback {
                    Some(value) => self.match_expr(inner, &value, bindings, env, depth + 1),
                    None => Vec::new(),
                }
            }
            PatternView::BlankSequence { head } => {
                if !run.is_empty() && run.iter().all(|s| head_matches(s, head)) {
                    vec![bindings.clone()]
                } else {
                    Vec::new()
                }
            }
            PatternView::BlankNullSequence { head } => {
                if run.iter().all(|s| head_matches(s, head)) {
                    vec![bindings.clone()]
                } else {
                    Vec::new()
                }
            }
            PatternView::Blank { head } => match run {
                [single] => {
                    if head_matches(single, head) {
                        vec![bindings.clone()]
                    } else {
                        Vec::new()
                    }
                }
                _ => {
                    // A run longer than one is only reachable under a Flat
                    // head; the captured value is rewrapped in that head,
                    // so a head constraint must name it.
                    let Some(flat) = flat else {
                        return Vec::new();
                    };
                    if head.is_none_or(|h| *h == flat.head) {
                        vec![bindings.clone()]
                    } else {
                        Vec::new()
                    }
                }
            },
            PatternView::Alternatives { branches } => {
                for branch in branches {
                    let solutions =
                        self.match_run(branch, run, bindings, env, depth + 1, flat, owner);
                    if !solutions.is_empty() {
                        return solutions;
                    }
                }
                Vec::new()
            }
            PatternView::Literal => match run {
                [single] => self.match_expr(pattern, single, bindings, env, depth + 1),
                _ => Vec::new(),
            },
        }
    }

    /// Matches under an `Orderless` head: single-consumer patterns choose
    /// subject elements in canonical (index) order with backtracking;
    /// sequence patterns then share whatever is left, in order. The first
    /// assignment yielding solutions wins.
    #[allow(clippy::too_many_arguments)]
    fn match_orderless(
        &self,
        patterns: &[Expr],
        subjects: &[Expr],
        bindings: &Bindings,
        env: &mut dyn MatchEnv,
        depth: usize,
        flat: Option<&FlatHead>,
        owner: Option<SymbolId>,
    ) -> Vec<Bindings> {
        let (singles, tails): (Vec<&Expr>, Vec<&Expr>) = patterns
            .iter()
            .partition(|p| is_single_consumer(p));
        if singles.len() > subjects.len() {
            return Vec::new();
        }
        let mut used = vec![false; subjects.len()];
        self.assign_orderless(&singles, &tails, subjects, &mut used, bindings, env, depth, flat, owner)
    }

    #[allow(clippy::too_many_arguments)]
    fn assign_orderless(
        &self,
        singles: &[&Expr],
        tails: &[&Expr],
        subjects: &[Expr],
        used: &mut [bool],
        bindings: &Bindings,
        env: &mut dyn MatchEnv,
        depth: usize,
        flat: Option<&FlatHead>,
        owner: Option<SymbolId>,
    ) -> Vec<Bindings> {
        if depth > self.depth_limit {
            return Vec::new();
        }
        let Some((first, rest)) = singles.split_first() else {
            let leftover: Vec<Expr> = subjects
                .iter()
                .zip(used.iter())
                .filter(|&(_, &taken)| !taken)
                .map(|(s, _)| s.clone())
                .collect();
            let tail_patterns: Vec<Expr> = tails.iter().map(|p| (*p).clone()).collect();
            return self.match_sequence(
                &tail_patterns,
                &leftover,
                bindings,
                env,
                depth,
                flat,
                owner,
            );
        };

        for index in 0..subjects.len() {
            if used[index] {
                continue;
            }
            used[index] = true;
            let element = [subjects[index].clone()];
            for sol in self.match_run(first, &element, bindings, env, depth + 1, flat, owner) {
                let result = self.assign_orderless(
                    rest, tails, subjects, used, &sol, env, depth, flat, owner,
                );
                if !result.is_empty() {
                    used[index] = false;
                    return result;
                }
            }
            used[index] = false;
        }
        Vec::new()
    }

    fn filter_guard(
        &self,
        solutions: Vec<Bindings>,
        test: &Expr,
        env: &mut dyn MatchEnv,
    ) -> Vec<Bindings> {
        solutions
            .into_iter()
            .filter(|sol| {
                let substituted = substitute(test, sol);
                env.eval_condition(&substituted)
            })
            .collect()
    }
}

fn head_matches(subject: &Expr, head: Option<&Expr>) -> bool {
    head.is_none_or(|h| subject.head() == *h)
}

/// How many siblings a pattern can consume: `(min, max)`.
fn consume_range(pattern: &Expr, under_flat: bool) -> (usize, usize) {
    match view(pattern) {
        PatternView::Blank { .. } => {
            if under_flat {
                (1, usize::MAX)
            } else {
                (1, 1)
            }
        }
        PatternView::BlankSequence { .. } => (1, usize::MAX),
        PatternView::BlankNullSequence { .. } => (0, usize::MAX),
        PatternView::Optional { .. } => (0, 1),
        PatternView::Named { pattern: inner, .. } | PatternView::Guarded { pattern: inner, .. } => {
            consume_range(inner, under_flat)
        }
        PatternView::Alternatives { branches } => branches.iter().fold(
            (usize::MAX, 0),
            |(min_acc, max_acc), branch| {
                let (min, max) = consume_range(branch, under_flat);
                (min_acc.min(min), max_acc.max(max))
            },
        ),
        PatternView::Literal => (1, 1),
    }
}

/// Returns true when a pattern consumes exactly one sibling regardless of
/// context; such patterns take part in the orderless assignment search.
fn is_single_consumer(pattern: &Expr) -> bool {
    match view(pattern) {
        PatternView::Blank { .. } | PatternView::Literal => true,
        PatternView::Named { pattern: inner, .. } | PatternView::Guarded { pattern: inner, .. } => {
            is_single_consumer(inner)
        }
        PatternView::Alternatives { branches } => branches.iter().all(is_single_consumer),
        PatternView::BlankSequence { .. }
        | PatternView::BlankNullSequence { .. }
        | PatternView::Optional { .. } => false,
    }
}

/// The value a named pattern binds for a matched run.
fn run_value(inner: &Expr, run: &[Expr], flat: Option<&FlatHead>) -> Expr {
    let core = quern_foundation::pattern::pattern_core(inner);
    match view(core) {
        // Sequence blanks always bind a Sequence, even for a single
        // element, so repeated-variable checks compare like with like.
        PatternView::BlankSequence { .. } | PatternView::BlankNullSequence { .. } => {
            Expr::sequence(run.iter().cloned())
        }
        _ => match run {
            [single] => single.clone(),
            _ => match flat {
                Some(flat) => Expr::compound(flat.head.clone(), run.iter().cloned()),
                None => Expr::sequence(run.iter().cloned()),
            },
        },
    }
}

/// Splices nested same-head compounds one level at a time until none
/// remain, the implicit associativity view of a `Flat` subject.
fn flattened_elements(head: Option<SymbolId>, elements: &[Expr]) -> Vec<Expr> {
    let Some(head) = head else {
        return elements.to_vec();
    };
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        if element.has_head(head) {
            let nested = element.elements();
            out.extend(flattened_elements(Some(head), &nested));
        } else {
            out.push(element.clone());
        }
    }
    out
}
