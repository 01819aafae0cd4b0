//! Pattern matcher behavior: blanks, sequences, guards, and attribute
//! aware matching.

use quern_engine::pattern::{Bindings, Matcher, TableEnv};
use quern_foundation::{Expr, Interner, SymbolId};
use quern_symbols::{Attributes, SymbolTable};

struct Fixture {
    interner: Interner,
    symbols: SymbolTable,
}

impl Fixture {
    fn new() -> Self {
        Self {
            interner: Interner::new(),
            symbols: SymbolTable::new(),
        }
    }

    fn sym(&mut self, name: &str) -> SymbolId {
        self.interner.intern(name)
    }

    fn matches(&self, pattern: &Expr, subject: &Expr) -> Vec<Bindings> {
        let mut env = TableEnv::new(&self.symbols);
        Matcher::new().matches(pattern, subject, &mut env)
    }
}

fn blank() -> Expr {
    Expr::normal(SymbolId::BLANK, [])
}

fn blank_seq() -> Expr {
    Expr::normal(SymbolId::BLANK_SEQUENCE, [])
}

fn named(name: SymbolId, inner: Expr) -> Expr {
    Expr::normal(SymbolId::PATTERN, [Expr::symbol(name), inner])
}

#[test]
fn sequence_blank_binds_run_and_single_binds_last() {
    // f[x__, y_] against f[1, 2, 3] must bind x -> Sequence[1, 2] and
    // y -> 3.
    let mut fx = Fixture::new();
    let f = fx.sym("f");
    let x = fx.sym("x");
    let y = fx.sym("y");

    let pattern = Expr::normal(f, [named(x, blank_seq()), named(y, blank())]);
    let subject = Expr::normal(f, [Expr::int(1), Expr::int(2), Expr::int(3)]);

    let solutions = fx.matches(&pattern, &subject);
    assert!(!solutions.is_empty());
    assert_eq!(
        solutions[0].get(x),
        Some(&Expr::sequence([Expr::int(1), Expr::int(2)]))
    );
    assert_eq!(solutions[0].get(y), Some(&Expr::int(3)));
}

#[test]
fn repeated_variables_must_agree() {
    let mut fx = Fixture::new();
    let f = fx.sym("f");
    let x = fx.sym("x");
    let pattern = Expr::normal(f, [named(x, blank()), named(x, blank())]);

    assert_eq!(
        fx.matches(&pattern, &Expr::normal(f, [Expr::int(2), Expr::int(2)]))
            .len(),
        1
    );
    assert!(
        fx.matches(&pattern, &Expr::normal(f, [Expr::int(2), Expr::int(3)]))
            .is_empty()
    );
}

#[test]
fn repeated_sequence_variables_compare_whole_runs() {
    let mut fx = Fixture::new();
    let f = fx.sym("f");
    let x = fx.sym("x");
    let pattern = Expr::normal(f, [named(x, blank_seq()), named(x, blank_seq())]);

    // f[1, 2, 1, 2]: x -> Sequence[1, 2] twice.
    let subject = Expr::normal(
        f,
        [Expr::int(1), Expr::int(2), Expr::int(1), Expr::int(2)],
    );
    let solutions = fx.matches(&pattern, &subject);
    assert_eq!(solutions.len(), 1);
    assert_eq!(
        solutions[0].get(x),
        Some(&Expr::sequence([Expr::int(1), Expr::int(2)]))
    );

    // f[1, 2, 3]: no split gives two equal runs.
    let subject = Expr::normal(f, [Expr::int(1), Expr::int(2), Expr::int(3)]);
    assert!(fx.matches(&pattern, &subject).is_empty());
}

#[test]
fn typed_blanks_filter_by_head() {
    let mut fx = Fixture::new();
    let f = fx.sym("f");
    let x = fx.sym("x");
    let pattern = Expr::normal(
        f,
        [named(
            x,
            Expr::normal(SymbolId::BLANK, [Expr::symbol(SymbolId::INTEGER)]),
        )],
    );

    assert_eq!(fx.matches(&pattern, &Expr::normal(f, [Expr::int(5)])).len(), 1);
    assert!(
        fx.matches(&pattern, &Expr::normal(f, [Expr::string("five")]))
            .is_empty()
    );
}

#[test]
fn orderless_subject_matches_up_to_permutation() {
    let mut fx = Fixture::new();
    let f = fx.sym("f");
    fx.symbols.add_attributes(f, Attributes::ORDERLESS).unwrap();
    let x = fx.sym("x");

    // f[x_, "tag"] matches whichever position holds the string.
    let pattern = Expr::normal(f, [named(x, blank()), Expr::string("tag")]);
    let subject = Expr::normal(f, [Expr::string("tag"), Expr::int(4)]);

    let solutions = fx.matches(&pattern, &subject);
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0].get(x), Some(&Expr::int(4)));
}

#[test]
fn flat_subject_matches_associatively() {
    let mut fx = Fixture::new();
    let f = fx.sym("f");
    fx.symbols.add_attributes(f, Attributes::FLAT).unwrap();
    let a = fx.sym("a");
    let b = fx.sym("b");
    let c = fx.sym("c");

    let pattern = Expr::normal(f, [Expr::symbol(a), Expr::symbol(b), Expr::symbol(c)]);
    let nested = Expr::normal(
        f,
        [
            Expr::symbol(a),
            Expr::normal(f, [Expr::symbol(b), Expr::symbol(c)]),
        ],
    );
    assert_eq!(fx.matches(&pattern, &nested).len(), 1);
}

#[test]
fn alternatives_try_branches_in_order() {
    let mut fx = Fixture::new();
    let f = fx.sym("f");
    let x = fx.sym("x");
    let alternatives = Expr::normal(
        SymbolId::ALTERNATIVES,
        [
            Expr::normal(SymbolId::BLANK, [Expr::symbol(SymbolId::STRING)]),
            blank(),
        ],
    );
    let pattern = Expr::normal(f, [named(x, alternatives)]);

    // Both branches could match a string; the first one wins and the
    // match succeeds either way.
    assert_eq!(
        fx.matches(&pattern, &Expr::normal(f, [Expr::string("s")])).len(),
        1
    );
    assert_eq!(
        fx.matches(&pattern, &Expr::normal(f, [Expr::int(1)])).len(),
        1
    );
}

#[test]
fn empty_match_set_signals_failure_silently() {
    let mut fx = Fixture::new();
    let f = fx.sym("f");
    let g = fx.sym("g");
    let pattern = Expr::normal(f, [blank()]);

    let solutions = fx.matches(&pattern, &Expr::normal(g, [Expr::int(1)]));
    assert!(solutions.is_empty());
}
