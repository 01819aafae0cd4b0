//! Expression model behavior: construction, equality, canonical order.

use std::cmp::Ordering;

use quern_foundation::{Expr, Interner, Number};

#[test]
fn interning_gives_stable_identities() {
    let mut interner = Interner::new();
    let a = interner.intern("alpha");
    let b = interner.intern("alpha");
    let c = interner.intern("beta");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.name(a), Some("alpha"));
}

#[test]
fn compounds_compare_structurally() {
    let mut interner = Interner::new();
    let f = interner.intern("f");

    let a = Expr::normal(f, [Expr::int(1), Expr::string("s")]);
    let b = Expr::normal(f, [Expr::int(1), Expr::string("s")]);
    assert_eq!(a, b);

    let c = Expr::normal(f, [Expr::int(1)]);
    assert_ne!(a, c);
}

#[test]
fn expressions_as_heads() {
    let mut interner = Interner::new();
    let f = interner.intern("f");

    // f[1][2]: the head is itself a compound.
    let curried = Expr::compound(Expr::normal(f, [Expr::int(1)]), [Expr::int(2)]);
    assert_eq!(curried.base_head_symbol(), Some(f));
    assert!(curried.head_symbol().is_none());
    assert_eq!(curried.len(), 1);
}

#[test]
fn canonical_order_is_total_over_variants() {
    let mut interner = Interner::new();
    let sym = interner.intern("q");

    let mut exprs = vec![
        Expr::normal(sym, []),
        Expr::symbol(sym),
        Expr::string("text"),
        Expr::int(3),
        Expr::number(Number::rational(7, 2).unwrap()),
    ];
    exprs.sort_by(|a, b| a.canonical_cmp(b));

    // Numbers first (by value), then strings, then symbols, then
    // compounds.
    assert_eq!(exprs[0], Expr::int(3));
    assert_eq!(exprs[1], Expr::number(Number::rational(7, 2).unwrap()));
    assert_eq!(exprs[2], Expr::string("text"));
    assert_eq!(exprs[3], Expr::symbol(sym));
    assert_eq!(exprs[4], Expr::normal(sym, []));
}

#[test]
fn rewriting_shares_unchanged_subtrees() {
    let mut interner = Interner::new();
    let f = interner.intern("f");

    let shared = Expr::normal(f, [Expr::int(1), Expr::int(2)]);
    // Rebuilding a list around the same subtree is O(1) per clone and
    // compares equal by pointer before falling back to structure.
    let a = Expr::list([shared.clone(), Expr::int(3)]);
    let b = Expr::list([shared, Expr::int(4)]);
    assert_eq!(a.elements()[0], b.elements()[0]);
    assert_ne!(a, b);
}

#[test]
fn full_form_round_trips_structure() {
    let mut interner = Interner::new();
    let f = interner.intern("f");
    let g = interner.intern("g");

    let expr = Expr::normal(
        f,
        [
            Expr::normal(g, [Expr::int(1)]),
            Expr::number(Number::rational(1, 2).unwrap()),
            Expr::string("s"),
        ],
    );
    assert_eq!(expr.to_full_form(&interner), "f[g[1], 1/2, \"s\"]");
}

#[test]
fn signatures_filter_rule_candidates() {
    let mut interner = Interner::new();
    let f = interner.intern("f");

    let unary = Expr::normal(f, [Expr::int(1)]);
    let binary = Expr::normal(f, [Expr::int(1), Expr::int(2)]);
    assert_eq!(unary.signature(), Some((f, 1)));
    assert_eq!(binary.signature(), Some((f, 2)));
    assert_ne!(unary.signature(), binary.signature());

    assert_eq!(Expr::int(1).signature(), None);
}

#[test]
fn numbers_order_by_value_then_exactness() {
    let half = Expr::number(Number::rational(1, 2).unwrap());
    let one = Expr::int(1);
    let machine_one = Expr::number(Number::machine_real(1.0).unwrap());

    assert_eq!(half.canonical_cmp(&one), Ordering::Less);
    // Equal values: the exact integer sorts before the machine real.
    assert_eq!(one.canonical_cmp(&machine_one), Ordering::Less);
    assert_eq!(machine_one.canonical_cmp(&one), Ordering::Greater);
}
