//! Rule ordering and dispatch behavior.

use quern_engine::pattern::{Matcher, TableEnv};
use quern_engine::rules::{RuleOutcome, apply_rules};
use quern_foundation::{Expr, Interner, SymbolId};
use quern_symbols::{RuleSlot, SymbolTable, specificity};

fn blank() -> Expr {
    Expr::normal(SymbolId::BLANK, [])
}

fn typed_blank(head: SymbolId) -> Expr {
    Expr::normal(SymbolId::BLANK, [Expr::symbol(head)])
}

fn named(name: SymbolId, inner: Expr) -> Expr {
    Expr::normal(SymbolId::PATTERN, [Expr::symbol(name), inner])
}

#[test]
fn specificity_ladder_matches_the_contract() {
    let mut interner = Interner::new();
    let f = interner.intern("f");

    // literal > typed blank > untyped blank > sequence blank
    let literal = Expr::normal(f, [Expr::int(1)]);
    let typed = Expr::normal(f, [typed_blank(SymbolId::INTEGER)]);
    let untyped = Expr::normal(f, [blank()]);
    let sequence = Expr::normal(f, [Expr::normal(SymbolId::BLANK_SEQUENCE, [])]);
    let null_sequence = Expr::normal(f, [Expr::normal(SymbolId::BLANK_NULL_SEQUENCE, [])]);

    assert!(specificity(&literal) > specificity(&typed));
    assert!(specificity(&typed) > specificity(&untyped));
    assert!(specificity(&untyped) > specificity(&sequence));
    assert!(specificity(&sequence) > specificity(&null_sequence));
}

#[test]
fn most_specific_rule_wins_regardless_of_definition_order() {
    for specific_first in [true, false] {
        let mut interner = Interner::new();
        let f = interner.intern("f");
        let x = interner.intern("x");
        let mut table = SymbolTable::new();

        let general = (Expr::normal(f, [named(x, blank())]), Expr::string("general"));
        let specific = (Expr::normal(f, [Expr::int(0)]), Expr::string("specific"));

        let order: Vec<_> = if specific_first {
            vec![specific.clone(), general.clone()]
        } else {
            vec![general.clone(), specific.clone()]
        };
        for (pattern, replacement) in order {
            table
                .define_rule(f, RuleSlot::Down, pattern, replacement, false)
                .unwrap();
        }

        let rules = table.rules(f, RuleSlot::Down).clone();
        let mut env = TableEnv::new(&table);
        let outcome = apply_rules(
            &rules,
            &Expr::normal(f, [Expr::int(0)]),
            &Matcher::new(),
            &mut env,
        );
        assert_eq!(
            outcome,
            RuleOutcome::Applied(Expr::string("specific")),
            "definition order must not affect dispatch (specific_first = {specific_first})"
        );
    }
}

#[test]
fn equal_specificity_falls_back_to_definition_order() {
    let mut interner = Interner::new();
    let f = interner.intern("f");
    let mut table = SymbolTable::new();

    table
        .define_rule(
            f,
            RuleSlot::Down,
            Expr::normal(f, [Expr::int(1)]),
            Expr::string("first"),
            false,
        )
        .unwrap();
    table
        .define_rule(
            f,
            RuleSlot::Down,
            Expr::normal(f, [Expr::int(2)]),
            Expr::string("second"),
            false,
        )
        .unwrap();

    let rules = table.rules(f, RuleSlot::Down);
    assert_eq!(rules.rules()[0].replacement, Expr::string("first"));
    assert_eq!(rules.rules()[1].replacement, Expr::string("second"));
}

#[test]
fn redefining_the_same_pattern_replaces_the_rule() {
    let mut interner = Interner::new();
    let f = interner.intern("f");
    let x = interner.intern("x");
    let mut table = SymbolTable::new();

    let pattern = Expr::normal(f, [named(x, blank())]);
    table
        .define_rule(f, RuleSlot::Down, pattern.clone(), Expr::int(1), false)
        .unwrap();
    table
        .define_rule(f, RuleSlot::Down, pattern, Expr::int(2), false)
        .unwrap();

    let rules = table.rules(f, RuleSlot::Down);
    assert_eq!(rules.len(), 1);
    assert_eq!(rules.rules()[0].replacement, Expr::int(2));
}

#[test]
fn malformed_rules_leave_existing_rules_intact() {
    let mut interner = Interner::new();
    let f = interner.intern("f");
    let g = interner.intern("g");
    let mut table = SymbolTable::new();

    table
        .define_rule(
            f,
            RuleSlot::Down,
            Expr::normal(f, [blank()]),
            Expr::int(1),
            false,
        )
        .unwrap();

    // A down-value pattern headed by another symbol is rejected...
    let err = table.define_rule(
        f,
        RuleSlot::Down,
        Expr::normal(g, [blank()]),
        Expr::int(2),
        false,
    );
    assert!(err.is_err());

    // ...and the previous rule list is untouched.
    assert_eq!(table.rules(f, RuleSlot::Down).len(), 1);
}
