//! Symbol interning.
//!
//! Symbols are interned to enable fast equality comparison and to give the
//! canonical expression order a cheap, session-stable tie-break.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interned symbol identifier.
///
/// Symbols are identifiers like `Plus`, `x`, `fac`. They are globally unique
/// by name within one session; two occurrences of the same name always
/// intern to the same id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Returns the raw index of this symbol.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    // =========================================================================
    // Reserved Symbols
    // =========================================================================
    // These are always interned at startup with fixed indices, so the engine
    // can recognize structural heads without an interner in hand.

    /// Reserved head for lists: `List`
    pub const LIST: SymbolId = SymbolId(0);
    /// Reserved head for argument splicing: `Sequence`
    pub const SEQUENCE: SymbolId = SymbolId(1);
    /// Reserved pattern head matching one expression: `Blank`
    pub const BLANK: SymbolId = SymbolId(2);
    /// Reserved pattern head matching one or more siblings: `BlankSequence`
    pub const BLANK_SEQUENCE: SymbolId = SymbolId(3);
    /// Reserved pattern head matching zero or more siblings: `BlankNullSequence`
    pub const BLANK_NULL_SEQUENCE: SymbolId = SymbolId(4);
    /// Reserved pattern-name binder: `Pattern`
    pub const PATTERN: SymbolId = SymbolId(5);
    /// Reserved optional-argument pattern: `Optional`
    pub const OPTIONAL: SymbolId = SymbolId(6);
    /// Reserved guarded pattern: `Condition`
    pub const CONDITION: SymbolId = SymbolId(7);
    /// Reserved ordered-choice pattern: `Alternatives`
    pub const ALTERNATIVES: SymbolId = SymbolId(8);
    /// Reserved rule head: `Rule`
    pub const RULE: SymbolId = SymbolId(9);
    /// Reserved delayed-rule head: `RuleDelayed`
    pub const RULE_DELAYED: SymbolId = SymbolId(10);
    /// Reserved evaluation barrier: `Hold`
    pub const HOLD: SymbolId = SymbolId(11);
    /// Reserved complete evaluation barrier: `HoldComplete`
    pub const HOLD_COMPLETE: SymbolId = SymbolId(12);
    /// Reserved hold override: `Evaluate`
    pub const EVALUATE: SymbolId = SymbolId(13);
    /// Reserved boolean truth: `True`
    pub const TRUE: SymbolId = SymbolId(14);
    /// Reserved boolean falsehood: `False`
    pub const FALSE: SymbolId = SymbolId(15);
    /// Reserved unit result: `Null`
    pub const NULL: SymbolId = SymbolId(16);
    /// Reserved marker for undefined numeric results: `Indeterminate`
    pub const INDETERMINATE: SymbolId = SymbolId(17);
    /// Reserved marker for directionless infinity: `ComplexInfinity`
    pub const COMPLEX_INFINITY: SymbolId = SymbolId(18);
    /// Reserved positive infinity: `Infinity`
    pub const INFINITY: SymbolId = SymbolId(19);
    /// Reserved machine-precision sentinel: `MachinePrecision`
    pub const MACHINE_PRECISION: SymbolId = SymbolId(20);
    /// Reserved atom head: `Integer`
    pub const INTEGER: SymbolId = SymbolId(21);
    /// Reserved atom head: `Rational`
    pub const RATIONAL: SymbolId = SymbolId(22);
    /// Reserved atom head: `Real`
    pub const REAL: SymbolId = SymbolId(23);
    /// Reserved atom head: `Complex`
    pub const COMPLEX: SymbolId = SymbolId(24);
    /// Reserved atom head: `String`
    pub const STRING: SymbolId = SymbolId(25);
    /// Reserved atom head: `Symbol`
    pub const SYMBOL: SymbolId = SymbolId(26);
    /// Reserved failure marker: `$Failed`
    pub const FAILED: SymbolId = SymbolId(27);
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// Interner mapping symbol names to unique ids and back.
///
/// Each session owns one interner; it is not shared across sessions and is
/// not thread-safe without external synchronization.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interner {
    /// Symbol name storage, indexed by `SymbolId`.
    names: Vec<Arc<str>>,
    /// Map from name to `SymbolId`.
    name_map: HashMap<Arc<str>, SymbolId>,
}

impl Interner {
    /// Reserved symbols that are pre-interned at startup, in id order.
    const RESERVED_SYMBOLS: &'static [&'static str] = &[
        "List",              // SymbolId(0)
        "Sequence",          // SymbolId(1)
        "Blank",             // SymbolId(2)
        "BlankSequence",     // SymbolId(3)
        "BlankNullSequence", // SymbolId(4)
        "Pattern",           // SymbolId(5)
        "Optional",          // SymbolId(6)
        "Condition",         // SymbolId(7)
        "Alternatives",      // SymbolId(8)
        "Rule",              // SymbolId(9)
        "RuleDelayed",       // SymbolId(10)
        "Hold",              // SymbolId(11)
        "HoldComplete",      // SymbolId(12)
        "Evaluate",          // SymbolId(13)
        "True",              // SymbolId(14)
        "False",             // SymbolId(15)
        "Null",              // SymbolId(16)
        "Indeterminate",     // SymbolId(17)
        "ComplexInfinity",   // SymbolId(18)
        "Infinity",          // SymbolId(19)
        "MachinePrecision",  // SymbolId(20)
        "Integer",           // SymbolId(21)
        "Rational",          // SymbolId(22)
        "Real",              // SymbolId(23)
        "Complex",           // SymbolId(24)
        "String",            // SymbolId(25)
        "Symbol",            // SymbolId(26)
        "$Failed",           // SymbolId(27)
    ];

    /// Creates a new interner with reserved symbols pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Self::default();

        for (i, &name) in Self::RESERVED_SYMBOLS.iter().enumerate() {
            let id = interner.intern(name);
            debug_assert_eq!(
                id.0 as usize, i,
                "Reserved symbol '{}' should have index {}, got {}",
                name, i, id.0
            );
        }

        interner
    }

    /// Interns a symbol name, returning its [`SymbolId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned symbols exceeds `u32::MAX`.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.name_map.get(name) {
            return id;
        }

        let idx = u32::try_from(self.names.len()).expect("too many interned symbols");
        let arc: Arc<str> = name.into();
        self.names.push(arc.clone());

        let id = SymbolId(idx);
        self.name_map.insert(arc, id);
        id
    }

    /// Looks up a symbol name without interning it.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.name_map.get(name).copied()
    }

    /// Gets the name of a symbol.
    #[must_use]
    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.names.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Returns the number of interned symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no symbols are interned (never true in practice,
    /// since reserved symbols are interned by `new`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
