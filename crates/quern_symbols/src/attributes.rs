//! Per-symbol attribute sets.
//!
//! Attributes drive the evaluator: hold flags decide which arguments are
//! evaluated, `Flat`/`Orderless` normalize argument lists, `Listable`
//! threads over lists. Stored as a bit set for cheap copying and lookup.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use quern_foundation::{Error, Result, SymbolId};

/// A set of symbol attributes.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attributes(u32);

impl Attributes {
    /// Nested applications of the symbol are flattened (associativity).
    pub const FLAT: Self = Self(1 << 0);
    /// Arguments are sorted into canonical order (commutativity).
    pub const ORDERLESS: Self = Self(1 << 1);
    /// The symbol threads elementwise over `List` arguments.
    pub const LISTABLE: Self = Self(1 << 2);
    /// The first argument is not evaluated.
    pub const HOLD_FIRST: Self = Self(1 << 3);
    /// All arguments but the first are not evaluated.
    pub const HOLD_REST: Self = Self(1 << 4);
    /// No argument is evaluated.
    pub const HOLD_ALL: Self = Self(1 << 5);
    /// No argument is evaluated, `Evaluate` overrides are ignored, and
    /// `Sequence` splicing and up-values are suppressed.
    pub const HOLD_ALL_COMPLETE: Self = Self(1 << 6);
    /// Literal `Sequence` arguments are not spliced.
    pub const SEQUENCE_HOLD: Self = Self(1 << 7);
    /// `f[x]` is equivalent to `x` for pattern matching purposes.
    pub const ONE_IDENTITY: Self = Self(1 << 8);
    /// The symbol represents a numeric function of numeric arguments.
    pub const NUMERIC_FUNCTION: Self = Self(1 << 9);
    /// The symbol is a numeric constant.
    pub const CONSTANT: Self = Self(1 << 10);
    /// Value definitions for the symbol are rejected.
    pub const PROTECTED: Self = Self(1 << 11);

    /// Attribute names in flag order, for the `Attributes` and
    /// `SetAttributes` builtins.
    pub const NAMES: &'static [(&'static str, Self)] = &[
        ("Flat", Self::FLAT),
        ("Orderless", Self::ORDERLESS),
        ("Listable", Self::LISTABLE),
        ("HoldFirst", Self::HOLD_FIRST),
        ("HoldRest", Self::HOLD_REST),
        ("HoldAll", Self::HOLD_ALL),
        ("HoldAllComplete", Self::HOLD_ALL_COMPLETE),
        ("SequenceHold", Self::SEQUENCE_HOLD),
        ("OneIdentity", Self::ONE_IDENTITY),
        ("NumericFunction", Self::NUMERIC_FUNCTION),
        ("Constant", Self::CONSTANT),
        ("Protected", Self::PROTECTED),
    ];

    /// The empty attribute set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns true if no attribute is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every attribute in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two attribute sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// This set without the attributes in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Looks up an attribute flag by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, flag)| flag)
    }

    /// Returns true if the first argument is held.
    #[must_use]
    pub const fn holds_first(self) -> bool {
        self.contains(Self::HOLD_FIRST)
            || self.contains(Self::HOLD_ALL)
            || self.contains(Self::HOLD_ALL_COMPLETE)
    }

    /// Returns true if arguments after the first are held.
    #[must_use]
    pub const fn holds_rest(self) -> bool {
        self.contains(Self::HOLD_REST)
            || self.contains(Self::HOLD_ALL)
            || self.contains(Self::HOLD_ALL_COMPLETE)
    }

    /// Checks that this combination can be consistently applied.
    ///
    /// # Errors
    /// Returns `ErrorKind::AttributeConflict` for combinations the
    /// evaluator cannot honor: `HoldAllComplete` suppresses the argument
    /// rewriting that `Flat`, `Orderless`, and `Listable` require.
    pub fn validate(self, symbol: SymbolId) -> Result<()> {
        if self.contains(Self::HOLD_ALL_COMPLETE) {
            for conflict in [Self::FLAT, Self::ORDERLESS, Self::LISTABLE] {
                if self.contains(conflict) {
                    let (name, _) = Self::NAMES
                        .iter()
                        .find(|&&(_, flag)| flag == conflict)
                        .expect("conflicting flag is named");
                    return Err(Error::attribute_conflict(
                        symbol,
                        format!("HoldAllComplete cannot combine with {name}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Attributes(")?;
        let mut first = true;
        for (name, flag) in Self::NAMES {
            if self.contains(*flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        write!(f, ")")
    }
}
