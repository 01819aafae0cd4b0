//! Immutable symbolic expression trees.
//!
//! An [`Expr`] is either an atom (number, string, symbol) or a compound
//! `head[e1, e2, …]` whose head is itself an expression. Expressions are
//! immutable and cheap to clone: compounds are reference-counted and their
//! element vectors use structural sharing, so rewriting one argument of a
//! large expression shares everything else.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use num_bigint::BigInt;

use crate::intern::{Interner, SymbolId};
use crate::number::Number;
use crate::real::Real;

/// Persistent element vector with structural sharing.
pub type ExprVec = im::Vector<Expr>;

/// A symbolic expression.
#[derive(Clone)]
pub enum Expr {
    /// A number from the tower (integer, rational, real, complex).
    Number(Number),
    /// A string atom.
    String(Arc<str>),
    /// An interned symbol.
    Symbol(SymbolId),
    /// A compound expression `head[e1, …, en]`.
    Compound(Arc<Compound>),
}

/// The body of a compound expression.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Compound {
    /// The head expression, usually a symbol.
    pub head: Expr,
    /// The ordered elements.
    pub elements: ExprVec,
}

impl Expr {
    /// An exact integer atom.
    #[must_use]
    pub fn int(value: impl Into<BigInt>) -> Self {
        Self::Number(Number::Int(value.into()))
    }

    /// A number atom.
    #[must_use]
    pub fn number(value: Number) -> Self {
        Self::Number(value)
    }

    /// A real atom.
    #[must_use]
    pub fn real(value: Real) -> Self {
        Self::Number(Number::Real(value))
    }

    /// A string atom.
    #[must_use]
    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Self::String(value.into())
    }

    /// A symbol atom.
    #[must_use]
    pub const fn symbol(id: SymbolId) -> Self {
        Self::Symbol(id)
    }

    /// A compound expression.
    #[must_use]
    pub fn compound(head: Self, elements: impl IntoIterator<Item = Self>) -> Self {
        Self::Compound(Arc::new(Compound {
            head,
            elements: elements.into_iter().collect(),
        }))
    }

    /// A compound with a symbol head.
    #[must_use]
    pub fn normal(head: SymbolId, elements: impl IntoIterator<Item = Self>) -> Self {
        Self::compound(Self::Symbol(head), elements)
    }

    /// A `List[…]` expression.
    #[must_use]
    pub fn list(elements: impl IntoIterator<Item = Self>) -> Self {
        Self::normal(SymbolId::LIST, elements)
    }

    /// A `Sequence[…]` expression.
    #[must_use]
    pub fn sequence(elements: impl IntoIterator<Item = Self>) -> Self {
        Self::normal(SymbolId::SEQUENCE, elements)
    }

    /// The symbol `True`.
    #[must_use]
    pub const fn truth() -> Self {
        Self::Symbol(SymbolId::TRUE)
    }

    /// The symbol `False`.
    #[must_use]
    pub const fn falsehood() -> Self {
        Self::Symbol(SymbolId::FALSE)
    }

    /// `True` or `False` from a boolean.
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        if value { Self::truth() } else { Self::falsehood() }
    }

    /// Returns true for atoms (everything but compounds).
    #[must_use]
    pub const fn is_atom(&self) -> bool {
        !matches!(self, Self::Compound(_))
    }

    /// Attempts to extract a symbol id.
    #[must_use]
    pub const fn as_symbol(&self) -> Option<SymbolId> {
        match self {
            Self::Symbol(id) => Some(*id),
            _ => None,
        }
    }

    /// Attempts to extract a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Attempts to extract a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to view this expression as a compound.
    #[must_use]
    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Self::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// The head of this expression. Atoms report their type symbol
    /// (`Integer`, `Real`, `String`, `Symbol`, …).
    #[must_use]
    pub fn head(&self) -> Self {
        match self {
            Self::Number(n) => Self::Symbol(n.head_symbol()),
            Self::String(_) => Self::Symbol(SymbolId::STRING),
            Self::Symbol(_) => Self::Symbol(SymbolId::SYMBOL),
            Self::Compound(c) => c.head.clone(),
        }
    }

    /// The head as a symbol id, when the head is a symbol.
    #[must_use]
    pub fn head_symbol(&self) -> Option<SymbolId> {
        match self {
            Self::Number(n) => Some(n.head_symbol()),
            Self::String(_) => Some(SymbolId::STRING),
            Self::Symbol(_) => Some(SymbolId::SYMBOL),
            Self::Compound(c) => c.head.as_symbol(),
        }
    }

    /// The base head symbol, following compound heads down: for
    /// `f[a][b][c]` this is `f`.
    #[must_use]
    pub fn base_head_symbol(&self) -> Option<SymbolId> {
        match self {
            Self::Compound(c) => match &c.head {
                Self::Symbol(id) => Some(*id),
                head @ Self::Compound(_) => head.base_head_symbol(),
                _ => None,
            },
            _ => self.head_symbol(),
        }
    }

    /// Returns true if this is a compound with the given symbol head.
    #[must_use]
    pub fn has_head(&self, head: SymbolId) -> bool {
        matches!(self, Self::Compound(c) if c.head.as_symbol() == Some(head))
    }

    /// (head symbol, arity) signature used for rule candidate filtering.
    #[must_use]
    pub fn signature(&self) -> Option<(SymbolId, usize)> {
        let compound = self.as_compound()?;
        Some((compound.head.as_symbol()?, compound.elements.len()))
    }

    /// Number of elements; 0 for atoms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_compound().map_or(0, |c| c.elements.len())
    }

    /// Returns true for atoms and for empty compounds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements as an owned `Vec` (clones are O(1) per element).
    #[must_use]
    pub fn elements(&self) -> Vec<Self> {
        self.as_compound()
            .map_or_else(Vec::new, |c| c.elements.iter().cloned().collect())
    }

    /// Canonical total order over expressions: numbers < strings < symbols
    /// < compounds; numbers by value with exact before inexact, strings
    /// lexicographic, symbols by interned id, compounds by head, then
    /// length, then elements left to right.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let rank = self.rank().cmp(&other.rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.canonical_cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Symbol(a), Self::Symbol(b)) => a.cmp(b),
            (Self::Compound(a), Self::Compound(b)) => {
                if Arc::ptr_eq(a, b) {
                    return Ordering::Equal;
                }
                let head = a.head.canonical_cmp(&b.head);
                if head != Ordering::Equal {
                    return head;
                }
                let len = a.elements.len().cmp(&b.elements.len());
                if len != Ordering::Equal {
                    return len;
                }
                for (x, y) in a.elements.iter().zip(b.elements.iter()) {
                    let ord = x.canonical_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            }
            _ => unreachable!("rank comparison covers mixed variants"),
        }
    }

    /// Renders this expression in full form (`f[a, b]`) using the interner
    /// for symbol names. Intended for diagnostics and tests.
    #[must_use]
    pub fn to_full_form(&self, interner: &Interner) -> String {
        match self {
            Self::Number(n) => format!("{n}"),
            Self::String(s) => format!("{s:?}"),
            Self::Symbol(id) => interner
                .name(*id)
                .map_or_else(|| format!("Symbol#{}", id.index()), str::to_owned),
            Self::Compound(c) => {
                let head = c.head.to_full_form(interner);
                let elements: Vec<String> = c
                    .elements
                    .iter()
                    .map(|e| e.to_full_form(interner))
                    .collect();
                format!("{head}[{}]", elements.join(", "))
            }
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::String(_) => 1,
            Self::Symbol(_) => 2,
            Self::Compound(_) => 3,
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Compound(a), Self::Compound(b)) => {
                // Shared subtrees compare by pointer first.
                Arc::ptr_eq(a, b) || **a == **b
            }
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Number(n) => n.hash(state),
            Self::String(s) => s.hash(state),
            Self::Symbol(id) => id.hash(state),
            Self::Compound(c) => c.hash(state),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(id) => write!(f, "Symbol#{}", id.index()),
            Self::Compound(c) => {
                write!(f, "{:?}[", c.head)?;
                for (i, e) in c.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e:?}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

impl From<Number> for Expr {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<SymbolId> for Expr {
    fn from(value: SymbolId) -> Self {
        Self::Symbol(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}
