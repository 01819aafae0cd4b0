//! The symbol table: one entry per symbol, holding attributes, values, and
//! rule lists.
//!
//! Entries are created on first reference and live for the whole session.
//! The evaluator only reads the table; mutation happens through the
//! assignment builtins, which call the methods here.

use std::collections::HashMap;

use quern_foundation::{Error, Expr, Result, SymbolId};

use crate::attributes::Attributes;
use crate::rules::{RuleSet, RuleSlot};

/// A symbol's own value: what the bare symbol evaluates to.
#[derive(Clone, Debug)]
pub struct OwnValue {
    /// The value the symbol rewrites to.
    pub value: Expr,
    /// Delayed own values re-evaluate on every use.
    pub delayed: bool,
}

/// Everything the engine knows about one symbol.
#[derive(Clone, Debug, Default)]
pub struct SymbolEntry {
    /// Attribute set.
    pub attributes: Attributes,
    /// Own value, if assigned.
    pub own_value: Option<OwnValue>,
    /// Rules firing when the symbol heads an expression.
    pub down_values: RuleSet,
    /// Rules firing when the symbol appears as an argument.
    pub up_values: RuleSet,
    /// Rules firing when the symbol is the base head of a curried form.
    pub sub_values: RuleSet,
    /// Default value used by `Optional` patterns without an explicit
    /// default.
    pub default_value: Option<Expr>,
}

impl SymbolEntry {
    fn slot(&self, slot: RuleSlot) -> &RuleSet {
        match slot {
            RuleSlot::Down => &self.down_values,
            RuleSlot::Up => &self.up_values,
            RuleSlot::Sub => &self.sub_values,
        }
    }

    fn slot_mut(&mut self, slot: RuleSlot) -> &mut RuleSet {
        match slot {
            RuleSlot::Down => &mut self.down_values,
            RuleSlot::Up => &mut self.up_values,
            RuleSlot::Sub => &mut self.sub_values,
        }
    }

    /// Returns true if the entry carries no information.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.attributes.is_empty()
            && self.own_value.is_none()
            && self.down_values.is_empty()
            && self.up_values.is_empty()
            && self.sub_values.is_empty()
            && self.default_value.is_none()
    }
}

/// The session-scoped symbol table.
///
/// Each session owns exactly one table; concurrent sessions get independent
/// instances. There is no hidden global.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: HashMap<SymbolId, SymbolEntry>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The attribute set of a symbol (empty for unknown symbols).
    #[must_use]
    pub fn attributes(&self, symbol: SymbolId) -> Attributes {
        self.entries
            .get(&symbol)
            .map_or_else(Attributes::empty, |e| e.attributes)
    }

    /// Replaces a symbol's attribute set.
    ///
    /// # Errors
    /// Returns `AttributeConflict` if the combination cannot be honored.
    pub fn set_attributes(&mut self, symbol: SymbolId, attributes: Attributes) -> Result<()> {
        attributes.validate(symbol)?;
        self.entry_mut(symbol).attributes = attributes;
        Ok(())
    }

    /// Adds attributes to a symbol's set.
    ///
    /// # Errors
    /// Returns `AttributeConflict` if the resulting combination cannot be
    /// honored; the existing set is left unchanged.
    pub fn add_attributes(&mut self, symbol: SymbolId, attributes: Attributes) -> Result<()> {
        let combined = self.attributes(symbol).union(attributes);
        self.set_attributes(symbol, combined)
    }

    /// Removes attributes from a symbol's set.
    pub fn remove_attributes(&mut self, symbol: SymbolId, attributes: Attributes) {
        let remaining = self.attributes(symbol).difference(attributes);
        self.entry_mut(symbol).attributes = remaining;
    }

    /// Returns true if the symbol is protected against definitions.
    #[must_use]
    pub fn is_protected(&self, symbol: SymbolId) -> bool {
        self.attributes(symbol).contains(Attributes::PROTECTED)
    }

    /// The rule list for one slot of a symbol, in dispatch order.
    #[must_use]
    pub fn rules(&self, symbol: SymbolId, slot: RuleSlot) -> &RuleSet {
        self.entries
            .get(&symbol)
            .map_or(RuleSet::EMPTY_REF, |e| e.slot(slot))
    }

    /// Defines a rewrite rule on a symbol.
    ///
    /// # Errors
    /// Rejects definitions on protected symbols and patterns that cannot
    /// belong to the requested slot:
    /// - a down-value pattern must be a compound headed by the symbol;
    /// - a sub-value pattern must be a curried compound whose base head is
    ///   the symbol;
    /// - an up-value pattern must be a compound with the symbol at
    ///   argument level (as an element or an element's head).
    pub fn define_rule(
        &mut self,
        symbol: SymbolId,
        slot: RuleSlot,
        pattern: Expr,
        replacement: Expr,
        delayed: bool,
    ) -> Result<()> {
        if self.is_protected(symbol) {
            return Err(Error::protected_symbol(symbol));
        }
        validate_rule_shape(symbol, slot, &pattern)?;
        self.entry_mut(symbol)
            .slot_mut(slot)
            .insert(pattern, replacement, delayed);
        Ok(())
    }

    /// Removes a rule by its exact pattern. Returns true if removed.
    pub fn remove_rule(&mut self, symbol: SymbolId, slot: RuleSlot, pattern: &Expr) -> bool {
        self.entries
            .get_mut(&symbol)
            .is_some_and(|e| e.slot_mut(slot).remove(pattern))
    }

    /// The own value of a symbol.
    #[must_use]
    pub fn own_value(&self, symbol: SymbolId) -> Option<&OwnValue> {
        self.entries.get(&symbol)?.own_value.as_ref()
    }

    /// Assigns a symbol's own value.
    ///
    /// # Errors
    /// Rejects assignment to protected symbols.
    pub fn set_own_value(&mut self, symbol: SymbolId, value: Expr, delayed: bool) -> Result<()> {
        if self.is_protected(symbol) {
            return Err(Error::protected_symbol(symbol));
        }
        self.entry_mut(symbol).own_value = Some(OwnValue { value, delayed });
        Ok(())
    }

    /// Removes a symbol's own value. Returns true if one was set.
    pub fn clear_own_value(&mut self, symbol: SymbolId) -> bool {
        self.entries
            .get_mut(&symbol)
            .is_some_and(|e| e.own_value.take().is_some())
    }

    /// The default value used by `Optional` patterns for this symbol.
    #[must_use]
    pub fn default_value(&self, symbol: SymbolId) -> Option<&Expr> {
        self.entries.get(&symbol)?.default_value.as_ref()
    }

    /// Sets the default value for `Optional` patterns on this symbol.
    ///
    /// # Errors
    /// Rejects assignment to protected symbols.
    pub fn set_default_value(&mut self, symbol: SymbolId, value: Expr) -> Result<()> {
        if self.is_protected(symbol) {
            return Err(Error::protected_symbol(symbol));
        }
        self.entry_mut(symbol).default_value = Some(value);
        Ok(())
    }

    /// Clears a symbol's values (own, down, up, sub, default), keeping its
    /// attributes.
    pub fn clear(&mut self, symbol: SymbolId) {
        if let Some(entry) = self.entries.get_mut(&symbol) {
            entry.own_value = None;
            entry.down_values.clear();
            entry.up_values.clear();
            entry.sub_values.clear();
            entry.default_value = None;
        }
    }

    /// Clears a symbol's values and attributes.
    pub fn clear_all(&mut self, symbol: SymbolId) {
        if let Some(entry) = self.entries.get_mut(&symbol) {
            *entry = SymbolEntry::default();
        }
    }

    /// Returns true if the symbol has any definition at all.
    #[must_use]
    pub fn is_defined(&self, symbol: SymbolId) -> bool {
        self.entries.get(&symbol).is_some_and(|e| !e.is_trivial())
    }

    fn entry_mut(&mut self, symbol: SymbolId) -> &mut SymbolEntry {
        self.entries.entry(symbol).or_default()
    }
}

fn validate_rule_shape(symbol: SymbolId, slot: RuleSlot, pattern: &Expr) -> Result<()> {
    // `Condition` and `Pattern` wrappers around the whole rule pattern are
    // transparent for shape checking.
    let pattern = quern_foundation::pattern::pattern_core(pattern);
    let Some(compound) = pattern.as_compound() else {
        return Err(Error::malformed_rule(
            "rule pattern must be a compound expression",
        ));
    };
    match slot {
        RuleSlot::Down => {
            if compound.head.as_symbol() != Some(symbol) {
                return Err(Error::malformed_rule(
                    "down-value pattern must be headed by the defining symbol",
                ));
            }
        }
        RuleSlot::Sub => {
            let curried = compound.head.as_compound().is_some();
            if !curried || pattern.base_head_symbol() != Some(symbol) {
                return Err(Error::malformed_rule(
                    "sub-value pattern must be a curried form of the defining symbol",
                ));
            }
        }
        RuleSlot::Up => {
            let mentions = compound.elements.iter().any(|element| {
                element.as_symbol() == Some(symbol)
                    || element.base_head_symbol() == Some(symbol)
            });
            if !mentions {
                return Err(Error::malformed_rule(
                    "up-value pattern must mention the defining symbol at argument level",
                ));
            }
        }
    }
    Ok(())
}
