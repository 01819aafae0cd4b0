//! Error types for the Quern engine.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Expected outcomes are not errors here: pattern-match failure is an empty
//! solution set, and numeric indeterminates become symbolic marker
//! expressions. The kinds below cover definition-time rejection, resource
//! limits, and internal invariant violations.

use std::fmt;

use thiserror::Error;

use crate::intern::SymbolId;

/// Convenient result alias used throughout Quern.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Quern operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a malformed-rule error.
    #[must_use]
    pub fn malformed_rule(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRule {
            reason: reason.into(),
        })
    }

    /// Creates an attribute-conflict error.
    #[must_use]
    pub fn attribute_conflict(symbol: SymbolId, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::AttributeConflict {
            symbol,
            reason: reason.into(),
        })
    }

    /// Creates a protected-symbol error.
    #[must_use]
    pub fn protected_symbol(symbol: SymbolId) -> Self {
        Self::new(ErrorKind::ProtectedSymbol(symbol))
    }

    /// Creates an engine limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: EngineLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates an internal invariant violation error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A rule definition that cannot be consistently applied.
    #[error("malformed rule: {reason}")]
    MalformedRule {
        /// Why the definition was rejected.
        reason: String,
    },

    /// An attribute combination that cannot be consistently applied.
    #[error("attribute conflict on symbol {symbol:?}: {reason}")]
    AttributeConflict {
        /// The symbol whose attributes were being changed.
        symbol: SymbolId,
        /// Why the combination was rejected.
        reason: String,
    },

    /// Attempted definition on a protected symbol.
    #[error("symbol is protected: {0:?}")]
    ProtectedSymbol(SymbolId),

    /// Engine resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(EngineLimit),

    /// Internal invariant violation (should never be user-triggerable).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Engine resource limits that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLimit {
    /// Maximum rewrite iterations for one top-level evaluation exceeded.
    IterationLimit {
        /// The configured limit.
        limit: usize,
    },
    /// Maximum expression recursion depth exceeded.
    RecursionLimit {
        /// The configured limit.
        limit: usize,
    },
}

impl fmt::Display for EngineLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IterationLimit { limit } => {
                write!(f, "iteration limit ({limit}) exceeded")
            }
            Self::RecursionLimit { limit } => {
                write!(f, "recursion limit ({limit}) exceeded")
            }
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The symbol whose definition or evaluation triggered the error.
    pub symbol: Option<SymbolId>,
    /// Stack of head symbols active when the error occurred.
    pub stack: Vec<SymbolId>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the originating symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: SymbolId) -> Self {
        self.stack.push(frame);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol {
            write!(f, "at {symbol:?}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame:?}")?;
            }
        }
        Ok(())
    }
}
