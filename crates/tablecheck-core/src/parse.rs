//! Condition parser interface
//!
//! The engine never tokenizes raw condition text itself; it goes through a
//! [`ConditionParser`]. `tablecheck-expr` provides the default one.

use crate::condition::Condition;

/// Turns raw condition text into a [`Condition`]
pub trait ConditionParser: Send + Sync {
    /// Parse a single condition
    fn parse(&self, raw: &str) -> Result<Condition, ParseError>;
}

/// Syntax error raised by a [`ConditionParser`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid condition '{input}' at position {position}: {reason}")]
pub struct ParseError {
    /// Raw text that failed to parse
    pub input: String,

    /// Byte offset of the failure
    pub position: usize,

    /// What went wrong
    pub reason: String,
}

impl ParseError {
    pub fn new(input: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            position,
            reason: reason.into(),
        }
    }
}
