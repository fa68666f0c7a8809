//! Condition language parsing
//!
//! Tokenizes and parses the condition text found in the `datatype`, `field`
//! and `rule` tables into [`tablecheck_core::Condition`] values.

pub mod lexer;
pub mod parser;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, ExprParser};
