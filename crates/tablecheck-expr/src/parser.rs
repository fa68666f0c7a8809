//! Recursive descent parser for condition text
//!
//! ```text
//! expression := regex | call | field | named | string
//! call       := WORD "(" [expression ("," expression)*] ")"
//! field      := (WORD | QUOTED) "." (WORD | QUOTED)
//! named      := WORD "=" (WORD | QUOTED)
//! string     := WORD | QUOTED
//! ```

use crate::lexer::{Lexer, Token, TokenKind};
use tablecheck_core::{Condition, ConditionParser, ParseError};

/// The default [`ConditionParser`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprParser;

impl ExprParser {
    pub fn new() -> Self {
        Self
    }
}

impl ConditionParser for ExprParser {
    fn parse(&self, raw: &str) -> Result<Condition, ParseError> {
        parse(raw)
    }
}

/// Parse a single condition
pub fn parse(input: &str) -> Result<Condition, ParseError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        input,
        tokens,
        position: 0,
    };

    if parser.current().kind == TokenKind::Eof {
        return Err(ParseError::new(input, 0, "empty condition"));
    }

    let condition = parser.parse_expression()?;
    let trailing = parser.current();
    if trailing.kind != TokenKind::Eof {
        return Err(parser.error_at(trailing.start, "unexpected trailing input"));
    }
    Ok(condition)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl Parser<'_> {
    fn current(&self) -> &Token {
        // tokenize() always ends with Eof and we never advance past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn error_at(&self, position: usize, reason: impl Into<String>) -> ParseError {
        ParseError::new(self.input, position, reason)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(())
        } else {
            Err(self.error_at(token.start, format!("expected {}", what)))
        }
    }

    fn parse_expression(&mut self) -> Result<Condition, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Regex {
                pattern,
                replacement,
                flags,
            } => Ok(Condition::Regex {
                pattern,
                flags,
                replacement,
            }),
            TokenKind::Word(word) => match self.current().kind {
                TokenKind::LeftParen => self.parse_call(word),
                TokenKind::Dot => self.parse_field(word),
                TokenKind::Equals => self.parse_named(word),
                _ => Ok(Condition::DatatypeRef(word)),
            },
            TokenKind::Quoted(text) => match self.current().kind {
                TokenKind::Dot => self.parse_field(text),
                _ => Ok(Condition::Literal(text)),
            },
            _ => Err(self.error_at(token.start, "expected a condition")),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Condition, ParseError> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut args = Vec::new();
        if self.current().kind == TokenKind::RightParen {
            self.advance();
            return Ok(Condition::Call { name, args });
        }
        loop {
            args.push(self.parse_expression()?);
            let token = self.advance();
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RightParen => return Ok(Condition::Call { name, args }),
                _ => return Err(self.error_at(token.start, "expected ',' or ')'")),
            }
        }
    }

    fn parse_field(&mut self, table: String) -> Result<Condition, ParseError> {
        self.expect(TokenKind::Dot, "'.'")?;
        let token = self.advance();
        match token.kind {
            TokenKind::Word(column) | TokenKind::Quoted(column) => {
                Ok(Condition::FieldRef { table, column })
            }
            _ => Err(self.error_at(token.start, "expected a column name after '.'")),
        }
    }

    fn parse_named(&mut self, key: String) -> Result<Condition, ParseError> {
        self.expect(TokenKind::Equals, "'='")?;
        let token = self.advance();
        let value = match token.kind {
            TokenKind::Word(word) => Condition::DatatypeRef(word),
            TokenKind::Quoted(text) => Condition::Literal(text),
            _ => return Err(self.error_at(token.start, format!("expected a value for '{}'", key))),
        };
        Ok(Condition::NamedArg {
            key,
            value: Box::new(value),
        })
    }
}
