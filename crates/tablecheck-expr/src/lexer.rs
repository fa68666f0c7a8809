//! Lexer for condition text
//!
//! Converts a condition string such as `any(blank, in("a", t.c))` into tokens.

use tablecheck_core::ParseError;

/// Token kinds of the condition language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word: letters, digits and anything that is not punctuation
    Word(String),
    /// Double-quoted string, unescaped
    Quoted(String),
    /// `/pattern/flags` or `s/pattern/replacement/flags`
    Regex {
        pattern: String,
        replacement: Option<String>,
        flags: String,
    },
    LeftParen,
    RightParen,
    Comma,
    Dot,
    Equals,
    Eof,
}

/// A token and the byte offset it starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
}

fn is_word_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '(' | ')' | ',' | '.' | '=' | '"' | '/')
}

/// Lexer over a single condition string
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Tokenize the entire input; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn error(&self, position: usize, reason: impl Into<String>) -> ParseError {
        ParseError::new(self.input, position, reason)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let start = self.position;

        let Some(ch) = self.current_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                start,
            });
        };

        let kind = match ch {
            '(' => {
                self.advance();
                TokenKind::LeftParen
            }
            ')' => {
                self.advance();
                TokenKind::RightParen
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            '.' => {
                self.advance();
                TokenKind::Dot
            }
            '=' => {
                self.advance();
                TokenKind::Equals
            }
            '"' => self.read_quoted(start)?,
            '/' => {
                self.advance();
                let pattern = self.read_regex_part(start)?;
                TokenKind::Regex {
                    pattern,
                    replacement: None,
                    flags: self.read_flags(),
                }
            }
            's' if self.peek() == Some('/') => {
                self.advance();
                self.advance();
                let pattern = self.read_regex_part(start)?;
                let replacement = self.read_regex_part(start)?;
                TokenKind::Regex {
                    pattern,
                    replacement: Some(replacement),
                    flags: self.read_flags(),
                }
            }
            _ => {
                while self.current_char().is_some_and(is_word_char) {
                    self.advance();
                }
                TokenKind::Word(self.input[start..self.position].to_string())
            }
        };

        Ok(Token { kind, start })
    }

    fn read_quoted(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        self.advance();
        let mut value = String::new();
        loop {
            match self.current_char() {
                None => return Err(self.error(start, "unterminated string")),
                Some('"') => {
                    self.advance();
                    return Ok(TokenKind::Quoted(value));
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some(escaped @ ('"' | '\\')) => {
                            value.push(escaped);
                            self.advance();
                        }
                        _ => value.push('\\'),
                    }
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Read up to the next unescaped `/` and consume it. `\/` becomes `/`;
    /// every other escape is kept for the regex engine.
    fn read_regex_part(&mut self, start: usize) -> Result<String, ParseError> {
        let mut part = String::new();
        loop {
            match self.current_char() {
                None => return Err(self.error(start, "unterminated regex")),
                Some('/') => {
                    self.advance();
                    return Ok(part);
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some('/') => {
                            part.push('/');
                            self.advance();
                        }
                        Some(ch) => {
                            part.push('\\');
                            part.push(ch);
                            self.advance();
                        }
                        None => return Err(self.error(start, "unterminated regex")),
                    }
                }
                Some(ch) => {
                    part.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn read_flags(&mut self) -> String {
        let start = self.position;
        while self.current_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.advance();
        }
        self.input[start..self.position].to_string()
    }
}
