//! Parser state and token stream management

use super::super::lexer::tokens::*;
use super::ParseError;
use crate::util::span::{Position, Span};

/// Parser state for tracking position and errors
#[derive(Debug)]
pub struct ParserState<'a> {
    /// Token stream (always terminated by `Eof`)
    tokens: &'a [Token],
    /// Current position in token stream
    pos: usize,
}

impl<'a> ParserState<'a> {
    /// Create a new parser state
    #[inline]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Check if at end of token stream
    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len() || matches!(self.tokens[self.pos].kind, TokenKind::Eof)
    }

    /// Get current token
    #[inline]
    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Check whether the current token has the given kind
    #[inline]
    pub fn at(&self, kind: &TokenKind) -> bool {
        matches!(self.current(), Some(t) if &t.kind == kind)
    }

    /// Span of the current token
    #[inline]
    pub fn span(&self) -> Span {
        self.current().map(|t| t.span).unwrap_or_else(Span::dummy)
    }

    /// Start position of the current token, for error messages
    #[inline]
    pub fn position(&self) -> Position {
        self.span().start
    }

    /// Peek at next token
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    /// Check whether the next token is `=` (table-constructor lookahead)
    #[inline]
    pub fn peek_is_assign(&self) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Assign)
    }

    /// Advance to next token
    #[inline]
    pub fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Skip a specific token if present
    #[inline]
    pub fn skip(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Expect a specific token, consuming it or failing
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        match self.current() {
            Some(token) if &token.kind == kind => {
                let span = token.span;
                self.bump();
                Ok(span)
            }
            Some(token) => Err(ParseError::Expected {
                expected: kind.describe(),
                found: token.kind.describe(),
                position: token.span.start,
            }),
            None => Err(ParseError::Expected {
                expected: kind.describe(),
                found: TokenKind::Eof.describe(),
                position: Position::dummy(),
            }),
        }
    }

    /// Expect an identifier, consuming it
    pub fn expect_identifier(&mut self) -> Result<(String, Span), ParseError> {
        match self.current() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                span,
            }) => {
                let result = (name.clone(), *span);
                self.bump();
                Ok(result)
            }
            Some(token) => Err(ParseError::Expected {
                expected: "identifier".into(),
                found: token.kind.describe(),
                position: token.span.start,
            }),
            None => Err(ParseError::Expected {
                expected: "identifier".into(),
                found: TokenKind::Eof.describe(),
                position: Position::dummy(),
            }),
        }
    }

    /// Error for an unexpected current token
    pub fn unexpected(&self) -> ParseError {
        match self.current() {
            Some(token) => ParseError::Unexpected {
                found: token.kind.describe(),
                position: token.span.start,
            },
            None => ParseError::Unexpected {
                found: TokenKind::Eof.describe(),
                position: Position::dummy(),
            },
        }
    }
}
