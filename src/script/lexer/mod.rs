//! Lexer module
//!
//! Hand-written character lexer for the narrative script grammar.
//! Comments run from `--` to end of line.

pub mod tokens;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::util::span::Position;
use tokens::*;

pub use tokenizer::tokenize;


/// Lexer error
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexError {
    #[error("{position}: unexpected character '{ch}'")]
    UnexpectedChar { ch: char, position: Position },
    #[error("{position}: unterminated string")]
    UnterminatedString { position: Position },
    #[error("{position}: invalid number literal `{text}`")]
    InvalidNumber { text: String, position: Position },
}

/// Keyword lookup table
static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("if", TokenKind::KwIf),
        ("then", TokenKind::KwThen),
        ("elseif", TokenKind::KwElseif),
        ("else", TokenKind::KwElse),
        ("end", TokenKind::KwEnd),
        ("while", TokenKind::KwWhile),
        ("for", TokenKind::KwFor),
        ("do", TokenKind::KwDo),
        ("function", TokenKind::KwFunction),
        ("return", TokenKind::KwReturn),
        ("and", TokenKind::KwAnd),
        ("or", TokenKind::KwOr),
        ("not", TokenKind::KwNot),
        ("true", TokenKind::KwTrue),
        ("false", TokenKind::KwFalse),
        ("nil", TokenKind::KwNil),
    ])
});

/// Tokenize source code
mod tokenizer {
    use super::*;
    use crate::util::span::Span;
    use std::iter::Peekable;
    use std::str::Chars;

    /// Tokenize the given source, appending a trailing `Eof` token
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();

        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(
                Position::with_offset(lexer.line, lexer.column, lexer.offset),
                Position::with_offset(lexer.line, lexer.column + 1, lexer.offset + 1),
            ),
        });
        Ok(tokens)
    }

    struct Lexer<'a> {
        chars: Peekable<Chars<'a>>,
        offset: usize,
        line: usize,
        column: usize,
        start_offset: usize,
        start_line: usize,
        start_column: usize,
    }

    impl<'a> Lexer<'a> {
        fn new(source: &'a str) -> Self {
            Self {
                chars: source.chars().peekable(),
                offset: 0,
                line: 1,
                column: 1,
                start_offset: 0,
                start_line: 1,
                start_column: 1,
            }
        }

        fn position(&self) -> Position {
            Position::with_offset(self.line, self.column, self.offset)
        }

        fn start_position(&self) -> Position {
            Position::with_offset(self.start_line, self.start_column, self.start_offset)
        }

        fn span(&self) -> Span {
            Span::new(self.start_position(), self.position())
        }

        fn advance(&mut self) -> Option<char> {
            match self.chars.next() {
                Some('\n') => {
                    self.offset += 1;
                    self.line += 1;
                    self.column = 1;
                    Some('\n')
                }
                Some(c) => {
                    self.offset += c.len_utf8();
                    self.column += 1;
                    Some(c)
                }
                None => None,
            }
        }

        fn peek(&mut self) -> Option<&char> {
            self.chars.peek()
        }

        fn make_token(&self, kind: TokenKind) -> Token {
            Token {
                kind,
                span: self.span(),
            }
        }

        fn skip_whitespace_and_comments(&mut self) {
            loop {
                while let Some(&c) = self.peek() {
                    if c.is_whitespace() {
                        self.advance();
                    } else {
                        break;
                    }
                }
                // `--` line comment
                if self.peek() == Some(&'-') {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'-') {
                        while let Some(&c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.advance();
                        }
                        continue;
                    }
                }
                break;
            }
        }

        fn next_token(&mut self) -> Result<Option<Token>, LexError> {
            self.skip_whitespace_and_comments();

            if self.peek().is_none() {
                return Ok(None);
            }

            self.start_offset = self.offset;
            self.start_line = self.line;
            self.start_column = self.column;

            let c = match self.advance() {
                Some(c) => c,
                None => return Ok(None),
            };

            let token = match c {
                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(c),
                c if c.is_ascii_digit() => self.scan_number(c)?,
                '"' | '\'' => self.scan_string(c)?,
                '+' => self.make_token(TokenKind::Plus),
                '-' => self.make_token(TokenKind::Minus),
                '*' => self.make_token(TokenKind::Star),
                '/' => self.make_token(TokenKind::Slash),
                '%' => self.make_token(TokenKind::Percent),
                '(' => self.make_token(TokenKind::LParen),
                ')' => self.make_token(TokenKind::RParen),
                '[' => self.make_token(TokenKind::LBracket),
                ']' => self.make_token(TokenKind::RBracket),
                '{' => self.make_token(TokenKind::LBrace),
                '}' => self.make_token(TokenKind::RBrace),
                ',' => self.make_token(TokenKind::Comma),
                ';' => self.make_token(TokenKind::Semicolon),
                '.' => {
                    if self.peek() == Some(&'.') {
                        self.advance();
                        self.make_token(TokenKind::Concat)
                    } else {
                        self.make_token(TokenKind::Dot)
                    }
                }
                '=' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        self.make_token(TokenKind::Eq)
                    } else {
                        self.make_token(TokenKind::Assign)
                    }
                }
                '~' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        self.make_token(TokenKind::Neq)
                    } else {
                        return Err(LexError::UnexpectedChar {
                            ch: '~',
                            position: self.start_position(),
                        });
                    }
                }
                '<' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        self.make_token(TokenKind::Le)
                    } else {
                        self.make_token(TokenKind::Lt)
                    }
                }
                '>' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        self.make_token(TokenKind::Ge)
                    } else {
                        self.make_token(TokenKind::Gt)
                    }
                }
                other => {
                    return Err(LexError::UnexpectedChar {
                        ch: other,
                        position: self.start_position(),
                    })
                }
            };

            Ok(Some(token))
        }

        fn scan_identifier(&mut self, first: char) -> Token {
            let mut text = String::new();
            text.push(first);
            while let Some(&c) = self.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }

            match KEYWORDS.get(text.as_str()) {
                Some(kind) => self.make_token(kind.clone()),
                None => self.make_token(TokenKind::Identifier(text)),
            }
        }

        fn scan_number(&mut self, first: char) -> Result<Token, LexError> {
            let mut text = String::new();
            text.push(first);
            let mut seen_dot = false;

            while let Some(&c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else if c == '.' && !seen_dot {
                    // `1..2` is a concat of numbers, not a malformed literal
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'.') {
                        break;
                    }
                    seen_dot = true;
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }

            let value = text.parse::<f64>().map_err(|_| LexError::InvalidNumber {
                text: text.clone(),
                position: self.start_position(),
            })?;
            Ok(self.make_token(TokenKind::NumLiteral(value)))
        }

        fn scan_string(&mut self, quote: char) -> Result<Token, LexError> {
            let mut text = String::new();
            loop {
                match self.advance() {
                    Some(c) if c == quote => break,
                    Some('\\') => match self.advance() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some('\\') => text.push('\\'),
                        Some(c) if c == quote => text.push(c),
                        Some(other) => {
                            text.push('\\');
                            text.push(other);
                        }
                        None => {
                            return Err(LexError::UnterminatedString {
                                position: self.start_position(),
                            })
                        }
                    },
                    Some('\n') | None => {
                        return Err(LexError::UnterminatedString {
                            position: self.start_position(),
                        })
                    }
                    Some(c) => text.push(c),
                }
            }
            Ok(self.make_token(TokenKind::StringLiteral(text)))
        }
    }
}
