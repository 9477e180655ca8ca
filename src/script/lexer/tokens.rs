//! Token types for the narrative script grammar

use crate::util::span::Span;

/// Token kind
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    KwIf,
    KwThen,
    KwElseif,
    KwElse,
    KwEnd,
    KwWhile,
    KwFor,
    KwDo,
    KwFunction,
    KwReturn,
    KwAnd,
    KwOr,
    KwNot,
    KwTrue,
    KwFalse,
    KwNil,

    // Identifiers
    Identifier(String),

    // Literals
    NumLiteral(f64),
    StringLiteral(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Concat,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Semicolon,

    // Special
    Eof,
}

impl TokenKind {
    /// Human-readable description for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier `{}`", name),
            TokenKind::NumLiteral(n) => format!("number `{}`", n),
            TokenKind::StringLiteral(s) => format!("string \"{}\"", s),
            TokenKind::KwIf => "`if`".into(),
            TokenKind::KwThen => "`then`".into(),
            TokenKind::KwElseif => "`elseif`".into(),
            TokenKind::KwElse => "`else`".into(),
            TokenKind::KwEnd => "`end`".into(),
            TokenKind::KwWhile => "`while`".into(),
            TokenKind::KwFor => "`for`".into(),
            TokenKind::KwDo => "`do`".into(),
            TokenKind::KwFunction => "`function`".into(),
            TokenKind::KwReturn => "`return`".into(),
            TokenKind::KwAnd => "`and`".into(),
            TokenKind::KwOr => "`or`".into(),
            TokenKind::KwNot => "`not`".into(),
            TokenKind::KwTrue => "`true`".into(),
            TokenKind::KwFalse => "`false`".into(),
            TokenKind::KwNil => "`nil`".into(),
            TokenKind::Plus => "`+`".into(),
            TokenKind::Minus => "`-`".into(),
            TokenKind::Star => "`*`".into(),
            TokenKind::Slash => "`/`".into(),
            TokenKind::Percent => "`%`".into(),
            TokenKind::Concat => "`..`".into(),
            TokenKind::Eq => "`==`".into(),
            TokenKind::Neq => "`~=`".into(),
            TokenKind::Lt => "`<`".into(),
            TokenKind::Le => "`<=`".into(),
            TokenKind::Gt => "`>`".into(),
            TokenKind::Ge => "`>=`".into(),
            TokenKind::Assign => "`=`".into(),
            TokenKind::LParen => "`(`".into(),
            TokenKind::RParen => "`)`".into(),
            TokenKind::LBracket => "`[`".into(),
            TokenKind::RBracket => "`]`".into(),
            TokenKind::LBrace => "`{`".into(),
            TokenKind::RBrace => "`}`".into(),
            TokenKind::Comma => "`,`".into(),
            TokenKind::Dot => "`.`".into(),
            TokenKind::Semicolon => "`;`".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

/// Token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
