//! Parser module
//!
//! Recursive-descent parser for the narrative script grammar. Transforms the
//! token stream into an AST; a malformed script yields a single `ParseError`
//! carrying a source position, never a partial tree.

pub mod ast;
mod expr;
mod state;
mod stmt;

pub use state::ParserState;

use super::lexer::tokens::TokenKind;
use super::lexer::{tokenize, LexError};
use crate::util::span::Position;
use ast::Block;

#[cfg(test)]
mod tests;

/// Parse error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{position}: expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        position: Position,
    },
    #[error("{position}: unexpected {found}")]
    Unexpected { found: String, position: Position },
}

/// Parse source text into a block of statements
pub fn parse(source: &str) -> Result<Block, ParseError> {
    let tokens = tokenize(source)?;
    let mut state = ParserState::new(&tokens);
    let block = state.parse_block(&[])?;
    if !state.at_end() {
        return Err(state.unexpected());
    }
    Ok(block)
}

/// Parse a single expression (used for passage default arguments)
pub fn parse_expression(source: &str) -> Result<ast::Expr, ParseError> {
    let tokens = tokenize(source)?;
    let mut state = ParserState::new(&tokens);
    let expr = state.parse_expr()?;
    if !state.at_end() {
        return Err(state.unexpected());
    }
    Ok(expr)
}

impl<'a> ParserState<'a> {
    /// Parse statements until one of `terminators` (or Eof) is reached.
    /// The terminator token is left unconsumed.
    pub fn parse_block(&mut self, terminators: &[TokenKind]) -> Result<Block, ParseError> {
        let mut stmts = Vec::new();
        loop {
            // Stray semicolons separate statements but are otherwise ignored
            while self.skip(&TokenKind::Semicolon) {}

            if self.at_end() || terminators.iter().any(|t| self.at(t)) {
                break;
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(Block::new(stmts))
    }
}
