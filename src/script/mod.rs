//! Script frontend: lexer and parser
//!
//! `parse` is a pure function of the source text; all runtime state lives in
//! [`crate::runtime`].

pub mod lexer;
pub mod parser;

pub use parser::{parse, parse_expression, ParseError};
