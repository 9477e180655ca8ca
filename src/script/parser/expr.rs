//! Expression parsing
//!
//! Precedence ladder (loosest to tightest):
//! `or` < `and` < comparison < concatenation < additive < multiplicative
//! < unary < call/index/primary. Concatenation is right-associative, the
//! rest are left-associative.

use super::super::lexer::tokens::*;
use super::ast::*;
use super::state::ParserState;
use super::ParseError;
use crate::util::span::Span;

impl<'a> ParserState<'a> {
    /// Parse an expression
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.skip(&TokenKind::KwOr) {
            let right = self.parse_and()?;
            left = binop(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        while self.skip(&TokenKind::KwAnd) {
            let right = self.parse_comparison()?;
            left = binop(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_concat()?;
        loop {
            let op = match self.current().map(|t| &t.kind) {
                Some(TokenKind::Eq) => BinOp::Eq,
                Some(TokenKind::Neq) => BinOp::Neq,
                Some(TokenKind::Lt) => BinOp::Lt,
                Some(TokenKind::Le) => BinOp::Le,
                Some(TokenKind::Gt) => BinOp::Gt,
                Some(TokenKind::Ge) => BinOp::Ge,
                _ => break,
            };
            self.bump();
            let right = self.parse_concat()?;
            left = binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_concat(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;
        if self.skip(&TokenKind::Concat) {
            // Right-associative
            let right = self.parse_concat()?;
            return Ok(binop(BinOp::Concat, left, right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current().map(|t| &t.kind) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let right = self.parse_multiplicative()?;
            left = binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().map(|t| &t.kind) {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                Some(TokenKind::Percent) => BinOp::Mod,
                _ => break,
            };
            self.bump();
            let right = self.parse_unary()?;
            left = binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start_span = self.span();
        let op = match self.current().map(|t| &t.kind) {
            Some(TokenKind::Minus) => Some(UnOp::Neg),
            Some(TokenKind::KwNot) => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let expr = self.parse_unary()?;
            let span = start_span.merge(expr.span());
            return Ok(Expr::UnOp {
                op,
                expr: Box::new(expr),
                span,
            });
        }
        self.parse_postfix()
    }

    /// Calls, bracket indexing and dot access, applied left-to-right
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current().map(|t| &t.kind) {
                Some(TokenKind::LParen) => {
                    self.bump();
                    let mut args = Vec::new();
                    if !self.at(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.skip(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    let end_span = self.expect(&TokenKind::RParen)?;
                    let span = expr.span().merge(end_span);
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        span,
                    };
                }
                Some(TokenKind::LBracket) => {
                    self.bump();
                    let index = self.parse_expr()?;
                    let end_span = self.expect(&TokenKind::RBracket)?;
                    let span = expr.span().merge(end_span);
                    expr = Expr::Index {
                        table: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                Some(TokenKind::Dot) => {
                    self.bump();
                    let (name, name_span) = self.expect_identifier()?;
                    let span = expr.span().merge(name_span);
                    expr = Expr::Index {
                        table: Box::new(expr),
                        index: Box::new(Expr::Lit(Literal::Str(name), name_span)),
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.span();
        match self.current().map(|t| t.kind.clone()) {
            Some(TokenKind::NumLiteral(n)) => {
                self.bump();
                Ok(Expr::Lit(Literal::Num(n), span))
            }
            Some(TokenKind::StringLiteral(s)) => {
                self.bump();
                Ok(Expr::Lit(Literal::Str(s), span))
            }
            Some(TokenKind::KwTrue) => {
                self.bump();
                Ok(Expr::Lit(Literal::Bool(true), span))
            }
            Some(TokenKind::KwFalse) => {
                self.bump();
                Ok(Expr::Lit(Literal::Bool(false), span))
            }
            Some(TokenKind::KwNil) => {
                self.bump();
                Ok(Expr::Lit(Literal::Nil, span))
            }
            Some(TokenKind::Identifier(name)) => {
                self.bump();
                Ok(Expr::Var(name, span))
            }
            Some(TokenKind::LParen) => {
                self.bump();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            Some(TokenKind::LBrace) => self.parse_table_ctor(span),
            _ => Err(self.unexpected()),
        }
    }

    /// `{1, 2, x = 3, ["k"] = 4}`
    fn parse_table_ctor(&mut self, start_span: Span) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut entries = Vec::new();

        while !self.at(&TokenKind::RBrace) {
            match self.current().map(|t| t.kind.clone()) {
                // `[keyExpr] = expr`
                Some(TokenKind::LBracket) => {
                    self.bump();
                    let key = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    self.expect(&TokenKind::Assign)?;
                    let value = self.parse_expr()?;
                    entries.push(TableEntry::Keyed(key, value));
                }
                // `name = expr` needs a two-token lookahead to tell it apart
                // from a positional entry that starts with an identifier
                Some(TokenKind::Identifier(name)) if self.peek_is_assign() => {
                    self.bump();
                    self.bump();
                    let value = self.parse_expr()?;
                    entries.push(TableEntry::Named(name, value));
                }
                _ => {
                    entries.push(TableEntry::Positional(self.parse_expr()?));
                }
            }

            if !self.skip(&TokenKind::Comma) {
                break;
            }
        }

        let end_span = self.expect(&TokenKind::RBrace)?;
        Ok(Expr::TableCtor {
            entries,
            span: start_span.merge(end_span),
        })
    }
}

#[inline]
fn binop(op: BinOp, left: Expr, right: Expr) -> Expr {
    let span = left.span().merge(right.span());
    Expr::BinOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}
