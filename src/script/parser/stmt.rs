//! Statement parsing

use super::super::lexer::tokens::*;
use super::ast::*;
use super::state::ParserState;
use super::ParseError;
use crate::util::span::Span;

impl<'a> ParserState<'a> {
    /// Parse a statement
    pub fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.span();

        match self.current().map(|t| &t.kind) {
            Some(TokenKind::KwIf) => self.parse_if_stmt(start_span),
            Some(TokenKind::KwWhile) => self.parse_while_stmt(start_span),
            Some(TokenKind::KwFor) => self.parse_for_stmt(start_span),
            Some(TokenKind::KwFunction) => self.parse_fn_stmt(start_span),
            Some(TokenKind::KwReturn) => self.parse_return_stmt(start_span),
            _ => self.parse_assign_or_expr_stmt(start_span),
        }
    }

    /// `if cond then … {elseif cond then …} [else …] end`
    fn parse_if_stmt(&mut self, start_span: Span) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::KwIf)?;

        let mut arms = Vec::new();
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::KwThen)?;
        let body = self.parse_block(&[TokenKind::KwElseif, TokenKind::KwElse, TokenKind::KwEnd])?;
        arms.push((condition, body));

        while self.skip(&TokenKind::KwElseif) {
            let condition = self.parse_expr()?;
            self.expect(&TokenKind::KwThen)?;
            let body =
                self.parse_block(&[TokenKind::KwElseif, TokenKind::KwElse, TokenKind::KwEnd])?;
            arms.push((condition, body));
        }

        let else_branch = if self.skip(&TokenKind::KwElse) {
            Some(self.parse_block(&[TokenKind::KwEnd])?)
        } else {
            None
        };

        let end_span = self.expect(&TokenKind::KwEnd)?;
        Ok(Stmt::If {
            arms,
            else_branch,
            span: start_span.merge(end_span),
        })
    }

    /// `while cond do … end`
    fn parse_while_stmt(&mut self, start_span: Span) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::KwWhile)?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::KwDo)?;
        let body = self.parse_block(&[TokenKind::KwEnd])?;
        let end_span = self.expect(&TokenKind::KwEnd)?;
        Ok(Stmt::While {
            condition,
            body,
            span: start_span.merge(end_span),
        })
    }

    /// `for var = start, stop[, step] do … end`
    fn parse_for_stmt(&mut self, start_span: Span) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::KwFor)?;
        let (var, _) = self.expect_identifier()?;
        self.expect(&TokenKind::Assign)?;
        let start = self.parse_expr()?;
        self.expect(&TokenKind::Comma)?;
        let stop = self.parse_expr()?;
        let step = if self.skip(&TokenKind::Comma) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::KwDo)?;
        let body = self.parse_block(&[TokenKind::KwEnd])?;
        let end_span = self.expect(&TokenKind::KwEnd)?;
        Ok(Stmt::NumericFor {
            var,
            start,
            stop,
            step,
            body,
            span: start_span.merge(end_span),
        })
    }

    /// `function name(p1, p2, …) … end`
    fn parse_fn_stmt(&mut self, start_span: Span) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::KwFunction)?;
        let (name, _) = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                let (param, _) = self.expect_identifier()?;
                params.push(param);
                if !self.skip(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;

        let body = self.parse_block(&[TokenKind::KwEnd])?;
        let end_span = self.expect(&TokenKind::KwEnd)?;
        Ok(Stmt::FnDef {
            name,
            params,
            body,
            span: start_span.merge(end_span),
        })
    }

    /// `return [expr]`
    fn parse_return_stmt(&mut self, start_span: Span) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::KwReturn)?;

        // `return` may stand alone at the end of a block
        let value = if self.at_end()
            || self.at(&TokenKind::KwEnd)
            || self.at(&TokenKind::KwElse)
            || self.at(&TokenKind::KwElseif)
            || self.at(&TokenKind::Semicolon)
        {
            None
        } else {
            Some(self.parse_expr()?)
        };

        let span = match &value {
            Some(expr) => start_span.merge(expr.span()),
            None => start_span,
        };
        Ok(Stmt::Return { value, span })
    }

    /// Assignment (`name = …`, `t[k] = …`, `t.k = …`) or a bare call expression
    fn parse_assign_or_expr_stmt(&mut self, start_span: Span) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;

        if self.at(&TokenKind::Assign) {
            let target = match expr {
                Expr::Var(name, _) => AssignTarget::Name(name),
                Expr::Index { table, index, .. } => AssignTarget::Index {
                    table: *table,
                    index: *index,
                },
                other => {
                    return Err(ParseError::Unexpected {
                        found: "expression on the left of `=`".into(),
                        position: other.span().start,
                    })
                }
            };
            self.bump();
            let value = self.parse_expr()?;
            let span = start_span.merge(value.span());
            return Ok(Stmt::Assign {
                target,
                value,
                span,
            });
        }

        // Only calls make sense as bare statements
        if !matches!(expr, Expr::Call { .. }) {
            return Err(ParseError::Unexpected {
                found: "expression in statement position".into(),
                position: expr.span().start,
            });
        }

        let span = start_span.merge(expr.span());
        Ok(Stmt::ExprStmt { expr, span })
    }
}
