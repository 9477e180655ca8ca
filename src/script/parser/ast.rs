//! Abstract Syntax Tree types
//!
//! Immutable after parse; spans point back into the source for error reporting.

use crate::util::span::Span;

/// A sequence of statements
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    #[inline]
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target = expr`
    Assign {
        target: AssignTarget,
        value: Expr,
        span: Span,
    },
    /// `if cond then … {elseif cond then …} [else …] end`
    If {
        /// Condition/body pairs: the `if` arm followed by each `elseif` arm
        arms: Vec<(Expr, Block)>,
        else_branch: Option<Block>,
        span: Span,
    },
    /// `while cond do … end`
    While {
        condition: Expr,
        body: Block,
        span: Span,
    },
    /// `for var = start, stop[, step] do … end`
    NumericFor {
        var: String,
        start: Expr,
        stop: Expr,
        step: Option<Expr>,
        body: Block,
        span: Span,
    },
    /// `function name(p1, p2, …) … end`
    FnDef {
        name: String,
        params: Vec<String>,
        body: Block,
        span: Span,
    },
    /// `return [expr]`
    Return { value: Option<Expr>, span: Span },
    /// Bare expression in statement position (calls)
    ExprStmt { expr: Expr, span: Span },
}

/// Assignment target
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// Plain variable
    Name(String),
    /// Table slot: `t[k]` or `t.k` (dot access desugars to a string key)
    Index { table: Expr, index: Expr },
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Lit(Literal, Span),
    Var(String, Span),
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    UnOp {
        op: UnOp,
        expr: Box<Expr>,
        span: Span,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    /// `t[k]` or `t.k` (dot access desugars to a string-literal index)
    Index {
        table: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// `{1, 2, x = 3, ["k"] = 4}`
    TableCtor { entries: Vec<TableEntry>, span: Span },
}

impl Expr {
    /// Span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Lit(_, span) | Expr::Var(_, span) => *span,
            Expr::BinOp { span, .. }
            | Expr::UnOp { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::TableCtor { span, .. } => *span,
        }
    }
}

/// One entry of a table constructor, in source order
#[derive(Debug, Clone, PartialEq)]
pub enum TableEntry {
    /// `expr` — receives the next 1-based positional number key
    Positional(Expr),
    /// `name = expr`
    Named(String, Expr),
    /// `[keyExpr] = expr`
    Keyed(Expr, Expr),
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Num(f64),
    Str(String),
    Bool(bool),
    Nil,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}
