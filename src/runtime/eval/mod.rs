//! Tree-walking evaluator
//!
//! Executes parsed script blocks against a persistent [`Environment`].
//! Runaway loops are converted into reported faults by a hard iteration cap;
//! division by zero is a safe operation yielding zero. A faulted script keeps
//! whatever mutations happened before the fault (no rollback) and does not
//! poison later `execute` calls.

mod stdlib;

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use crate::runtime::env::Environment;
use crate::runtime::extfunc::{ExternalFunctionRegistry, SharedExternals};
use crate::runtime::value::{new_table, FunctionValue, TableKey, Value};
use crate::script::parser::ast::*;
use crate::script::{parse, ParseError};
use crate::util::span::Position;

#[cfg(test)]
mod tests;

/// Hard upper bound on `while`/`for` iterations per loop entry
pub const MAX_LOOP_ITERATIONS: usize = 100_000;

/// Hard upper bound on nested script function calls
pub const MAX_CALL_DEPTH: usize = 120;

/// Evaluation fault
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    #[error("{position}: loop exceeded maximum iterations ({limit})")]
    IterationLimit { limit: usize, position: Position },
    #[error("{position}: call depth exceeded ({limit})")]
    CallDepth { limit: usize, position: Position },
    #[error("{position}: cannot apply `{op}` to {lhs} and {rhs}")]
    BinOpTypes {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
        position: Position,
    },
    #[error("{position}: cannot negate a {operand} value")]
    NegTypes {
        operand: &'static str,
        position: Position,
    },
    #[error("{position}: attempt to call a {type_name} value")]
    NotCallable {
        type_name: &'static str,
        position: Position,
    },
    #[error("{position}: unknown function `{name}`")]
    UnknownFunction { name: String, position: Position },
    #[error("{position}: attempt to index a {type_name} value")]
    NotIndexable {
        type_name: &'static str,
        position: Position,
    },
    #[error("{position}: a {type_name} value is not a valid table key")]
    InvalidKey {
        type_name: &'static str,
        position: Position,
    },
    #[error("{position}: `for` step must not be zero")]
    ZeroStep { position: Position },
    #[error("{position}: {message}")]
    BadArgument { message: String, position: Position },
}

/// Outcome of one `execute` call
#[derive(Debug, Clone, PartialEq)]
pub struct ExecOutcome {
    /// Whether the script ran to completion
    pub success: bool,
    /// Error messages (`line:column: message`), empty on success
    pub errors: Vec<String>,
    /// Lines produced by `print`
    pub output: Vec<String>,
}

/// Statement-level control flow
enum Flow {
    Normal,
    Return(Value),
}

/// Script engine: evaluator plus its persistent environment
pub struct ScriptEngine {
    env: Environment,
    externals: SharedExternals,
    output: Vec<String>,
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine {
    /// Create an engine with its own external-function registry
    pub fn new() -> Self {
        Self::with_externals(ExternalFunctionRegistry::shared())
    }

    /// Create an engine sharing an external-function registry with a host
    pub fn with_externals(externals: SharedExternals) -> Self {
        Self {
            env: Environment::new(),
            externals,
            output: Vec::new(),
        }
    }

    /// The shared external-function registry
    pub fn externals(&self) -> SharedExternals {
        Arc::clone(&self.externals)
    }

    /// Parse and execute a script against the persistent environment
    pub fn execute(&mut self, source: &str) -> ExecOutcome {
        let block = match parse(source) {
            Ok(block) => block,
            Err(err) => return self.fail(err),
        };

        match self.exec_block(&block) {
            Ok(_) => ExecOutcome {
                success: true,
                errors: Vec::new(),
                output: std::mem::take(&mut self.output),
            },
            Err(err) => {
                debug!("script fault: {err}");
                // Discard any call frames left by the fault; globals keep
                // whatever mutations happened before it
                while self.env.depth() > 0 {
                    self.env.pop_frame();
                }
                ExecOutcome {
                    success: false,
                    errors: vec![err.to_string()],
                    output: std::mem::take(&mut self.output),
                }
            }
        }
    }

    fn fail(&mut self, err: ParseError) -> ExecOutcome {
        ExecOutcome {
            success: false,
            errors: vec![err.to_string()],
            output: std::mem::take(&mut self.output),
        }
    }

    /// Read a variable from the global scope
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        self.env.get(name).cloned()
    }

    /// Write a variable into the global scope
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.env.set_global(name, value);
    }

    /// Snapshot of every global variable
    pub fn get_all_variables(&self) -> HashMap<String, Value> {
        self.env.globals()
    }

    /// Clear the environment entirely
    pub fn reset(&mut self) {
        self.env.clear();
        self.output.clear();
    }

    /// Evaluate a single already-parsed expression (passage default
    /// arguments are bound this way)
    pub fn eval_expression(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.eval_expr(expr)
    }

    pub(crate) fn push_output(&mut self, line: String) {
        self.output.push(line);
    }

    // === statements ===

    fn exec_block(&mut self, block: &Block) -> Result<Flow, EvalError> {
        for stmt in &block.stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, EvalError> {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                let value = self.eval_expr(value)?;
                self.assign(target, value)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                arms, else_branch, ..
            } => {
                for (condition, body) in arms {
                    if self.eval_expr(condition)?.is_truthy() {
                        return self.exec_block(body);
                    }
                }
                if let Some(body) = else_branch {
                    return self.exec_block(body);
                }
                Ok(Flow::Normal)
            }
            Stmt::While {
                condition,
                body,
                span,
            } => {
                let mut iterations = 0usize;
                while self.eval_expr(condition)?.is_truthy() {
                    iterations += 1;
                    if iterations > MAX_LOOP_ITERATIONS {
                        return Err(EvalError::IterationLimit {
                            limit: MAX_LOOP_ITERATIONS,
                            position: span.start,
                        });
                    }
                    if let Flow::Return(value) = self.exec_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::NumericFor {
                var,
                start,
                stop,
                step,
                body,
                span,
            } => {
                // Bounds are evaluated exactly once, at loop entry
                let start = self.expect_num(start, "for start")?;
                let stop = self.expect_num(stop, "for stop")?;
                let step = match step {
                    Some(expr) => self.expect_num(expr, "for step")?,
                    None => 1.0,
                };
                if step == 0.0 {
                    return Err(EvalError::ZeroStep {
                        position: span.start,
                    });
                }

                let mut i = start;
                let mut iterations = 0usize;
                while (step > 0.0 && i <= stop) || (step < 0.0 && i >= stop) {
                    iterations += 1;
                    if iterations > MAX_LOOP_ITERATIONS {
                        return Err(EvalError::IterationLimit {
                            limit: MAX_LOOP_ITERATIONS,
                            position: span.start,
                        });
                    }
                    self.env.set(var, Value::Num(i));
                    if let Flow::Return(value) = self.exec_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                    i += step;
                }
                Ok(Flow::Normal)
            }
            Stmt::FnDef {
                name, params, body, ..
            } => {
                let func = FunctionValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                };
                self.env.set(name, Value::Function(Arc::new(func)));
                Ok(Flow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::ExprStmt { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn assign(&mut self, target: &AssignTarget, value: Value) -> Result<(), EvalError> {
        match target {
            AssignTarget::Name(name) => {
                self.env.set(name, value);
                Ok(())
            }
            AssignTarget::Index { table, index } => {
                let table_value = self.eval_expr(table)?;
                let key_value = self.eval_expr(index)?;
                match table_value {
                    Value::Table(table_ref) => {
                        let key = TableKey::from_value(&key_value).ok_or(EvalError::InvalidKey {
                            type_name: key_value.type_name(),
                            position: index.span().start,
                        })?;
                        table_ref.write().insert(key, value);
                        Ok(())
                    }
                    other => Err(EvalError::NotIndexable {
                        type_name: other.type_name(),
                        position: table.span().start,
                    }),
                }
            }
        }
    }

    // === expressions ===

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Lit(literal, _) => Ok(match literal {
                Literal::Num(n) => Value::Num(*n),
                Literal::Str(s) => Value::str(s),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Nil => Value::Nil,
            }),
            // Reading an unset variable yields nil
            Expr::Var(name, _) => Ok(self.env.get(name).cloned().unwrap_or(Value::Nil)),
            Expr::BinOp {
                op,
                left,
                right,
                span,
            } => self.eval_binop(*op, left, right, span.start),
            Expr::UnOp { op, expr, span } => {
                let value = self.eval_expr(expr)?;
                match op {
                    UnOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnOp::Neg => match value {
                        Value::Num(n) => Ok(Value::Num(-n)),
                        other => Err(EvalError::NegTypes {
                            operand: other.type_name(),
                            position: span.start,
                        }),
                    },
                }
            }
            Expr::Call { func, args, span } => self.eval_call(func, args, span.start),
            Expr::Index { table, index, .. } => {
                let table_value = self.eval_expr(table)?;
                let key_value = self.eval_expr(index)?;
                match table_value {
                    Value::Table(table_ref) => {
                        let key = TableKey::from_value(&key_value).ok_or(EvalError::InvalidKey {
                            type_name: key_value.type_name(),
                            position: index.span().start,
                        })?;
                        Ok(table_ref.read().get(&key).cloned().unwrap_or(Value::Nil))
                    }
                    other => Err(EvalError::NotIndexable {
                        type_name: other.type_name(),
                        position: table.span().start,
                    }),
                }
            }
            Expr::TableCtor { entries, span } => {
                let table = new_table();
                let mut next_index = 1.0f64;
                for entry in entries {
                    match entry {
                        TableEntry::Positional(expr) => {
                            let value = self.eval_expr(expr)?;
                            table.write().insert(TableKey::num(next_index), value);
                            next_index += 1.0;
                        }
                        TableEntry::Named(name, expr) => {
                            let value = self.eval_expr(expr)?;
                            table.write().insert(TableKey::str(name.clone()), value);
                        }
                        TableEntry::Keyed(key_expr, expr) => {
                            let key_value = self.eval_expr(key_expr)?;
                            let key = TableKey::from_value(&key_value).ok_or(
                                EvalError::InvalidKey {
                                    type_name: key_value.type_name(),
                                    position: span.start,
                                },
                            )?;
                            let value = self.eval_expr(expr)?;
                            table.write().insert(key, value);
                        }
                    }
                }
                Ok(Value::Table(table))
            }
        }
    }

    fn eval_binop(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        position: Position,
    ) -> Result<Value, EvalError> {
        // Short-circuit operators return the deciding operand, Lua style
        match op {
            BinOp::And => {
                let lhs = self.eval_expr(left)?;
                if !lhs.is_truthy() {
                    return Ok(lhs);
                }
                return self.eval_expr(right);
            }
            BinOp::Or => {
                let lhs = self.eval_expr(left)?;
                if lhs.is_truthy() {
                    return Ok(lhs);
                }
                return self.eval_expr(right);
            }
            _ => {}
        }

        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;

        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let (a, b) = match (&lhs, &rhs) {
                    (Value::Num(a), Value::Num(b)) => (*a, *b),
                    _ => {
                        return Err(EvalError::BinOpTypes {
                            op: arith_symbol(op),
                            lhs: lhs.type_name(),
                            rhs: rhs.type_name(),
                            position,
                        })
                    }
                };
                Ok(Value::Num(match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    // Division and modulo by zero degrade safely to zero
                    BinOp::Div => {
                        if b == 0.0 {
                            0.0
                        } else {
                            a / b
                        }
                    }
                    BinOp::Mod => {
                        if b == 0.0 {
                            0.0
                        } else {
                            a % b
                        }
                    }
                    _ => unreachable!(),
                }))
            }
            BinOp::Concat => {
                let coerce = |v: &Value| -> Option<String> {
                    match v {
                        Value::Str(s) => Some(s.to_string()),
                        Value::Num(_) => Some(v.to_string()),
                        _ => None,
                    }
                };
                match (coerce(&lhs), coerce(&rhs)) {
                    (Some(a), Some(b)) => Ok(Value::str(format!("{a}{b}"))),
                    _ => Err(EvalError::BinOpTypes {
                        op: "..",
                        lhs: lhs.type_name(),
                        rhs: rhs.type_name(),
                        position,
                    }),
                }
            }
            BinOp::Eq => Ok(Value::Bool(lhs == rhs)),
            BinOp::Neq => Ok(Value::Bool(lhs != rhs)),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let ordering = match (&lhs, &rhs) {
                    (Value::Num(a), Value::Num(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => None,
                };
                let Some(ordering) = ordering else {
                    return Err(EvalError::BinOpTypes {
                        op: cmp_symbol(op),
                        lhs: lhs.type_name(),
                        rhs: rhs.type_name(),
                        position,
                    });
                };
                Ok(Value::Bool(match op {
                    BinOp::Lt => ordering.is_lt(),
                    BinOp::Le => ordering.is_le(),
                    BinOp::Gt => ordering.is_gt(),
                    BinOp::Ge => ordering.is_ge(),
                    _ => unreachable!(),
                }))
            }
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_call(
        &mut self,
        func: &Expr,
        args: &[Expr],
        position: Position,
    ) -> Result<Value, EvalError> {
        let mut arg_values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg)?);
        }

        match func {
            Expr::Var(name, _) => {
                // Any binding shadows builtins and externals; a non-function
                // binding makes the name not callable rather than falling
                // through to a builtin of the same name
                match self.env.get(name).cloned() {
                    Some(Value::Function(function)) => {
                        return self.call_function(&function, &arg_values, position);
                    }
                    Some(value) => {
                        return Err(EvalError::NotCallable {
                            type_name: value.type_name(),
                            position,
                        });
                    }
                    None => {}
                }
                if let Some(result) = stdlib::call_builtin(self, name, &arg_values, position) {
                    return result;
                }
                let external = self.externals.read().get(name);
                if let Some(external) = external {
                    return Ok(external(&arg_values));
                }
                Err(EvalError::UnknownFunction {
                    name: name.clone(),
                    position,
                })
            }
            // Dotted builtin namespaces: math.floor, string.upper, ...
            Expr::Index { table, index, .. } => {
                if let (Expr::Var(ns, _), Expr::Lit(Literal::Str(member), _)) =
                    (table.as_ref(), index.as_ref())
                {
                    if self.env.get(ns).is_none() {
                        let qualified = format!("{ns}.{member}");
                        if let Some(result) =
                            stdlib::call_builtin(self, &qualified, &arg_values, position)
                        {
                            return result;
                        }
                        return Err(EvalError::UnknownFunction {
                            name: qualified,
                            position,
                        });
                    }
                }
                // A table slot may hold a function value
                let callee = self.eval_expr(func)?;
                match callee {
                    Value::Function(function) => {
                        self.call_function(&function, &arg_values, position)
                    }
                    other => Err(EvalError::NotCallable {
                        type_name: other.type_name(),
                        position,
                    }),
                }
            }
            other => {
                let callee = self.eval_expr(other)?;
                match callee {
                    Value::Function(function) => {
                        self.call_function(&function, &arg_values, position)
                    }
                    value => Err(EvalError::NotCallable {
                        type_name: value.type_name(),
                        position,
                    }),
                }
            }
        }
    }

    fn call_function(
        &mut self,
        function: &FunctionValue,
        args: &[Value],
        position: Position,
    ) -> Result<Value, EvalError> {
        if self.env.depth() >= MAX_CALL_DEPTH {
            return Err(EvalError::CallDepth {
                limit: MAX_CALL_DEPTH,
                position,
            });
        }

        // Missing arguments bind nil, extra arguments are dropped
        let mut frame = HashMap::with_capacity(function.params.len());
        for (i, param) in function.params.iter().enumerate() {
            frame.insert(param.clone(), args.get(i).cloned().unwrap_or(Value::Nil));
        }

        self.env.push_frame(frame);
        let result = self.exec_block(&function.body);
        self.env.pop_frame();

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }

    fn expect_num(&mut self, expr: &Expr, what: &str) -> Result<f64, EvalError> {
        match self.eval_expr(expr)? {
            Value::Num(n) => Ok(n),
            other => Err(EvalError::BadArgument {
                message: format!("{what} must be a number, got {}", other.type_name()),
                position: expr.span().start,
            }),
        }
    }
}

fn arith_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        _ => "?",
    }
}

fn cmp_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        _ => "?",
    }
}
