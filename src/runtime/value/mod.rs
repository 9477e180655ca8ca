//! Core runtime value types
//!
//! This module implements [`Value`], the unified representation of all values
//! a narrative script can produce at runtime. Tables and functions are
//! Arc-backed so passing them around shares storage: mutating a table received
//! by a function is visible to the caller.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::script::parser::ast::Block;

#[cfg(test)]
mod tests;

/// Shared table storage
///
/// Insertion-ordered so serialized variable dumps and `print` output stay
/// stable across runs.
pub type TableRef = Arc<RwLock<IndexMap<TableKey, Value>>>;

/// Create an empty shared table
#[inline]
pub fn new_table() -> TableRef {
    Arc::new(RwLock::new(IndexMap::new()))
}

/// Table key: numbers (by canonical bit pattern) or strings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableKey {
    Num(u64),
    Str(String),
}

impl TableKey {
    /// Key for a numeric index. `-0.0` is folded into `0.0` so both spell
    /// the same slot.
    #[inline]
    pub fn num(n: f64) -> Self {
        let n = if n == 0.0 { 0.0 } else { n };
        TableKey::Num(n.to_bits())
    }

    /// Key for a string index
    #[inline]
    pub fn str(s: impl Into<String>) -> Self {
        TableKey::Str(s.into())
    }

    /// Build a key from a runtime value; only numbers and strings are
    /// valid table keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Num(n) => Some(TableKey::num(*n)),
            Value::Str(s) => Some(TableKey::str(s.as_ref())),
            _ => None,
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKey::Num(bits) => write!(f, "{}", format_num(f64::from_bits(*bits))),
            TableKey::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Script function value: parameter names and body
///
/// No capture list is stored. Scoping is deliberately flat: the body
/// evaluates against the engine environment current at call time, with a
/// frame holding only the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValue {
    /// Function name, as defined
    pub name: String,
    /// Ordered parameter names
    pub params: Vec<String>,
    /// Body block
    pub body: Block,
}

/// Runtime value - tagged union over everything a script can hold
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Nil,
    /// Boolean
    Bool(bool),
    /// Number (single numeric type)
    Num(f64),
    /// Immutable shared string
    Str(Arc<str>),
    /// Shared mutable table
    Table(TableRef),
    /// Script function
    Function(Arc<FunctionValue>),
}

impl Value {
    /// Convenience constructor for strings
    #[inline]
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// Truthiness: `nil` and `false` are falsy, everything else is truthy
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
            Value::Function(_) => "function",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Tables and functions compare by identity
            (Value::Table(a), Value::Table(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_value(self, f, &mut Vec::new())
    }
}

/// Render a value, tracking visited tables so reference cycles terminate.
/// A table already on the render path prints as `{...}`.
fn fmt_value(
    value: &Value,
    f: &mut fmt::Formatter<'_>,
    seen: &mut Vec<*const ()>,
) -> fmt::Result {
    match value {
        Value::Nil => write!(f, "nil"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Num(n) => write!(f, "{}", format_num(*n)),
        Value::Str(s) => write!(f, "{}", s),
        Value::Table(t) => {
            let ptr = Arc::as_ptr(t) as *const ();
            if seen.contains(&ptr) {
                return write!(f, "{{...}}");
            }
            seen.push(ptr);
            let table = t.read();
            write!(f, "{{")?;
            for (i, (key, slot)) in table.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: ", key)?;
                fmt_value(slot, f, seen)?;
            }
            write!(f, "}}")?;
            seen.pop();
            Ok(())
        }
        Value::Function(func) => write!(f, "function {}", func.name),
    }
}

/// Render a number, dropping the fractional suffix for integral values
pub fn format_num(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
