//! Variable environment
//!
//! One [`Environment`] persists for the lifetime of an engine instance across
//! repeated script submissions, until `reset`. Scoping is deliberately flat
//! (a documented language semantic, not an accident): a function call pushes
//! a frame holding only its parameters; reads walk frames innermost-first and
//! fall back to globals; writes update the scope where the name already
//! exists, otherwise the globals. Assignments inside a function body to
//! non-parameter names are therefore visible to the caller after return.

use std::collections::HashMap;

use crate::runtime::value::Value;

/// Scope chain: global map plus a stack of call frames
#[derive(Debug, Default)]
pub struct Environment {
    globals: HashMap<String, Value>,
    frames: Vec<HashMap<String, Value>>,
}

impl Environment {
    /// Create an empty environment
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a name up, innermost frame first, then globals
    pub fn get(&self, name: &str) -> Option<&Value> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.get(name) {
                return Some(value);
            }
        }
        self.globals.get(name)
    }

    /// Assign a name: update the scope that already holds it, else write
    /// to globals (flat-environment policy)
    pub fn set(&mut self, name: &str, value: Value) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.globals.insert(name.to_string(), value);
    }

    /// Write directly into the global scope
    #[inline]
    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Push a call frame holding the given bindings (parameters)
    #[inline]
    pub fn push_frame(&mut self, bindings: HashMap<String, Value>) {
        self.frames.push(bindings);
    }

    /// Pop the innermost call frame
    #[inline]
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Current call depth (number of live frames)
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Remove a name from the global scope
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.globals.remove(name)
    }

    /// Snapshot of the global scope
    pub fn globals(&self) -> HashMap<String, Value> {
        self.globals.clone()
    }

    /// Clear everything, frames included
    pub fn clear(&mut self) {
        self.globals.clear();
        self.frames.clear();
    }
}
