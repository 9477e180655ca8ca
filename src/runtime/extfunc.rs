//! External function registry
//!
//! Bridges host-native callables into script evaluation. The registry is
//! owned per engine/container instance (no process-wide singleton) and shared
//! between the two through [`SharedExternals`]. Calls are synchronous with
//! positional arguments; the return value flows back into the script.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::runtime::value::Value;

/// Host-native callable
pub type ExternalFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Registry shared between an engine and its container
pub type SharedExternals = Arc<RwLock<ExternalFunctionRegistry>>;

/// External function registry
#[derive(Default)]
pub struct ExternalFunctionRegistry {
    functions: HashMap<String, ExternalFn>,
}

impl ExternalFunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty shared registry
    pub fn shared() -> SharedExternals {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Register a host function, replacing any previous binding of the name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) {
        self.functions.insert(name.into(), Arc::new(func));
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<ExternalFn> {
        self.functions.get(name).cloned()
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, in no particular order
    pub fn names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    /// Remove every registration
    pub fn clear(&mut self) {
        self.functions.clear();
    }
}

impl std::fmt::Debug for ExternalFunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalFunctionRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}
