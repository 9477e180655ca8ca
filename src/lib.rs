//! Weft Narrative Scripting Runtime
//!
//! An embeddable, tree-walking script interpreter composed with a cooperative
//! story container: narrative threads, virtual-clock timers, finite-domain
//! state lists and parameterized passage templates, with full snapshot
//! serialization for save/restore.
//!
//! # Example
//!
//! ```
//! use weft::runtime::eval::ScriptEngine;
//!
//! let mut engine = ScriptEngine::new();
//! let outcome = engine.execute("total = 0 for i = 1, 10 do total = total + i end");
//! assert!(outcome.success);
//! ```

#![doc(html_root_url = "https://docs.rs/weft")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod runtime;
pub mod script;
pub mod story;

// Utility modules
pub mod util;

// Re-exports
pub use runtime::eval::{ExecOutcome, ScriptEngine};
pub use runtime::value::Value;
pub use story::container::{FeatureConfig, StepResult, StoryContainer};

/// Runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime name
pub const NAME: &str = "Weft";
