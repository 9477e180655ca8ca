//! Story container subsystems
//!
//! Cooperative threads, virtual-clock timers, finite-domain lists,
//! parameterized passages, and effect intents, composed by [`StoryContainer`]
//! behind per-feature enable flags.

pub mod container;
pub mod effect;
pub mod list;
pub mod passage;
pub mod snapshot;
pub mod thread;
pub mod timer;

pub use container::{ContainerError, FeatureConfig, StepResult, StoryContainer};
pub use snapshot::ContainerSnapshot;
