//! Story container
//!
//! Composes the script engine, thread scheduler, timers, lists, passage
//! registry, and effect queues behind per-feature enable flags. All state is
//! scoped to the instance; the host drives it with `step(delta_ms, executor)`
//! and may serialize it between steps.

use tracing::{debug, info};

use crate::runtime::extfunc::{ExternalFunctionRegistry, SharedExternals};
use crate::runtime::value::Value;

use super::effect::EffectManager;
use super::list::ListManager;
use super::passage::PassageRegistry;
use super::snapshot::{ContainerSnapshot, ThreadSnapshot, TimerSnapshot};
use super::thread::{StoryThread, ThreadManager, ThreadStepResult};
use super::timer::{FiredTimer, TimerManager};

/// Container error
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("feature `{0}` is disabled for this container")]
    FeatureDisabled(&'static str),
    #[error("no registered function named `{0}`")]
    UnknownFunction(String),
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-feature enable flags; `Default` enables everything
#[derive(Clone, Copy, Debug)]
pub struct FeatureConfig {
    pub threads: bool,
    pub timers: bool,
    pub externals: bool,
    pub lists: bool,
    pub text_effects: bool,
    pub audio_effects: bool,
    pub parameterized_passages: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            threads: true,
            timers: true,
            externals: true,
            lists: true,
            text_effects: true,
            audio_effects: true,
            parameterized_passages: true,
        }
    }
}

/// What happened during one `step`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepResult {
    pub thread_results: Vec<ThreadStepResult>,
    pub fired_timers: Vec<FiredTimer>,
}

/// One running story: subsystems composed behind feature flags
pub struct StoryContainer {
    config: FeatureConfig,
    threads: Option<ThreadManager>,
    timers: Option<TimerManager>,
    lists: Option<ListManager>,
    passages: Option<PassageRegistry>,
    effects: Option<EffectManager>,
    externals: SharedExternals,
    paused: bool,
}

impl Default for StoryContainer {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl StoryContainer {
    /// Build a container with the given feature set
    pub fn new(config: FeatureConfig) -> Self {
        info!("story container created");
        Self {
            config,
            threads: config.threads.then(ThreadManager::new),
            timers: config.timers.then(TimerManager::new),
            lists: config.lists.then(ListManager::new),
            passages: config.parameterized_passages.then(PassageRegistry::new),
            effects: (config.text_effects || config.audio_effects).then(EffectManager::new),
            externals: ExternalFunctionRegistry::shared(),
            paused: false,
        }
    }

    /// The feature set this container was built with
    pub fn config(&self) -> FeatureConfig {
        self.config
    }

    /// Shared handle to the host-function registry. Engines built with
    /// [`ScriptEngine::with_externals`](crate::runtime::eval::ScriptEngine::with_externals)
    /// on this handle see every function registered on the container.
    pub fn externals(&self) -> SharedExternals {
        SharedExternals::clone(&self.externals)
    }

    /// Thread manager
    pub fn threads(&self) -> Result<&ThreadManager, ContainerError> {
        self.threads
            .as_ref()
            .ok_or(ContainerError::FeatureDisabled("threads"))
    }

    /// Thread manager, mutable
    pub fn threads_mut(&mut self) -> Result<&mut ThreadManager, ContainerError> {
        self.threads
            .as_mut()
            .ok_or(ContainerError::FeatureDisabled("threads"))
    }

    /// Thread manager, or `None` when disabled
    pub fn threads_or_null(&self) -> Option<&ThreadManager> {
        self.threads.as_ref()
    }

    /// Timer manager
    pub fn timers(&self) -> Result<&TimerManager, ContainerError> {
        self.timers
            .as_ref()
            .ok_or(ContainerError::FeatureDisabled("timers"))
    }

    /// Timer manager, mutable
    pub fn timers_mut(&mut self) -> Result<&mut TimerManager, ContainerError> {
        self.timers
            .as_mut()
            .ok_or(ContainerError::FeatureDisabled("timers"))
    }

    /// Timer manager, or `None` when disabled
    pub fn timers_or_null(&self) -> Option<&TimerManager> {
        self.timers.as_ref()
    }

    /// List manager
    pub fn lists(&self) -> Result<&ListManager, ContainerError> {
        self.lists
            .as_ref()
            .ok_or(ContainerError::FeatureDisabled("lists"))
    }

    /// List manager, mutable
    pub fn lists_mut(&mut self) -> Result<&mut ListManager, ContainerError> {
        self.lists
            .as_mut()
            .ok_or(ContainerError::FeatureDisabled("lists"))
    }

    /// List manager, or `None` when disabled
    pub fn lists_or_null(&self) -> Option<&ListManager> {
        self.lists.as_ref()
    }

    /// Passage registry
    pub fn passages(&self) -> Result<&PassageRegistry, ContainerError> {
        self.passages
            .as_ref()
            .ok_or(ContainerError::FeatureDisabled("parameterized_passages"))
    }

    /// Passage registry, mutable
    pub fn passages_mut(&mut self) -> Result<&mut PassageRegistry, ContainerError> {
        self.passages
            .as_mut()
            .ok_or(ContainerError::FeatureDisabled("parameterized_passages"))
    }

    /// Passage registry, or `None` when disabled
    pub fn passages_or_null(&self) -> Option<&PassageRegistry> {
        self.passages.as_ref()
    }

    /// Effect manager
    pub fn effects(&self) -> Result<&EffectManager, ContainerError> {
        self.effects
            .as_ref()
            .ok_or(ContainerError::FeatureDisabled("effects"))
    }

    /// Effect manager, mutable
    pub fn effects_mut(&mut self) -> Result<&mut EffectManager, ContainerError> {
        self.effects
            .as_mut()
            .ok_or(ContainerError::FeatureDisabled("effects"))
    }

    /// Effect manager, or `None` when disabled
    pub fn effects_or_null(&self) -> Option<&EffectManager> {
        self.effects.as_ref()
    }

    /// Register a host function callable from scripts and `call_function`
    pub fn register_function(
        &mut self,
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Result<(), ContainerError> {
        if !self.config.externals {
            return Err(ContainerError::FeatureDisabled("externals"));
        }
        let name = name.into();
        debug!("registered host function `{}`", name);
        self.externals.write().register(name, func);
        Ok(())
    }

    /// Call a registered host function directly
    pub fn call_function(&self, name: &str, args: &[Value]) -> Result<Value, ContainerError> {
        if !self.config.externals {
            return Err(ContainerError::FeatureDisabled("externals"));
        }
        let func = self
            .externals
            .read()
            .get(name)
            .ok_or_else(|| ContainerError::UnknownFunction(name.to_string()))?;
        Ok(func(args))
    }

    /// Advance the container by one tick: timers first, then threads, each
    /// executor call completing before the next. While paused nothing moves.
    pub fn step(
        &mut self,
        delta_ms: f64,
        executor: &mut dyn FnMut(&StoryThread, f64) -> ThreadStepResult,
    ) -> StepResult {
        if self.paused {
            return StepResult::default();
        }

        let fired_timers = match self.timers.as_mut() {
            Some(timers) => timers.step(delta_ms),
            None => Vec::new(),
        };
        let thread_results = match self.threads.as_mut() {
            Some(threads) => threads.step_all(delta_ms, executor),
            None => Vec::new(),
        };

        StepResult {
            thread_results,
            fired_timers,
        }
    }

    /// Freeze the container: steps become no-ops and the timer clock stops
    pub fn pause(&mut self) {
        self.paused = true;
        if let Some(timers) = self.timers.as_mut() {
            timers.pause();
        }
    }

    /// Unfreeze the container
    pub fn resume(&mut self) {
        self.paused = false;
        if let Some(timers) = self.timers.as_mut() {
            timers.resume();
        }
    }

    /// Whether the container is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// A story is complete when no thread is running and no timer is active.
    /// Disabled subsystems count as empty.
    pub fn is_complete(&self) -> bool {
        let running = self
            .threads
            .as_ref()
            .map_or(0, ThreadManager::running_count);
        let timers = self.timers.as_ref().map_or(0, TimerManager::active_count);
        running == 0 && timers == 0
    }

    /// Clear every enabled subsystem and unpause; the feature set and
    /// registered host functions are kept
    pub fn reset(&mut self) {
        info!("story container reset");
        if let Some(threads) = self.threads.as_mut() {
            threads.clear();
        }
        if let Some(timers) = self.timers.as_mut() {
            timers.clear();
        }
        if let Some(lists) = self.lists.as_mut() {
            lists.clear();
        }
        if let Some(passages) = self.passages.as_mut() {
            passages.clear();
        }
        if let Some(effects) = self.effects.as_mut() {
            effects.clear();
        }
        self.paused = false;
    }

    /// Capture thread, timer, and list state. Effects and host functions are
    /// transient and are not captured.
    pub fn snapshot(&self) -> ContainerSnapshot {
        let threads = self.threads.as_ref().map(|m| {
            let (threads, next_id, next_seq, main_assigned) = m.export();
            ThreadSnapshot {
                threads,
                next_id,
                next_seq,
                main_assigned,
            }
        });
        let timers = self.timers.as_ref().map(|m| {
            let (timers, next_id, next_seq, paused) = m.export();
            TimerSnapshot {
                timers,
                next_id,
                next_seq,
                paused,
            }
        });
        let lists = self.lists.as_ref().map(ListManager::export);
        ContainerSnapshot {
            threads,
            timers,
            lists,
            paused: self.paused,
        }
    }

    /// Replace thread, timer, and list state from a snapshot. Subsystems the
    /// snapshot lacks are cleared; disabled subsystems ignore snapshot data.
    pub fn restore(&mut self, snapshot: ContainerSnapshot) {
        if self.config.threads {
            self.threads = Some(match snapshot.threads {
                Some(s) => ThreadManager::import(s.threads, s.next_id, s.next_seq, s.main_assigned),
                None => ThreadManager::new(),
            });
        }
        if self.config.timers {
            self.timers = Some(match snapshot.timers {
                Some(s) => TimerManager::import(s.timers, s.next_id, s.next_seq, s.paused),
                None => TimerManager::new(),
            });
        }
        if self.config.lists {
            self.lists = Some(match snapshot.lists {
                Some(lists) => ListManager::import(lists),
                None => ListManager::new(),
            });
        }
        self.paused = snapshot.paused;
        debug!("story container restored from snapshot");
    }

    /// Snapshot as a JSON string
    pub fn to_json(&self) -> Result<String, ContainerError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Restore from a JSON snapshot
    pub fn from_json(&mut self, json: &str) -> Result<(), ContainerError> {
        let snapshot: ContainerSnapshot = serde_json::from_str(json)?;
        self.restore(snapshot);
        Ok(())
    }
}
