//! Cooperative narrative threads
//!
//! A "thread" here is a bookkeeping entry for one active narrative branch,
//! not an OS thread. All threads advance synchronously inside `step_all`;
//! exactly one executor callback runs at a time, so there is no preemption
//! and no host-visible data race.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Thread ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub u32);

/// Thread lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadState {
    Running,
    Waiting,
    Completed,
}

/// One cooperative narrative thread
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryThread {
    /// Thread ID
    pub id: ThreadId,
    /// Passage this thread is executing
    pub passage: String,
    /// Non-owning back-reference to the spawning thread. Resolved lazily by
    /// lookup; a parent that has since been destroyed reads as "no parent".
    pub parent: Option<ThreadId>,
    /// Scheduling priority (higher steps first)
    pub priority: i32,
    /// Lifecycle state
    pub state: ThreadState,
    /// Whether this is the main thread (the first created)
    pub is_main: bool,
    /// Creation order, tiebreak for equal priorities
    pub seq: u64,
}

/// Result of stepping one thread, produced by the host executor
#[derive(Clone, Debug, PartialEq)]
pub struct ThreadStepResult {
    pub thread_id: ThreadId,
    pub state: ThreadState,
}

/// Owns the set of cooperative threads; advanced one tick at a time
#[derive(Debug, Default)]
pub struct ThreadManager {
    threads: IndexMap<ThreadId, StoryThread>,
    next_id: u32,
    next_seq: u64,
    main_assigned: bool,
}

impl ThreadManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a thread. The first thread created becomes the main thread.
    pub fn create_thread(&mut self, passage: impl Into<String>) -> ThreadId {
        let is_main = !self.main_assigned;
        self.main_assigned = true;
        let id = self.insert(passage.into(), None, 0, is_main);
        debug!("created thread {:?} (main: {})", id, is_main);
        id
    }

    /// Spawn a child thread. Returns `None` if `parent` does not resolve to
    /// a currently-tracked thread.
    pub fn spawn_thread(
        &mut self,
        passage: impl Into<String>,
        parent: ThreadId,
        priority: i32,
    ) -> Option<ThreadId> {
        if !self.threads.contains_key(&parent) {
            debug!("spawn rejected: unknown parent {:?}", parent);
            return None;
        }
        let id = self.insert(passage.into(), Some(parent), priority, false);
        debug!("spawned thread {:?} from {:?}", id, parent);
        Some(id)
    }

    fn insert(
        &mut self,
        passage: String,
        parent: Option<ThreadId>,
        priority: i32,
        is_main: bool,
    ) -> ThreadId {
        let id = ThreadId(self.next_id);
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.threads.insert(
            id,
            StoryThread {
                id,
                passage,
                parent,
                priority,
                state: ThreadState::Running,
                is_main,
                seq,
            },
        );
        id
    }

    /// Transition a thread to `Completed`. Idempotent; unknown ids are ignored.
    pub fn complete_thread(&mut self, id: ThreadId) {
        if let Some(thread) = self.threads.get_mut(&id) {
            thread.state = ThreadState::Completed;
        }
    }

    /// Set a thread's state directly
    pub fn set_state(&mut self, id: ThreadId, state: ThreadState) {
        if let Some(thread) = self.threads.get_mut(&id) {
            thread.state = state;
        }
    }

    /// Get a thread by id
    pub fn thread(&self, id: ThreadId) -> Option<&StoryThread> {
        self.threads.get(&id)
    }

    /// Resolve a thread's parent, treating a missing parent as none
    pub fn parent_of(&self, id: ThreadId) -> Option<&StoryThread> {
        let parent_id = self.threads.get(&id)?.parent?;
        self.threads.get(&parent_id)
    }

    /// All threads, in creation order
    pub fn all_threads(&self) -> Vec<&StoryThread> {
        self.threads.values().collect()
    }

    /// Number of threads in `Running` state
    pub fn running_count(&self) -> usize {
        self.threads
            .values()
            .filter(|t| t.state == ThreadState::Running)
            .count()
    }

    /// Remove a thread entirely (reaping)
    pub fn remove_thread(&mut self, id: ThreadId) -> Option<StoryThread> {
        self.threads.shift_remove(&id)
    }

    /// Step every running thread: priority descending, creation order as
    /// tiebreak. Each executor call completes before the next begins; the
    /// returned state is applied immediately after the call.
    pub fn step_all(
        &mut self,
        delta_ms: f64,
        executor: &mut dyn FnMut(&StoryThread, f64) -> ThreadStepResult,
    ) -> Vec<ThreadStepResult> {
        // Threads that finished on an earlier tick are reaped now, so a host
        // can still inspect a just-completed thread between steps.
        let before = self.threads.len();
        self.threads.retain(|_, t| t.state != ThreadState::Completed);
        let reaped = before - self.threads.len();
        if reaped > 0 {
            debug!("reaped {} completed thread(s)", reaped);
        }

        let mut order: Vec<ThreadId> = self
            .threads
            .values()
            .filter(|t| t.state == ThreadState::Running)
            .map(|t| t.id)
            .collect();
        order.sort_by_key(|id| {
            let t = &self.threads[id];
            (std::cmp::Reverse(t.priority), t.seq)
        });

        let mut results = Vec::with_capacity(order.len());
        for id in order {
            // A previous result this tick may have stopped the thread
            let thread = match self.threads.get(&id) {
                Some(t) if t.state == ThreadState::Running => t.clone(),
                _ => continue,
            };
            trace!("stepping thread {:?} ({} ms)", id, delta_ms);
            let result = executor(&thread, delta_ms);
            if let Some(entry) = self.threads.get_mut(&result.thread_id) {
                entry.state = result.state;
            }
            results.push(result);
        }
        results
    }

    /// Remove every thread and allow a new main to be created
    pub fn clear(&mut self) {
        self.threads.clear();
        self.main_assigned = false;
    }

    pub(crate) fn export(&self) -> (Vec<StoryThread>, u32, u64, bool) {
        (
            self.threads.values().cloned().collect(),
            self.next_id,
            self.next_seq,
            self.main_assigned,
        )
    }

    pub(crate) fn import(
        threads: Vec<StoryThread>,
        next_id: u32,
        next_seq: u64,
        main_assigned: bool,
    ) -> Self {
        Self {
            threads: threads.into_iter().map(|t| (t.id, t)).collect(),
            next_id,
            next_seq,
            main_assigned,
        }
    }
}
