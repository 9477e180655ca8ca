//! Container snapshots
//!
//! A snapshot captures thread, timer, and list records plus the allocator
//! counters, enough to reconstruct scheduling and list queries identically
//! after restore. Effect queues and script variables are transient and are
//! not captured.

use serde::{Deserialize, Serialize};

use super::list::NamedList;
use super::thread::StoryThread;
use super::timer::Timer;

/// Thread-manager state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub threads: Vec<StoryThread>,
    pub next_id: u32,
    pub next_seq: u64,
    pub main_assigned: bool,
}

/// Timer-manager state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub timers: Vec<Timer>,
    pub next_id: u32,
    pub next_seq: u64,
    pub paused: bool,
}

/// Full container state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// Present when the threads feature is enabled
    pub threads: Option<ThreadSnapshot>,
    /// Present when the timers feature is enabled
    pub timers: Option<TimerSnapshot>,
    /// Present when the lists feature is enabled
    pub lists: Option<Vec<NamedList>>,
    /// Container-wide paused flag
    pub paused: bool,
}
