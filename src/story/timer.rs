//! Virtual-clock timers
//!
//! Timers advance only when the host steps the container; pausing freezes
//! the virtual clock without discarding anything. Repeating timers keep the
//! overflow remainder on fire so fractional ticks stay accurate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Timer ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u32);

/// One-shot or repeating
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TimerKind {
    OneShot,
    Repeating {
        /// `None` repeats without bound
        max_fires: Option<u32>,
    },
}

/// A scheduled timer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub id: TimerId,
    pub kind: TimerKind,
    pub delay_ms: f64,
    /// Virtual time accumulated since scheduling (or since the last fire,
    /// for repeating timers). Always `<= delay_ms` right before a fire check.
    pub elapsed_ms: f64,
    pub payload: String,
    pub fired_count: u32,
    /// Creation order, tiebreak for simultaneous fires
    pub seq: u64,
}

/// A timer firing reported from one `step`
#[derive(Clone, Debug, PartialEq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub payload: String,
    /// Fire ordinal for this timer, 1-based
    pub fired_count: u32,
}

/// Owns active timers and the paused flag of the virtual clock
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: IndexMap<TimerId, Timer>,
    next_id: u32,
    next_seq: u64,
    paused: bool,
}

impl TimerManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot timer
    pub fn schedule(&mut self, delay_ms: f64, payload: impl Into<String>) -> TimerId {
        self.insert(TimerKind::OneShot, delay_ms, payload.into())
    }

    /// Schedule a repeating timer; `max_fires` of `None` repeats forever
    pub fn every(
        &mut self,
        delay_ms: f64,
        payload: impl Into<String>,
        max_fires: Option<u32>,
    ) -> TimerId {
        self.insert(TimerKind::Repeating { max_fires }, delay_ms, payload.into())
    }

    fn insert(&mut self, kind: TimerKind, delay_ms: f64, payload: String) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert(
            id,
            Timer {
                id,
                kind,
                delay_ms: delay_ms.max(0.0),
                elapsed_ms: 0.0,
                payload,
                fired_count: 0,
                seq,
            },
        );
        debug!("scheduled timer {:?} ({:?}, {} ms)", id, kind, delay_ms);
        id
    }

    /// Get a timer by id
    pub fn timer(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(&id)
    }

    /// Cancel a timer; returns whether it existed
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.shift_remove(&id).is_some()
    }

    /// Freeze the virtual clock
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unfreeze the virtual clock
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether the clock is frozen
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Active timers in creation order
    pub fn active_timers(&self) -> Vec<&Timer> {
        self.timers.values().collect()
    }

    /// Number of active timers
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Advance the virtual clock by `delta_ms` and collect fired timers in
    /// creation order. While paused nothing advances and nothing fires.
    pub fn step(&mut self, delta_ms: f64) -> Vec<FiredTimer> {
        if self.paused || delta_ms <= 0.0 {
            return Vec::new();
        }

        let mut fired = Vec::new();
        let mut expired = Vec::new();

        for timer in self.timers.values_mut() {
            timer.elapsed_ms += delta_ms;

            loop {
                if timer.elapsed_ms < timer.delay_ms {
                    break;
                }
                timer.fired_count += 1;
                trace!("timer {:?} fired (#{})", timer.id, timer.fired_count);
                fired.push(FiredTimer {
                    id: timer.id,
                    payload: timer.payload.clone(),
                    fired_count: timer.fired_count,
                });

                match timer.kind {
                    TimerKind::OneShot => {
                        expired.push(timer.id);
                        break;
                    }
                    TimerKind::Repeating { max_fires } => {
                        // Keep the overflow remainder, not zero
                        timer.elapsed_ms -= timer.delay_ms;
                        if max_fires.is_some_and(|max| timer.fired_count >= max) {
                            expired.push(timer.id);
                            break;
                        }
                        // A zero-delay repeater fires once per step
                        if timer.delay_ms <= 0.0 {
                            timer.elapsed_ms = 0.0;
                            break;
                        }
                    }
                }
            }
        }

        for id in expired {
            self.timers.shift_remove(&id);
        }

        // The map iterates in insertion order, so simultaneous fires are
        // already reported in creation order
        fired
    }

    /// Remove every timer and unpause
    pub fn clear(&mut self) {
        self.timers.clear();
        self.paused = false;
    }

    pub(crate) fn export(&self) -> (Vec<Timer>, u32, u64, bool) {
        (
            self.timers.values().cloned().collect(),
            self.next_id,
            self.next_seq,
            self.paused,
        )
    }

    pub(crate) fn import(timers: Vec<Timer>, next_id: u32, next_seq: u64, paused: bool) -> Self {
        Self {
            timers: timers.into_iter().map(|t| (t.id, t)).collect(),
            next_id,
            next_seq,
            paused,
        }
    }
}
