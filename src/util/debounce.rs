use std::hash::Hash;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

/// Default coalescing window for repeated triggers
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

/// Trailing debounce keyed by source.
///
/// Each `trigger` replaces the pending value for its key and restarts that
/// key's timer; `poll` hands back values whose timer ran out. The caller
/// owns the clock, so the event loop ticks it and tests can step it.
#[derive(Debug)]
pub struct Debouncer<K, T> {
    window: Duration,
    pending: IndexMap<K, (Instant, T)>,
}

impl<K: Hash + Eq, T> Debouncer<K, T> {
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            pending: IndexMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn trigger(&mut self, key: K, value: T, now: Instant) {
        self.pending.insert(key, (now + self.window, value));
    }

    /// Drop a pending value without running it.
    pub fn cancel(&mut self, key: &K) -> Option<T> {
        self.pending.shift_remove(key).map(|(_, v)| v)
    }

    /// Take every value whose window has elapsed, in first-trigger order.
    pub fn poll(&mut self, now: Instant) -> Vec<T> {
        let mut ready = Vec::new();
        let mut idx = 0;
        while idx < self.pending.len() {
            let due = self
                .pending
                .get_index(idx)
                .is_some_and(|(_, (deadline, _))| *deadline <= now);
            if due {
                if let Some((_, (_, value))) = self.pending.shift_remove_index(idx) {
                    ready.push(value);
                }
            } else {
                idx += 1;
            }
        }
        ready
    }

    /// When the earliest pending value becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(deadline, _)| *deadline).min()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K: Hash + Eq, T> Default for Debouncer<K, T> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
