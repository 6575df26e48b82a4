//! Per-player mutual exclusion
//!
//! A pull is a load-mutate-store sequence on the player's pity counter. Two
//! sessions for the same player must not interleave that sequence, so every
//! counter key gets its own mutex.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Registry of per-key locks
#[derive(Debug, Default)]
pub struct PlayerLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared registry handle
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Lock handle for `key`, created on first use.
    ///
    /// Callers hold `handle.lock()` for the duration of the critical section.
    pub fn handle(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of keys seen
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
