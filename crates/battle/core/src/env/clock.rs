//! Timestamp source for battle log entries.
//!
//! The engine never reads the wall clock itself. Log timestamps come from a
//! [`Clock`] supplied by the caller, which keeps resolution deterministic.

use std::sync::atomic::{AtomicU64, Ordering};

/// Supplies the timestamp stamped on each new log entry.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Monotonic counter starting at 1. Deterministic across runs.
#[derive(Debug, Default)]
pub struct LogicalClock {
    ticks: AtomicU64,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes counting after `last`, e.g. the timestamp of the newest entry of
    /// a deserialized log.
    pub fn starting_after(last: u64) -> Self {
        Self {
            ticks: AtomicU64::new(last),
        }
    }
}

impl Clock for LogicalClock {
    fn now(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::Relaxed) + 1
    }
}
