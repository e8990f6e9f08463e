//! Wall-clock timestamps for interactive sessions.

use battle_core::Clock;

/// Milliseconds since the Unix epoch.
///
/// Replays and tests keep the engine's deterministic logical clock; only
/// sessions shown to a user stamp log entries with real time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}
