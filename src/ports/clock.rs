//! Clock Port - Injectable Time Source
//!
//! Abstracts wall-clock access so the notification ledger and tick
//! pipeline can be driven by a fixed clock in tests instead of
//! `Utc::now()`. Timer scheduling stays on `tokio::time`, which the
//! test suite pauses via `start_paused`.

use chrono::Utc;

/// Source of current time in Unix milliseconds.
pub trait Clock: Send + Sync + 'static {
    /// Current time as Unix milliseconds.
    fn now_ms(&self) -> u64;
}

/// Production clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}
