//! Reconnect Policy - Backoff-then-Fallback State Machine
//!
//! Pure decision logic for the remote feed's recovery behavior:
//! exponential backoff per consecutive transport error, and a
//! permanent switch to REST polling once the attempt cap is
//! exhausted. Kept free of I/O so the cap and delay schedule are
//! testable without a socket.

use std::time::Duration;

/// What the feed should do after a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Sleep this long, then attempt the push feed again.
    Retry(Duration),
    /// The cap is exhausted: switch to polling, permanently.
    FallBack,
}

/// Tracks consecutive transport errors and produces the next action.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    multiplier: f64,
    max_attempts: u32,
    /// Consecutive failures since the last successful connection.
    failures: u32,
    /// Once true, never retries the push feed again.
    exhausted: bool,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, multiplier: f64, max_attempts: u32) -> Self {
        Self {
            base_delay,
            multiplier,
            max_attempts,
            failures: 0,
            exhausted: false,
        }
    }

    /// Record a transport error and decide the next step.
    ///
    /// The nth consecutive failure (n < cap) retries after
    /// `base * multiplier^(n-1)`; the cap-th failure falls back.
    /// Once exhausted, every further call returns `FallBack`.
    pub fn record_failure(&mut self) -> FailureAction {
        if self.exhausted {
            return FailureAction::FallBack;
        }

        self.failures += 1;
        if self.failures >= self.max_attempts {
            self.exhausted = true;
            return FailureAction::FallBack;
        }

        let factor = self.multiplier.powi(i32::try_from(self.failures - 1).unwrap_or(i32::MAX));
        FailureAction::Retry(self.base_delay.mul_f64(factor))
    }

    /// Record a successful connection: the failure run is broken.
    /// Has no effect once exhausted.
    pub fn record_success(&mut self) {
        if !self.exhausted {
            self.failures = 0;
        }
    }

    /// Whether the push feed has been abandoned for good.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
