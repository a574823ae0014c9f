//! Soft wall-clock deadline for one `compute_next_action` call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The deadline is computed once at call entry. Passing it never aborts
/// anything by itself; search loops poll `should_stop` and wind down.
#[derive(Clone, Debug)]
pub struct TimeBudget {
    started: Instant,
    total: Duration,
    timeout: Duration,
    cancel: Option<Arc<AtomicBool>>,
}

impl TimeBudget {
    /// `safety_ratio` is the share of `total` the search may spend before
    /// it stops expanding.
    pub fn new(total: Duration, safety_ratio: f64) -> Self {
        let ratio = safety_ratio.clamp(0.0, 1.0);
        Self {
            started: Instant::now(),
            total,
            timeout: total.mul_f64(ratio),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: Option<Arc<AtomicBool>>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the search deadline.
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    /// Time left before the caller's own budget runs out.
    pub fn remaining_total(&self) -> Duration {
        self.total.saturating_sub(self.elapsed())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    pub fn should_stop(&self) -> bool {
        self.elapsed() >= self.timeout || self.is_cancelled()
    }

    /// How many times the elapsed time fits into the deadline, as an
    /// integer ratio. Large while the call is far under budget, `1` once
    /// the deadline is reached.
    pub fn excess_time(&self) -> u64 {
        let timeout = self.timeout.as_nanos().max(1);
        let elapsed = self.elapsed().as_nanos().clamp(1, timeout);
        (timeout / elapsed).min(u64::MAX as u128) as u64
    }
}
