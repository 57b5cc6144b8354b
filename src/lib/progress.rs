//! Progress tracking.
//!
//! A thread-safe counter that logs a line each time the running total
//! crosses an interval boundary. Workers across the pipeline share one
//! tracker through a plain reference; the count is a relaxed atomic.

use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::logging::format_count;

/// Thread-safe interval progress logger.
///
/// ```
/// use linesort_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("sorted lines").with_interval(100);
/// tracker.log_if_needed(250); // logs at 100 and 200
/// tracker.log_final();        // logs "sorted lines 250 (complete)"
/// ```
pub struct ProgressTracker {
    interval: u64,
    message: String,
    count: AtomicU64,
}

impl ProgressTracker {
    /// Create a tracker with a default interval of 10,000.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { interval: 10_000, message: message.into(), count: AtomicU64::new(0) }
    }

    /// Set the logging interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Add `additional` to the count, logging once per interval boundary
    /// crossed. Returns whether the new total sits exactly on a boundary.
    pub fn log_if_needed(&self, additional: u64) -> bool {
        if additional == 0 {
            let count = self.count.load(Ordering::Relaxed);
            return count > 0 && count % self.interval == 0;
        }

        let previous = self.count.fetch_add(additional, Ordering::Relaxed);
        let current = previous + additional;

        for crossed in (previous / self.interval + 1)..=(current / self.interval) {
            info!("{} {}", self.message, format_count(crossed * self.interval));
        }
        current % self.interval == 0
    }

    /// Log the final total unless the last interval log already covered it.
    pub fn log_final(&self) {
        if !self.log_if_needed(0) {
            let count = self.count.load(Ordering::Relaxed);
            if count > 0 {
                info!("{} {} (complete)", self.message, format_count(count));
            }
        }
    }

    /// The current count.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
