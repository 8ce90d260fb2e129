//! Timestamp-based file naming.
//!
//! Uploads and outputs are named by a millisecond timestamp. The generator
//! never hands out the same value twice within a process: when two requests
//! land in the same millisecond the second gets `last + 1`. Processes sharing
//! a directory can still collide.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Monotonic millisecond stamp source.
#[derive(Debug, Default)]
pub struct StampGenerator {
    last: AtomicI64,
}

impl StampGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique stamp, `max(now_ms, last + 1)`.
    pub fn next(&self) -> i64 {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_ms: i64) -> i64 {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_ms.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}
