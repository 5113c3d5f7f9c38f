//! Per-caller sliding-window rate limiting.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Idle callers are swept on every `PURGE_EVERY`th check.
const PURGE_EVERY: u64 = 256;

/// Admits at most `max_requests` per caller key within any `window`.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: DashMap<String, VecDeque<Instant>>,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests as usize,
            window,
            hits: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    /// Records a request for `key`; `false` means it must be rejected.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        // Must run before the entry guard below is taken.
        if self.checks.fetch_add(1, Ordering::Relaxed) % PURGE_EVERY == PURGE_EVERY - 1 {
            self.purge_idle(now);
        }
        let mut hits = self.hits.entry(key.to_owned()).or_default();
        while let Some(&oldest) = hits.front() {
            if now.saturating_duration_since(oldest) < self.window {
                break;
            }
            hits.pop_front();
        }
        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push_back(now);
        true
    }

    /// Forgets callers with no request inside the window.
    fn purge_idle(&self, now: Instant) {
        self.hits.retain(|_, hits| {
            hits.back()
                .is_some_and(|&last| now.saturating_duration_since(last) < self.window)
        });
    }

    #[cfg(test)]
    fn tracked_callers(&self) -> usize {
        self.hits.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}
