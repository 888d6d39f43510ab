//! Fixed-window request rate limiting keyed by client identity.
//!
//! The store is behind a trait so a shared backend (e.g. Redis with atomic
//! increment-and-expire) can be injected for multi-instance deployments. The
//! bundled in-memory implementation is single-instance only: counters live in
//! process memory and vanish on restart.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of accounting one request against a client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Under the cap; `remaining` requests left in the current window.
    Allowed { remaining: u32 },
    /// Over the cap; retry once the window resets.
    Limited { retry_after_secs: u64 },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Counter store contract: one atomic increment per request.
pub trait RateLimitStore: Send + Sync {
    /// Record a hit for `key` and decide whether it stays under `limit`
    /// within the current fixed window.
    fn hit(&self, key: &str, limit: u32, window: Duration) -> Decision;
}

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// In-memory fixed-window store.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    fn hit(&self, key: &str, limit: u32, window: Duration) -> Decision {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        // Window expired: start a fresh one
        if now.duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        if entry.count > limit {
            let elapsed = now.duration_since(entry.window_start);
            let retry_after = window.saturating_sub(elapsed);
            Decision::Limited {
                retry_after_secs: retry_after.as_secs().max(1),
            }
        } else {
            Decision::Allowed {
                remaining: limit - entry.count,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::from_secs(60);

        for expected_remaining in (0..3).rev() {
            match store.hit("client-a", 3, window) {
                Decision::Allowed { remaining } => assert_eq!(remaining, expected_remaining),
                Decision::Limited { .. } => panic!("should still be under the cap"),
            }
        }
    }

    #[test]
    fn test_rejects_over_limit_with_retry_after() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::from_secs(60);

        for _ in 0..2 {
            assert!(store.hit("client-b", 2, window).is_allowed());
        }

        match store.hit("client-b", 2, window) {
            Decision::Limited { retry_after_secs } => {
                assert!(retry_after_secs >= 1);
                assert!(retry_after_secs <= 60);
            }
            Decision::Allowed { .. } => panic!("should be limited"),
        }
    }

    #[test]
    fn test_keys_are_independent() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::from_secs(60);

        assert!(store.hit("client-c", 1, window).is_allowed());
        assert!(!store.hit("client-c", 1, window).is_allowed());

        // A different client is unaffected
        assert!(store.hit("client-d", 1, window).is_allowed());
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::from_millis(50);

        assert!(store.hit("client-e", 1, window).is_allowed());
        assert!(!store.hit("client-e", 1, window).is_allowed());

        std::thread::sleep(Duration::from_millis(60));

        assert!(store.hit("client-e", 1, window).is_allowed());
    }
}
