use std::sync::atomic::{AtomicI64, Ordering};

/// Limits upstream refresh attempts to at most one per cooldown window.
///
/// The fast path is a plain atomic read. A caller that sees an expired
/// cooldown must win its exclusive section, re-check, and `stamp` before
/// refreshing; losers fall through with the stored data. Construction primes
/// the gate far in the past so the first check is due immediately.
pub(crate) struct RefreshGate {
    cooldown_ms: i64,
    last_refresh_ms: AtomicI64,
}

impl RefreshGate {
    pub(crate) fn new(cooldown_ms: i64) -> Self {
        Self {
            cooldown_ms,
            last_refresh_ms: AtomicI64::new(i64::MIN),
        }
    }

    pub(crate) fn is_due(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.last_refresh_ms.load(Ordering::Acquire)) > self.cooldown_ms
    }

    pub(crate) fn stamp(&self, now_ms: i64) {
        self.last_refresh_ms.store(now_ms, Ordering::Release);
    }
}
