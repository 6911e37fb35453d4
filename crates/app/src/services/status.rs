use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use folio_core::{ActivitySnapshot, build_snapshot};
use upstream::ActivitySource;

use crate::services::gate::RefreshGate;

/// Stale-while-refresh cache for the live coding status.
///
/// Readers always receive the stored snapshot immediately; at most one
/// reader per cooldown window performs the two upstream calls and swaps a
/// fully-built snapshot in. Upstream failures never reach the caller: the
/// refresh logs them and keeps the previous snapshot.
pub struct StatusCache<S> {
    source: S,
    gate: RefreshGate,
    refresh_lock: Mutex<()>,
    snapshot: RwLock<ActivitySnapshot>,
    activity_window_seconds: f64,
}

impl<S: ActivitySource> StatusCache<S> {
    pub fn new(source: S, cooldown_ms: i64, activity_window_seconds: f64) -> Self {
        Self {
            source,
            gate: RefreshGate::new(cooldown_ms),
            refresh_lock: Mutex::new(()),
            snapshot: RwLock::new(ActivitySnapshot::default()),
            activity_window_seconds,
        }
    }

    /// Current snapshot, refreshing first when the cooldown has expired.
    /// Readers that do not win the refresh race return the stored snapshot
    /// without waiting on the winner's network calls.
    pub async fn current(&self) -> ActivitySnapshot {
        let now_ms = Utc::now().timestamp_millis();
        if self.gate.is_due(now_ms) {
            if let Ok(_guard) = self.refresh_lock.try_lock() {
                if self.gate.is_due(now_ms) {
                    // Stamp before the calls: a failing upstream is retried
                    // once per cooldown, not on every request.
                    self.gate.stamp(now_ms);
                    self.refresh(now_ms as f64 / 1000.0).await;
                }
            }
        }
        self.snapshot.read().await.clone()
    }

    async fn refresh(&self, now_seconds: f64) {
        let heartbeat = self.source.latest_heartbeat().await;
        let summary = self.source.today_summary().await;
        if let Err(err) = &heartbeat {
            warn!(error = %err, "heartbeat fetch failed");
        }
        if let Err(err) = &summary {
            warn!(error = %err, "daily summary fetch failed");
        }
        if heartbeat.is_err() && summary.is_err() {
            return;
        }
        let heartbeat = heartbeat.ok().flatten();
        let summary = summary.ok().flatten();
        let next = build_snapshot(
            heartbeat.as_ref(),
            summary.as_ref(),
            now_seconds,
            self.activity_window_seconds,
        );
        *self.snapshot.write().await = next;
    }

    #[cfg(test)]
    fn force_due(&self) {
        self.gate.stamp(i64::MIN);
    }
}
