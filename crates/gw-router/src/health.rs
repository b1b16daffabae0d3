//! Sliding-window provider health ledger.
//!
//! One tracker per router. Every operation takes the same lock, so the
//! append-then-trim in [`HealthTracker::record`] is atomic with respect to
//! concurrent readers, writers and resets. Nothing here ever awaits while
//! holding the lock.

use gw_core::{HealthCheckConfig, HealthStatus, RouterProvider};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// Millisecond time source.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock (UTC epoch millis).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy)]
struct HealthEntry {
    timestamp: i64,
    success: bool,
}

pub struct HealthTracker {
    entries: Mutex<BTreeMap<RouterProvider, VecDeque<HealthEntry>>>,
    window_size_ms: i64,
    max_window_entries: usize,
    failure_threshold: f64,
    clock: Arc<dyn Clock>,
}

impl HealthTracker {
    pub fn new(config: &HealthCheckConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &HealthCheckConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            window_size_ms: i64::try_from(config.window_size_ms).unwrap_or(i64::MAX),
            max_window_entries: config.max_window_entries,
            failure_threshold: config.failure_threshold,
            clock,
        }
    }

    /// Append an outcome; evicts oldest entries beyond `max_window_entries`.
    pub fn record(&self, provider: RouterProvider, success: bool) {
        let timestamp = self.clock.now_ms();
        let mut entries = self.entries.lock();
        let list = entries.entry(provider).or_default();
        list.push_back(HealthEntry { timestamp, success });
        while list.len() > self.max_window_entries {
            list.pop_front();
        }
    }

    pub fn status(&self, provider: RouterProvider) -> HealthStatus {
        let now = self.clock.now_ms();
        let entries = self.entries.lock();
        self.compute_status(provider, entries.get(&provider), now)
    }

    /// Status for every provider with at least one recorded entry.
    pub fn all_statuses(&self) -> BTreeMap<RouterProvider, HealthStatus> {
        let now = self.clock.now_ms();
        let entries = self.entries.lock();
        entries
            .iter()
            .map(|(provider, list)| (*provider, self.compute_status(*provider, Some(list), now)))
            .collect()
    }

    /// Clear one provider's history, or everything when `None`.
    pub fn reset(&self, provider: Option<RouterProvider>) {
        {
            let mut entries = self.entries.lock();
            match provider {
                Some(p) => {
                    entries.remove(&p);
                }
                None => entries.clear(),
            }
        }
        tracing::info!(provider = ?provider, "health history reset");
    }

    fn compute_status(&self, provider: RouterProvider, list: Option<&VecDeque<HealthEntry>>, now: i64) -> HealthStatus {
        let Some(list) = list.filter(|l| !l.is_empty()) else {
            return HealthStatus { provider, healthy: true, success_rate: 1.0, total_requests: 0, window_start: now };
        };

        let cutoff = now.saturating_sub(self.window_size_ms);
        let mut total = 0usize;
        let mut successes = 0usize;
        let mut window_start = None;
        for e in list.iter().filter(|e| e.timestamp >= cutoff && e.timestamp <= now) {
            window_start.get_or_insert(e.timestamp);
            total += 1;
            if e.success {
                successes += 1;
            }
        }

        if total == 0 {
            return HealthStatus { provider, healthy: true, success_rate: 1.0, total_requests: 0, window_start: cutoff };
        }

        let success_rate = successes as f64 / total as f64;
        // Strict: a failure rate equal to the threshold is unhealthy.
        let healthy = (1.0 - success_rate) < self.failure_threshold;
        HealthStatus {
            provider,
            healthy,
            success_rate,
            total_requests: total,
            window_start: window_start.unwrap_or(cutoff),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new(&HealthCheckConfig::default())
    }
}
