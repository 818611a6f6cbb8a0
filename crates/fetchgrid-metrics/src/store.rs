//! Aggregate store — per-hostname attempt/success counters.
//!
//! A single mutex guards the whole map. Probe tasks hold it only for
//! the increment, which is negligible next to a polling cycle.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

/// Cumulative counters for one hostname bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostCounters {
    /// Probes issued against this host since startup.
    pub attempts: u64,
    /// Probes that came back UP. Never exceeds `attempts`.
    pub successes: u64,
}

impl HostCounters {
    fn record(&mut self, success: bool) {
        self.attempts += 1;
        if success {
            self.successes += 1;
        }
    }

    /// Availability as a whole percentage, rounded half away from zero.
    ///
    /// Returns 0 when nothing has been attempted yet.
    pub fn uptime_percent(&self) -> u32 {
        if self.attempts == 0 {
            return 0;
        }
        let successes = u128::from(self.successes);
        let attempts = u128::from(self.attempts);
        // round(100 * s / a) == floor((200 * s + a) / (2 * a)) for s, a >= 0
        ((200 * successes + attempts) / (2 * attempts)) as u32
    }
}

/// Point-in-time copy of every bucket, ordered by hostname.
pub type Snapshot = BTreeMap<String, HostCounters>;

/// Thread-safe mapping of hostname → [`HostCounters`].
///
/// Cheap to clone; clones share the same buckets.
#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    hosts: Arc<Mutex<HashMap<String, HostCounters>>>,
}

impl AggregateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a zeroed bucket for each hostname.
    ///
    /// Duplicate hostnames collapse into one bucket.
    pub fn with_hosts<I, S>(hostnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hosts = hostnames
            .into_iter()
            .map(|h| (h.into(), HostCounters::default()))
            .collect();
        Self {
            hosts: Arc::new(Mutex::new(hosts)),
        }
    }

    /// Count one attempt for `hostname`, and one success if `success`.
    ///
    /// Safe to call from any number of concurrent tasks.
    pub async fn record_attempt(&self, hostname: &str, success: bool) {
        let mut hosts = self.hosts.lock().await;
        if let Some(counters) = hosts.get_mut(hostname) {
            counters.record(success);
            return;
        }

        debug!(%hostname, "recording attempt for unregistered host");
        hosts
            .entry(hostname.to_string())
            .or_default()
            .record(success);
    }

    /// Counters for one hostname, if tracked.
    pub async fn counters(&self, hostname: &str) -> Option<HostCounters> {
        let hosts = self.hosts.lock().await;
        hosts.get(hostname).copied()
    }

    /// Rounded availability for `hostname`; 0 if unknown or never attempted.
    pub async fn uptime_percent(&self, hostname: &str) -> u32 {
        self.counters(hostname)
            .await
            .map(|c| c.uptime_percent())
            .unwrap_or(0)
    }

    /// Copy every bucket under one lock acquisition.
    ///
    /// The scheduler calls this only after all probe tasks of a cycle
    /// have been joined, so the copy reflects whole cycles.
    pub async fn snapshot(&self) -> Snapshot {
        let hosts = self.hosts.lock().await;
        hosts.iter().map(|(h, c)| (h.clone(), *c)).collect()
    }
}
