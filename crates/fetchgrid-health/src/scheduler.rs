//! Polling scheduler — the fixed-interval probe loop.
//!
//! Owns the endpoint list and the aggregate store for the life of the
//! process. A cycle fans out one task per endpoint, joins all of them,
//! then reports; the sleep comes last, so cycles never overlap.

use std::sync::Arc;
use std::time::Duration;

use fetchgrid_config::EndpointDescriptor;
use fetchgrid_metrics::{AggregateStore, Report, Reporter};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::checker::{HttpProber, Probe};

/// Pause between the end of one cycle and the start of the next.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Drives probing cycles over a fixed set of endpoints.
pub struct PollingScheduler<P = HttpProber> {
    endpoints: Vec<Arc<EndpointDescriptor>>,
    prober: Arc<P>,
    store: AggregateStore,
    reporter: Reporter,
    interval: Duration,
    cycles: u64,
}

impl<P: Probe> PollingScheduler<P> {
    /// Create a scheduler with a zeroed bucket per distinct hostname.
    pub fn new(endpoints: Vec<EndpointDescriptor>, prober: P) -> Self {
        let store = AggregateStore::with_hosts(endpoints.iter().map(|e| e.hostname().to_string()));
        Self {
            endpoints: endpoints.into_iter().map(Arc::new).collect(),
            prober: Arc::new(prober),
            store,
            reporter: Reporter::stdout(),
            interval: DEFAULT_INTERVAL,
            cycles: 0,
        }
    }

    /// Set the pause between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Send reports somewhere other than stdout.
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn store(&self) -> &AggregateStore {
        &self.store
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of completed cycles.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    /// Run one cycle: probe everything in parallel, wait for all probes,
    /// then report from a snapshot.
    pub async fn run_cycle(&mut self) -> Report {
        let cycle = self.cycles + 1;

        let tasks: Vec<_> = self
            .endpoints
            .iter()
            .map(|endpoint| {
                let hostname = endpoint.hostname().to_string();
                let endpoint = Arc::clone(endpoint);
                let prober = Arc::clone(&self.prober);
                let store = self.store.clone();
                let handle = tokio::spawn(async move {
                    let outcome = prober.execute(&endpoint).await;
                    store
                        .record_attempt(endpoint.hostname(), outcome.is_up())
                        .await;
                    outcome.is_up()
                });
                (hostname, handle)
            })
            .collect();

        let mut up = 0usize;
        let mut down = 0usize;
        for (hostname, handle) in tasks {
            match handle.await {
                Ok(true) => up += 1,
                Ok(false) => down += 1,
                Err(e) => {
                    // The task died before recording; the attempt still counts.
                    error!(%hostname, error = %e, "probe task failed");
                    self.store.record_attempt(&hostname, false).await;
                    down += 1;
                }
            }
        }

        self.cycles = cycle;
        debug!(cycle, up, down, "cycle complete");

        let report = Report::from(&self.store.snapshot().await);
        if let Err(e) = self.reporter.emit(&report) {
            warn!(error = %e, "failed to write availability report");
        }
        report
    }

    /// Cycle forever until `shutdown` fires.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) {
        self.run_for(None, shutdown).await;
    }

    /// Cycle until `limit` cycles have run (if set) or `shutdown` fires.
    ///
    /// Shutdown only interrupts the sleep between cycles; a started cycle
    /// always completes and reports. Returns the number of cycles run.
    pub async fn run_for(&mut self, limit: Option<u64>, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(
            endpoints = self.endpoints.len(),
            interval_secs = self.interval.as_secs_f64(),
            "polling scheduler started"
        );

        let start = self.cycles;
        let reached = |cycles: u64| limit.is_some_and(|n| cycles - start >= n);

        while !reached(self.cycles) {
            self.run_cycle().await;

            // No sleep after the last cycle.
            if reached(self.cycles) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    info!("polling scheduler shutting down");
                    break;
                }
            }
        }

        if reached(self.cycles) {
            info!(cycles = self.cycles - start, "cycle limit reached");
        }
        self.cycles - start
    }
}
