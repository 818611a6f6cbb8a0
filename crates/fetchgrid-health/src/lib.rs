//! fetchgrid-health — HTTP probing and the polling loop.
//!
//! Every cycle probes each configured endpoint once, in parallel,
//! records the UP/DOWN outcome against the endpoint's hostname, and
//! reports per-host availability once all probes have returned.
//!
//! # Architecture
//!
//! ```text
//! PollingScheduler
//!   ├── run_cycle()
//!   │   ├── tokio::spawn per endpoint
//!   │   │   ├── Probe::execute() → ProbeOutcome
//!   │   │   └── AggregateStore::record_attempt()
//!   │   ├── join every task (cycle barrier)
//!   │   └── Reporter::emit(snapshot)
//!   └── run() → run_cycle + sleep(interval), until shutdown
//! ```
//!
//! # Classification
//!
//! A probe is UP only if a 2xx status arrives within the timeout
//! (500ms by default). Non-2xx, timeouts, DNS and connection errors
//! are all DOWN; none of them is surfaced as an error.

pub mod checker;
pub mod scheduler;

pub use checker::{DownReason, HttpProber, Probe, ProbeOutcome, DEFAULT_TIMEOUT};
pub use scheduler::{PollingScheduler, DEFAULT_INTERVAL};
