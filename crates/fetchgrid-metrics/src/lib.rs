//! fetchgrid-metrics — availability accounting for fetchgrid.
//!
//! Accumulates per-hostname attempt/success counters written by
//! concurrent probe tasks, and renders the rounded availability
//! percentage for each host once a cycle has finished.
//!
//! # Architecture
//!
//! ```text
//! AggregateStore
//!   ├── record_attempt() ← called once per probe per cycle
//!   └── snapshot() → Snapshot (hostname → HostCounters)
//!
//! Reporter
//!   └── emit(Report::from(&snapshot)) → one line per hostname
//! ```

pub mod report;
pub mod store;

pub use report::{HostUptime, Report, Reporter};
pub use store::{AggregateStore, HostCounters, Snapshot};
