//! Availability report rendering.
//!
//! Turns a [`Snapshot`] into one line per hostname:
//!
//! ```text
//! fetch.com has 67% availability percentage
//! www.fetchrewards.com has 100% availability percentage
//! ```

use std::fmt;
use std::io::{self, Write};

use crate::store::Snapshot;

/// Computed availability of one hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUptime {
    pub hostname: String,
    pub uptime_percent: u32,
    pub attempts: u64,
    pub successes: u64,
}

impl fmt::Display for HostUptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has {}% availability percentage",
            self.hostname, self.uptime_percent
        )
    }
}

/// Per-cycle report: one [`HostUptime`] per bucket, ordered by hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub hosts: Vec<HostUptime>,
}

impl Report {
    /// Look up the line for `hostname`.
    pub fn get(&self, hostname: &str) -> Option<&HostUptime> {
        self.hosts.iter().find(|h| h.hostname == hostname)
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl From<&Snapshot> for Report {
    fn from(snapshot: &Snapshot) -> Self {
        let hosts = snapshot
            .iter()
            .map(|(hostname, c)| HostUptime {
                hostname: hostname.clone(),
                uptime_percent: c.uptime_percent(),
                attempts: c.attempts,
                successes: c.successes,
            })
            .collect();
        Self { hosts }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.hosts {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Writes reports to an output stream, stdout by default.
pub struct Reporter {
    out: Box<dyn Write + Send>,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Write every line of `report` and flush.
    pub fn emit(&mut self, report: &Report) -> io::Result<()> {
        write!(self.out, "{report}")?;
        self.out.flush()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}
