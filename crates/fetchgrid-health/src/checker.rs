//! Probe execution and classification.
//!
//! Issues one HTTP request per endpoint with a hard timeout and reduces
//! the result to UP or DOWN. The cause of a DOWN is kept for logging
//! only; callers see it through [`ProbeOutcome::is_up`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use fetchgrid_config::EndpointDescriptor;
use reqwest::{Client, ClientBuilder, Method};
use tracing::debug;

/// Budget from request start until response headers arrive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Why a probe counted as DOWN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownReason {
    /// The endpoint answered with a non-2xx status.
    Status(u16),
    /// No response headers within the timeout.
    Timeout,
    /// DNS, connect, TLS, or protocol failure.
    Transport(String),
    /// The request could not be built (bad method or header).
    InvalidRequest(String),
}

impl fmt::Display for DownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownReason::Status(code) => write!(f, "status {code}"),
            DownReason::Timeout => f.write_str("timed out"),
            DownReason::Transport(e) => write!(f, "transport error: {e}"),
            DownReason::InvalidRequest(e) => write!(f, "invalid request: {e}"),
        }
    }
}

/// Result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx within the timeout.
    Up(u16),
    Down(DownReason),
}

impl ProbeOutcome {
    /// Classify a response status: UP iff it is in 200..=299.
    pub fn from_status(status: u16) -> Self {
        if (200..=299).contains(&status) {
            ProbeOutcome::Up(status)
        } else {
            ProbeOutcome::Down(DownReason::Status(status))
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, ProbeOutcome::Up(_))
    }
}

/// Something that can probe an endpoint once.
///
/// Implementations never fail: every problem is a DOWN outcome.
pub trait Probe: Send + Sync + 'static {
    fn execute(
        &self,
        endpoint: &EndpointDescriptor,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Probes endpoints over HTTP(S) with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    /// Build a prober whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let builder = Client::builder().timeout(timeout).connect_timeout(timeout);
        Self::with_builder(builder, timeout)
    }

    /// Build from a preconfigured client builder. `timeout` still bounds
    /// every request from the outside, whatever the builder sets.
    pub(crate) fn with_builder(builder: ClientBuilder, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: builder.build()?,
            timeout,
        })
    }

    /// Send the endpoint's request and classify the response.
    pub async fn probe(&self, endpoint: &EndpointDescriptor) -> ProbeOutcome {
        let outcome = self.send(endpoint).await;
        match &outcome {
            ProbeOutcome::Up(status) => {
                debug!(name = endpoint.name(), url = %endpoint.url(), status, "probe up");
            }
            ProbeOutcome::Down(reason) => {
                debug!(name = endpoint.name(), url = %endpoint.url(), %reason, "probe down");
            }
        }
        outcome
    }

    async fn send(&self, endpoint: &EndpointDescriptor) -> ProbeOutcome {
        let method = match Method::from_bytes(endpoint.effective_method().as_bytes()) {
            Ok(m) => m,
            Err(e) => return ProbeOutcome::Down(DownReason::InvalidRequest(e.to_string())),
        };

        let mut builder = self.client.request(method, endpoint.url().as_str());
        for (name, value) in endpoint.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = endpoint.body() {
            builder = builder.body(body.to_string());
        }

        let request = match builder.build() {
            Ok(r) => r,
            Err(e) => return ProbeOutcome::Down(DownReason::InvalidRequest(e.to_string())),
        };

        // The client timeout covers the exchange; the outer one also bounds
        // name resolution, which runs before the client's clock matters.
        match tokio::time::timeout(self.timeout, self.client.execute(request)).await {
            Err(_) => ProbeOutcome::Down(DownReason::Timeout),
            Ok(Err(e)) if e.is_timeout() => ProbeOutcome::Down(DownReason::Timeout),
            Ok(Err(e)) => ProbeOutcome::Down(DownReason::Transport(e.to_string())),
            Ok(Ok(resp)) => ProbeOutcome::from_status(resp.status().as_u16()),
        }
    }
}

impl Probe for HttpProber {
    fn execute(
        &self,
        endpoint: &EndpointDescriptor,
    ) -> impl Future<Output = ProbeOutcome> + Send {
        self.probe(endpoint)
    }
}
