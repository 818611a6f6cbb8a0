//! fetchd — the fetchgrid availability poller.
//!
//! Loads a YAML list of HTTP endpoints, then every interval probes all
//! of them in parallel and prints one availability line per hostname.
//!
//! # Usage
//!
//! ```text
//! fetchd endpoints.yaml
//! fetchd endpoints.yaml --interval-secs 5 --timeout-ms 250 --log-format json
//! ```
//!
//! Reports go to stdout, logs to stderr. A configuration problem exits
//! with status 255 before any request is sent; Ctrl-C or SIGTERM stops
//! the loop between cycles and exits 0.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fetchgrid_health::{HttpProber, PollingScheduler};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,fetchd=debug,fetchgrid_health=info";

/// Exit status for fatal startup errors (`-1` as a process status).
const FATAL_EXIT: u8 = 255;

#[derive(Debug, Parser)]
#[command(name = "fetchd", version, about = "Poll HTTP endpoints and report availability")]
struct Cli {
    /// YAML file listing the endpoints to probe.
    config: PathBuf,

    /// Seconds to wait between polling cycles.
    #[arg(long, env = "FETCHD_INTERVAL_SECS", default_value = "15")]
    interval_secs: u64,

    /// Per-request timeout in milliseconds.
    #[arg(long, env = "FETCHD_TIMEOUT_MS", default_value = "500")]
    timeout_ms: u64,

    /// Stop after this many cycles instead of running forever.
    #[arg(long)]
    cycles: Option<u64>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(FATAL_EXIT)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let endpoints = fetchgrid_config::load_endpoints(&cli.config)
        .with_context(|| format!("invalid config {}", cli.config.display()))?;
    info!(
        path = %cli.config.display(),
        endpoints = endpoints.len(),
        "configuration loaded"
    );

    let prober = HttpProber::new(Duration::from_millis(cli.timeout_ms))
        .context("failed to build HTTP client")?;
    let mut scheduler = PollingScheduler::new(endpoints, prober)
        .with_interval(Duration::from_secs(cli.interval_secs));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let cycles = scheduler.run_for(cli.cycles, shutdown_rx).await;
    info!(cycles, "fetchd stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix. Never resolves if no handler
/// could be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
