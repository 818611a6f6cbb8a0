//! fetchgrid-echo — print every HTTP request received.
//!
//! ```text
//! fetchgrid-echo --bind 127.0.0.1:8080
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use fetchgrid_echo::EchoServer;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser)]
#[command(name = "fetchgrid-echo", about = "Dump incoming HTTP requests to stdout")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:80")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let server = EchoServer::bind(cli.bind, Arc::new(|dump: String| println!("{dump}"))).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        } else {
            std::future::pending::<()>().await;
        }
    });

    server.serve(shutdown_rx).await
}
