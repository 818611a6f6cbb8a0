//! fetchgrid-echo — a diagnostic HTTP server.
//!
//! Accepts any request on any path, hands a text dump of it (request
//! line, headers, body) to a callback, and answers `200 OK` with an
//! empty body. Point a fetchd endpoint at it to see exactly what the
//! prober sends.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Receives the dump of every request served.
pub type DumpHandler = Arc<dyn Fn(String) + Send + Sync>;

/// Echo server bound to a local address.
pub struct EchoServer {
    listener: TcpListener,
    on_dump: DumpHandler,
}

impl EchoServer {
    /// Bind to `addr`. Use port 0 to let the OS pick one.
    pub async fn bind(addr: SocketAddr, on_dump: DumpHandler) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind echo server on {addr}"))?;
        Ok(Self { listener, on_dump })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the shutdown signal fires. One task per connection.
    pub async fn serve(self, mut shutdown: tokio::sync::watch::Receiver<bool>) -> anyhow::Result<()> {
        info!(addr = %self.local_addr()?, "echo server listening");

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    let (stream, peer_addr) = accept_result.context("accept failed")?;
                    let on_dump = self.on_dump.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let svc = service_fn(move |req: Request<Incoming>| {
                            let on_dump = on_dump.clone();
                            async move {
                                match read_dump(req).await {
                                    Ok(dump) => on_dump(dump),
                                    Err(e) => error!(%peer_addr, error = %e, "failed to read request"),
                                }
                                Ok::<_, hyper::Error>(Response::new(Full::new(Bytes::new())))
                            }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, svc).await {
                            debug!(%peer_addr, error = %e, "connection error");
                        }
                    });
                }
                _ = shutdown.changed() => {
                    info!("echo server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn read_dump(req: Request<Incoming>) -> anyhow::Result<String> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await.context("failed to read body")?.to_bytes();

    let mut headers: Vec<(String, String)> = parts
        .headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();
    headers.sort();

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Ok(format_dump(
        parts.method.as_str(),
        target,
        &format!("{:?}", parts.version),
        &headers,
        &body,
    ))
}

/// Render a request in wire-like form: request line, one `name: value`
/// line per header, a blank line, then the body (lossy UTF-8).
pub fn format_dump(
    method: &str,
    target: &str,
    version: &str,
    headers: &[(String, String)],
    body: &[u8],
) -> String {
    let mut out = format!("{method} {target} {version}\n");
    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\n"));
    }
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(body));
    out
}
