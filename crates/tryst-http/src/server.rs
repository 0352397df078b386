//! Accept loop and connection workers.
//!
//! One worker per accepted connection, bounded by a semaphore. A worker
//! performs exactly one read and one write, both under a deadline, then
//! closes the socket. Connections arriving while every permit is taken are
//! answered with 503 and dropped without spawning a worker.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;

use tryst_core::config::ServerConfig;

use crate::app::App;
use crate::request::looks_like_http;
use crate::response::BuiltResponse;

/// Hook for payloads that are not HTTP. Peers use it for direct messages.
#[async_trait]
pub trait RawPayloadHandler: Send + Sync {
    /// Returns the bytes written back verbatim, without HTTP framing.
    async fn handle_raw(&self, remote: SocketAddr, payload: &[u8]) -> Vec<u8>;
}

#[derive(Debug, Clone)]
pub struct ServerLimits {
    pub max_connections: usize,
    pub backlog: i32,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub read_buffer_size: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for ServerLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1),
            backlog: config.backlog,
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
            read_buffer_size: config.read_buffer_size.max(1),
        }
    }
}

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    app: Arc<App>,
    limits: ServerLimits,
}

impl Server {
    /// Bind with SO_REUSEADDR and the configured backlog.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn bind(addr: SocketAddr, app: App, limits: ServerLimits) -> std::io::Result<Self> {
        let listener = make_listener(addr, limits.backlog)?;
        let listener = TcpListener::from_std(listener)?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            app: Arc::new(app),
            limits,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    /// Accept connections forever. `raw` turns on peer mode: payloads that
    /// do not look like HTTP go to the hook instead of the HTTP pipeline.
    ///
    /// Never returns. Abort the spawned task to stop it.
    pub async fn serve(self, raw: Option<Arc<dyn RawPayloadHandler>>) {
        let permits = Arc::new(Semaphore::new(self.limits.max_connections));
        let local_port = self.local_addr.port();
        tracing::info!(
            addr = %self.local_addr,
            max_connections = self.limits.max_connections,
            raw_payloads = raw.is_some(),
            "listening"
        );

        loop {
            let (stream, remote) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    continue;
                }
            };

            let permit = match permits.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!(%remote, "connection limit reached, shedding");
                    shed(stream);
                    continue;
                }
            };

            let app = self.app.clone();
            let raw = raw.clone();
            let limits = self.limits.clone();
            tokio::spawn(async move {
                handle_connection(stream, remote, local_port, &app, raw.as_deref(), &limits).await;
                drop(permit);
            });
        }
    }
}

/// Best-effort 503 without blocking the accept loop.
fn shed(stream: TcpStream) {
    let bytes = BuiltResponse::service_unavailable().to_bytes();
    if let Err(e) = stream.try_write(&bytes) {
        tracing::debug!(error = %e, "failed to write 503");
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    remote: SocketAddr,
    local_port: u16,
    app: &App,
    raw: Option<&dyn RawPayloadHandler>,
    limits: &ServerLimits,
) {
    let mut buf = vec![0u8; limits.read_buffer_size];
    let n = match timeout(limits.read_timeout, stream.read(&mut buf)).await {
        Ok(Ok(0)) => return,
        Ok(Ok(n)) => n,
        Ok(Err(e)) => {
            tracing::debug!(%remote, error = %e, "read failed");
            return;
        }
        Err(_) => {
            tracing::debug!(%remote, "read timed out");
            return;
        }
    };
    let payload = &buf[..n];

    let out = match raw {
        Some(hook) if !looks_like_http(payload) => hook.handle_raw(remote, payload).await,
        _ => {
            let resp = app.respond(payload, local_port).await;
            tracing::debug!(%remote, status = resp.status, "responding");
            resp.to_bytes()
        }
    };

    match timeout(limits.write_timeout, stream.write_all(&out)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(%remote, error = %e, "write failed"),
        Err(_) => tracing::debug!(%remote, "write timed out"),
    }
    let _ = stream.shutdown().await;
}

fn make_listener(addr: SocketAddr, backlog: i32) -> std::io::Result<std::net::TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;
    Ok(socket.into())
}
