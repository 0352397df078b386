//! tryst integration test harness.
//!
//! Every test runs trackers and peers in-process on 127.0.0.1 and talks to
//! them over real sockets, either with hand-written requests or reqwest.
//! Servers are aborted when their handle drops.
//!
//!   cargo test --test integration

mod gate;
mod introduction;
mod messaging;
mod registry;
mod tracker_client;

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use tryst_api::{peer_app, tracker_app, PeerRawHandler, PeerState, TrackerState};
use tryst_core::config::{AuthConfig, ServerConfig};
use tryst_core::PeerAddress;
use tryst_http::{RawPayloadHandler, Server, ServerLimits, SessionStore};
use tryst_services::{
    ConnectionGraph, IntroductionNotifier, MessageLog, PeerConnections, PeerRegistry, TrackerClient,
};

// ── Harness ───────────────────────────────────────────────────────────────────

pub const LANDING_PAGE: &str = "<html><body><h1>tryst</h1></body></html>";
pub const LOGIN_PAGE: &str = "<html><body><form method=\"post\" action=\"/login\"></form></body></html>";

/// Static root shared by every node in this test process.
pub fn static_root() -> PathBuf {
    static ROOT: OnceLock<PathBuf> = OnceLock::new();
    ROOT.get_or_init(|| {
        let root = std::env::temp_dir().join(format!("tryst-it-{}", std::process::id()));
        std::fs::create_dir_all(root.join("www")).unwrap();
        std::fs::write(root.join("www/index.html"), LANDING_PAGE).unwrap();
        std::fs::write(root.join("www/login.html"), LOGIN_PAGE).unwrap();
        root
    })
    .clone()
}

/// A port that was free a moment ago. Needed when the gate must know the
/// listening port before the server is bound.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub fn server_config() -> ServerConfig {
    ServerConfig {
        static_root: static_root(),
        read_timeout_ms: 1_000,
        write_timeout_ms: 1_000,
        ..ServerConfig::default()
    }
}

pub struct Node<S> {
    pub addr: PeerAddress,
    pub state: Arc<S>,
    task: JoinHandle<()>,
}

impl<S> Node<S> {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr.key())
    }
}

impl<S> Drop for Node<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub type Tracker = Node<TrackerState>;
pub type Peer = Node<PeerState>;

/// Tracker whose own port is the gate's exempt port.
pub async fn start_tracker() -> Tracker {
    let port = free_port();
    let mut auth = AuthConfig::default();
    auth.follow_tracker_port(port);
    start_tracker_on(port, auth, server_config()).await
}

pub async fn start_tracker_on(port: u16, auth: AuthConfig, server: ServerConfig) -> Tracker {
    let state = Arc::new(TrackerState {
        registry: PeerRegistry::new(),
        graph: ConnectionGraph::new(),
        messages: MessageLog::new(),
        notifier: IntroductionNotifier::new(Duration::from_secs(2)).unwrap(),
        static_root: static_root(),
    });
    let app = tracker_app(state.clone(), &auth, &server, SessionStore::new());
    let server = Server::bind(
        format!("127.0.0.1:{port}").parse().unwrap(),
        app,
        ServerLimits::from(&server),
    )
    .unwrap();
    let addr = PeerAddress::new("127.0.0.1", server.local_addr().port());
    let task = tokio::spawn(server.serve(None));
    Node { addr, state, task }
}

pub async fn start_peer() -> Peer {
    let server = server_config();
    let port = free_port();
    let addr = PeerAddress::new("127.0.0.1", port);
    let state = Arc::new(PeerState {
        me: addr.clone(),
        connections: PeerConnections::new(),
        messages: MessageLog::new(),
        send_timeout: Duration::from_secs(1),
        static_root: static_root(),
    });
    let raw: Arc<dyn RawPayloadHandler> = Arc::new(PeerRawHandler::new(state.clone()));
    let app = peer_app(state.clone(), &AuthConfig::default(), &server, SessionStore::new());
    let server = Server::bind(
        format!("127.0.0.1:{port}").parse().unwrap(),
        app,
        ServerLimits::from(&server),
    )
    .unwrap();
    let task = tokio::spawn(server.serve(Some(raw)));
    Node { addr, state, task }
}

/// Write `payload`, read until the server closes.
pub async fn exchange(addr: &PeerAddress, payload: &[u8]) -> Result<Vec<u8>> {
    let mut stream = TcpStream::connect(addr.key())
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;
    stream.write_all(payload).await?;
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out))
        .await
        .context("response timed out")??;
    Ok(out)
}

/// A parsed HTTP response from [`http`].
pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Send one hand-written request. `extra` lines are added verbatim.
pub async fn http(
    addr: &PeerAddress,
    method: &str,
    path: &str,
    extra: &[&str],
    body: &str,
) -> Result<RawResponse> {
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {}\r\n", addr.key());
    for line in extra {
        req.push_str(line);
        req.push_str("\r\n");
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));

    let raw = exchange(addr, req.as_bytes()).await?;
    let text = String::from_utf8(raw).context("response is not UTF-8")?;
    let (head, body) = text.split_once("\r\n\r\n").context("no header terminator")?;
    let status = head
        .split_whitespace()
        .nth(1)
        .context("no status code")?
        .parse()?;
    Ok(RawResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    })
}

pub async fn post_json(url: &str, body: serde_json::Value) -> Result<serde_json::Value> {
    Ok(reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

pub async fn get_json(url: &str) -> Result<serde_json::Value> {
    Ok(reqwest::get(url).await?.error_for_status()?.json().await?)
}
