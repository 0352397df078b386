//! Route handlers: tracker and peer endpoints over shared state.

pub mod peer;
pub mod tracker;

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tryst_core::PeerAddress;
use tryst_http::route::CONTENT_TYPE_HTML;
use tryst_http::{Headers, HandlerError, Reply};
use tryst_services::{ConnectionGraph, IntroductionNotifier, MessageLog, PeerConnections, PeerRegistry};

/// Everything the tracker endpoints touch.
pub struct TrackerState {
    pub registry: PeerRegistry,
    pub graph: ConnectionGraph,
    pub messages: MessageLog,
    pub notifier: IntroductionNotifier,
    /// Directory holding `www/index.html`.
    pub static_root: PathBuf,
}

/// Everything a peer node's endpoints touch.
pub struct PeerState {
    /// Address this peer announces to the tracker.
    pub me: PeerAddress,
    pub connections: PeerConnections,
    pub messages: MessageLog,
    pub send_timeout: Duration,
    pub static_root: PathBuf,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Turn `async fn(Arc<S>, Headers, Bytes)` into a route handler bound to `state`.
pub(crate) fn with_state<S, F, Fut>(
    state: &Arc<S>,
    f: F,
) -> impl Fn(Headers, Bytes) -> Fut + Send + Sync + 'static
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, Headers, Bytes) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    let state = state.clone();
    move |headers, body| f(state.clone(), headers, body)
}

/// `GET /` on both node kinds: the fixed landing page.
pub(crate) async fn index_page(static_root: &Path) -> Result<Reply, HandlerError> {
    let file = static_root.join("www").join("index.html");
    match tokio::fs::read(&file).await {
        Ok(content) => Ok(Reply::bytes(content, CONTENT_TYPE_HTML)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(file = %file.display(), "landing page missing");
            Ok(Reply::html("404 Not Found").with_status(404))
        }
        Err(e) => Err(HandlerError::Internal(format!(
            "failed to read {}: {e}",
            file.display()
        ))),
    }
}
