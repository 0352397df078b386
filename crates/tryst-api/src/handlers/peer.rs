//! Peer node endpoints and the raw P2P hook.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tryst_core::wire::{
    AcceptConnectionRequest, MessagesResponse, SendMessageRequest, SendMessageResponse,
    StatusResponse, STATUS_OK,
};
use tryst_core::RECENT_WINDOW;
use tryst_http::{parse_json, Headers, HandlerError, RawPayloadHandler, Reply};
use tryst_services::fanout::{broadcast, ACK};

use super::{index_page, PeerState};

pub async fn index(state: Arc<PeerState>, _h: Headers, _b: Bytes) -> Result<Reply, HandlerError> {
    index_page(&state.static_root).await
}

/// The tracker introduced someone to us.
pub async fn accept_connection(state: Arc<PeerState>, _h: Headers, body: Bytes) -> Result<Reply, HandlerError> {
    let req: AcceptConnectionRequest = parse_json(&body)?;
    if state.connections.accept(req.from.clone()) {
        tracing::info!(me = %state.me, peer = %req.from, "accepted connection");
    }
    Reply::json(&StatusResponse::ok())
}

pub async fn get_messages(state: Arc<PeerState>, _h: Headers, _b: Bytes) -> Result<Reply, HandlerError> {
    Reply::json(&MessagesResponse {
        messages: state.messages.recent(RECENT_WINDOW),
    })
}

/// Log locally, then fan out to every accepted connection.
pub async fn send_message(state: Arc<PeerState>, _h: Headers, body: Bytes) -> Result<Reply, HandlerError> {
    let req: SendMessageRequest = parse_json(&body)?;
    let entry = state.messages.append(req.sender, req.content);
    let report = broadcast(&state.connections, &entry.render(), state.send_timeout).await;
    if !report.pruned.is_empty() {
        tracing::warn!(me = %state.me, pruned = ?report.pruned, "dropped unreachable peers");
    }
    Reply::json(&SendMessageResponse {
        status: STATUS_OK.to_string(),
        delivered: report.delivered.len(),
        pruned: report.pruned.len(),
    })
}

/// Stores non-HTTP payloads under the remote socket address and acks them.
pub struct PeerRawHandler {
    state: Arc<PeerState>,
}

impl PeerRawHandler {
    pub fn new(state: Arc<PeerState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl RawPayloadHandler for PeerRawHandler {
    async fn handle_raw(&self, remote: SocketAddr, payload: &[u8]) -> Vec<u8> {
        let text = String::from_utf8_lossy(payload);
        let entry = self.state.messages.append(remote.to_string(), text);
        tracing::info!(me = %self.state.me, %remote, seq = entry.seq, "p2p message");
        ACK.to_vec()
    }
}
