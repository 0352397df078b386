//! Tracker endpoints: registry, introductions, bookkeeping.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tryst_core::wire::{
    AcceptConnectionRequest, ConnectPeerRequest, ConnectionsResponse, InboundNotice,
    PeerListResponse, StatusResponse, SubmitInfoRequest, STATUS_OK,
};
use tryst_core::PeerAddress;
use tryst_http::{parse_json, Headers, HandlerError, Reply};
use tryst_services::introduce;

use super::{index_page, TrackerState};

// ── / (GET) ───────────────────────────────────────────────────────────────────

pub async fn index(state: Arc<TrackerState>, _h: Headers, _b: Bytes) -> Result<Reply, HandlerError> {
    index_page(&state.static_root).await
}

// ── /submit-info (POST) ───────────────────────────────────────────────────────

pub async fn submit_info(state: Arc<TrackerState>, _h: Headers, body: Bytes) -> Result<Reply, HandlerError> {
    let addr: SubmitInfoRequest = parse_json(&body)?;
    state.registry.register(addr);
    Reply::json(&StatusResponse::ok())
}

// ── /get-list (GET) ───────────────────────────────────────────────────────────

pub async fn get_list(state: Arc<TrackerState>, _h: Headers, _b: Bytes) -> Result<Reply, HandlerError> {
    Reply::json(&PeerListResponse {
        status: STATUS_OK.to_string(),
        peers: state.registry.list(),
    })
}

// ── /connect-peer (POST) ──────────────────────────────────────────────────────

/// Link both peers, then notify the target. The caller gets ok even when
/// the notice fails.
pub async fn connect_peer(state: Arc<TrackerState>, _h: Headers, body: Bytes) -> Result<Reply, HandlerError> {
    let req: ConnectPeerRequest = parse_json(&body)?;
    introduce(&state.graph, &state.notifier, &req.from, &req.to).await;
    Reply::json(&StatusResponse::ok())
}

// ── /accept-connection (POST) ─────────────────────────────────────────────────

pub async fn accept_connection(
    state: Arc<TrackerState>,
    _h: Headers,
    body: Bytes,
) -> Result<Reply, HandlerError> {
    let req: AcceptConnectionRequest = parse_json(&body)?;
    state.graph.ensure(&req.from).await;
    tracing::info!(peer = %req.from, "connection accepted");
    Reply::json(&StatusResponse::ok())
}

// ── /get-connections (GET) ────────────────────────────────────────────────────

pub async fn get_connections(
    state: Arc<TrackerState>,
    _h: Headers,
    _b: Bytes,
) -> Result<Reply, HandlerError> {
    Reply::json(&ConnectionsResponse {
        status: STATUS_OK.to_string(),
        connected_peers: state.graph.snapshot().await,
    })
}

// ── /broadcast-peer (POST) ────────────────────────────────────────────────────

pub async fn broadcast_peer(_state: Arc<TrackerState>, _h: Headers, body: Bytes) -> Result<Reply, HandlerError> {
    let data: Value = parse_json(&body)?;
    tracing::info!(request = %data, "broadcast request");
    Reply::json(&StatusResponse::ok())
}

// ── /send-peer (POST) ─────────────────────────────────────────────────────────

pub async fn send_peer(state: Arc<TrackerState>, _h: Headers, body: Bytes) -> Result<Reply, HandlerError> {
    let data: Value = parse_json(&body)?;
    let Value::Object(fields) = &data else {
        return Err(HandlerError::BadRequest("expected a JSON object".to_string()));
    };

    let sender = fields
        .get("sender")
        .or_else(|| fields.get("from"))
        .map(render_sender)
        .unwrap_or_default();
    let content = fields
        .get("content")
        .or_else(|| fields.get("message"))
        .map(render_value)
        .unwrap_or_else(|| data.to_string());

    let entry = state.messages.append(sender, content);
    tracing::info!(seq = entry.seq, sender = %entry.sender, "peer-to-peer send recorded");
    Reply::json(&StatusResponse::ok())
}

/// Address objects become their peer-key; anything else renders as a value.
fn render_sender(value: &Value) -> String {
    match serde_json::from_value::<PeerAddress>(value.clone()) {
        Ok(addr) => addr.key(),
        Err(_) => render_value(value),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── /get-messages (GET) ───────────────────────────────────────────────────────

/// Requires a `{from, message}` body. Plain GETs carry none and get 400.
pub async fn get_messages(_state: Arc<TrackerState>, _h: Headers, body: Bytes) -> Result<Reply, HandlerError> {
    let notice: InboundNotice = parse_json(&body)?;
    tracing::info!(from = %notice.from, message = %notice.message, "message notice received");
    Reply::json(&StatusResponse {
        status: "received".to_string(),
    })
}
