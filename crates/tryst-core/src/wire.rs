//! JSON bodies exchanged with tracker and peer endpoints.
//!
//! Request bodies are shared by the servers (which deserialize them) and
//! the clients (which serialize them), so both sides derive both traits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::message::MessageLogEntry;
use crate::peer::PeerAddress;

pub const STATUS_OK: &str = "ok";

// ── Requests ──────────────────────────────────────────────────────────────────

/// `POST /submit-info`. The body is the peer address itself.
pub type SubmitInfoRequest = PeerAddress;

/// `POST /connect-peer`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectPeerRequest {
    pub from: PeerAddress,
    pub to: PeerAddress,
}

/// `POST /accept-connection`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptConnectionRequest {
    pub from: PeerAddress,
}

/// `POST /send-message` (peer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub sender: String,
    pub content: String,
}

/// `GET /get-messages` (tracker). The endpoint insists on a body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundNotice {
    pub from: serde_json::Value,
    pub message: serde_json::Value,
}

// ── Responses ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK.to_string(),
        }
    }
}

/// `GET /get-list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerListResponse {
    pub status: String,
    pub peers: Vec<PeerAddress>,
}

/// `GET /get-connections`. Always a mapping from peer-key to neighbours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    pub status: String,
    pub connected_peers: BTreeMap<String, Vec<PeerAddress>>,
}

/// `GET /get-messages` (peer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageLogEntry>,
}

/// `POST /send-message` (peer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub status: String,
    pub delivered: usize,
    pub pruned: usize,
}

/// Body of every 4xx/5xx JSON reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
