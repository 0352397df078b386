//! Broadcast to a peer's accepted connections, pruning the dead ones.
//!
//! Two phases: send to a snapshot, then remove failures from the live set.
//! No map guard is held while a socket is in use.

use std::time::Duration;

use futures::future::join_all;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tryst_core::PeerAddress;

use crate::peer_connections::PeerConnections;

/// Expected acknowledgement of a raw message.
pub const ACK: &[u8] = b"OK";

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("connect to {peer} failed: {source}")]
    Connect {
        peer: String,
        source: std::io::Error,
    },
    #[error("write to {peer} failed: {source}")]
    Write {
        peer: String,
        source: std::io::Error,
    },
    #[error("{peer} timed out")]
    Timeout { peer: String },
}

/// Outcome of one broadcast, by peer-key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: Vec<String>,
    pub pruned: Vec<String>,
}

/// Send `message` to every connection; drop the ones that fail.
pub async fn broadcast(
    connections: &PeerConnections,
    message: &str,
    send_timeout: Duration,
) -> BroadcastReport {
    let targets = connections.snapshot();
    let results = join_all(
        targets
            .iter()
            .map(|peer| send_text(peer, message, send_timeout)),
    )
    .await;

    let mut report = BroadcastReport::default();
    for (peer, result) in targets.iter().zip(results) {
        match result {
            Ok(()) => report.delivered.push(peer.key()),
            Err(e) => {
                tracing::warn!(peer = %peer, error = %e, "send failed, pruning");
                report.pruned.push(peer.key());
            }
        }
    }
    connections.remove_all(&report.pruned);

    report.delivered.sort();
    report.pruned.sort();
    tracing::debug!(
        delivered = report.delivered.len(),
        pruned = report.pruned.len(),
        "broadcast complete"
    );
    report
}

/// One raw send: connect, write the text, wait for the ack.
///
/// Each step runs under `send_timeout`. A missing or unexpected ack is
/// logged but does not fail the send.
pub async fn send_text(peer: &PeerAddress, text: &str, send_timeout: Duration) -> Result<(), SendError> {
    let key = peer.key();
    let mut stream = match timeout(send_timeout, TcpStream::connect(key.as_str())).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(SendError::Connect { peer: key, source }),
        Err(_) => return Err(SendError::Timeout { peer: key }),
    };

    match timeout(send_timeout, stream.write_all(text.as_bytes())).await {
        Ok(Ok(())) => {}
        Ok(Err(source)) => return Err(SendError::Write { peer: key, source }),
        Err(_) => return Err(SendError::Timeout { peer: key }),
    }

    let mut ack = [0u8; 64];
    match timeout(send_timeout, stream.read(&mut ack)).await {
        Ok(Ok(n)) if &ack[..n] == ACK => {}
        Ok(Ok(n)) => {
            tracing::debug!(peer = %key, ack = %String::from_utf8_lossy(&ack[..n]), "unexpected ack")
        }
        Ok(Err(e)) => tracing::debug!(peer = %key, error = %e, "ack read failed"),
        Err(_) => tracing::debug!(peer = %key, "ack timed out"),
    }
    Ok(())
}
