//! Introduction protocol: the tracker links two peers, then tells the
//! target about the initiator.
//!
//! Best effort. Edges are added before the notice goes out and are kept
//! even when the notice fails; the failure is only logged and reported.

use std::time::Duration;

use tryst_core::wire::AcceptConnectionRequest;
use tryst_core::PeerAddress;

use crate::graph::ConnectionGraph;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notice to {peer} failed: {source}")]
    Transport {
        peer: String,
        source: reqwest::Error,
    },
    #[error("{peer} answered {status}")]
    Status { peer: String, status: u16 },
}

/// Outbound `/accept-connection` caller.
#[derive(Clone)]
pub struct IntroductionNotifier {
    client: reqwest::Client,
}

impl IntroductionNotifier {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Tell `target` that `initiator` is now connected to it.
    pub async fn notify(&self, target: &PeerAddress, initiator: &PeerAddress) -> Result<(), NotifyError> {
        let peer = target.key();
        let url = format!("http://{peer}/accept-connection");
        let body = AcceptConnectionRequest {
            from: initiator.clone(),
        };
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| NotifyError::Transport {
                peer: peer.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                peer,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct IntroductionOutcome {
    /// Whether the graph gained an edge in either direction.
    pub linked: bool,
    pub notice: Result<(), NotifyError>,
}

impl IntroductionOutcome {
    pub fn notified(&self) -> bool {
        self.notice.is_ok()
    }
}

pub async fn introduce(
    graph: &ConnectionGraph,
    notifier: &IntroductionNotifier,
    from: &PeerAddress,
    to: &PeerAddress,
) -> IntroductionOutcome {
    let linked = graph.link(from, to).await;
    let notice = notifier.notify(to, from).await;
    match &notice {
        Ok(()) => tracing::info!(from = %from, to = %to, linked, "peers introduced"),
        Err(e) => tracing::warn!(from = %from, to = %to, error = %e, "introduction notice failed"),
    }
    IntroductionOutcome { linked, notice }
}
