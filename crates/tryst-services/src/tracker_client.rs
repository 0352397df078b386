//! Peer-side calls to the tracker.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tryst_core::wire::{
    ConnectPeerRequest, ConnectionsResponse, PeerListResponse, StatusResponse,
};
use tryst_core::PeerAddress;

#[derive(Clone)]
pub struct TrackerClient {
    base: String,
    client: reqwest::Client,
}

impl TrackerClient {
    pub fn new(tracker: &PeerAddress, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base: format!("http://{}", tracker.key()),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `POST /submit-info`
    pub async fn register(&self, me: &PeerAddress) -> Result<StatusResponse> {
        self.post("/submit-info", me).await
    }

    /// `GET /get-list`
    pub async fn peer_list(&self) -> Result<Vec<PeerAddress>> {
        let resp: PeerListResponse = self.get("/get-list").await?;
        Ok(resp.peers)
    }

    /// `POST /connect-peer`
    pub async fn connect(&self, from: &PeerAddress, to: &PeerAddress) -> Result<StatusResponse> {
        let body = ConnectPeerRequest {
            from: from.clone(),
            to: to.clone(),
        };
        self.post("/connect-peer", &body).await
    }

    /// `GET /get-connections`
    pub async fn connections(&self) -> Result<ConnectionsResponse> {
        self.get("/get-connections").await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = format!("{}{path}", self.base);
        self.client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach tracker at {url}"))?
            .error_for_status()
            .with_context(|| format!("tracker rejected GET {path}"))?
            .json::<R>()
            .await
            .context("failed to parse tracker response")
    }

    async fn post<T: Serialize, R: DeserializeOwned>(&self, path: &str, body: &T) -> Result<R> {
        let url = format!("{}{path}", self.base);
        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to reach tracker at {url}"))?
            .error_for_status()
            .with_context(|| format!("tracker rejected POST {path}"))?
            .json::<R>()
            .await
            .context("failed to parse tracker response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_tracker_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = TrackerClient::new(&PeerAddress::new("127.0.0.1", port), Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), format!("http://127.0.0.1:{port}"));
        let err = client.register(&PeerAddress::new("127.0.0.1", 8001)).await.unwrap_err();
        assert!(err.to_string().contains("failed to reach tracker"), "{err:#}");
    }
}
