//! Peer registry: every peer that announced itself via `/submit-info`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tryst_core::PeerAddress;

#[derive(Debug, Clone)]
pub struct RegisteredPeer {
    pub address: PeerAddress,
    /// Last time this peer (re-)registered.
    pub last_seen: Instant,
}

/// Keyed by peer-key. Clones share state.
#[derive(Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<DashMap<String, RegisteredPeer>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh. Returns true if the peer was not known before.
    pub fn register(&self, address: PeerAddress) -> bool {
        let key = address.key();
        let fresh = self
            .peers
            .insert(
                key.clone(),
                RegisteredPeer {
                    address,
                    last_seen: Instant::now(),
                },
            )
            .is_none();
        tracing::info!(peer = %key, fresh, "peer registered");
        fresh
    }

    /// All registered addresses, ordered by peer-key.
    pub fn list(&self) -> Vec<PeerAddress> {
        let mut entries: Vec<(String, PeerAddress)> = self
            .peers
            .iter()
            .map(|e| (e.key().clone(), e.value().address.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, addr)| addr).collect()
    }

    pub fn get(&self, key: &str) -> Option<RegisteredPeer> {
        self.peers.get(key).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Drop peers not seen within `ttl`. Returns how many were removed.
    pub fn evict_stale(&self, ttl: Duration) -> usize {
        let before = self.peers.len();
        self.peers.retain(|_, p| p.last_seen.elapsed() < ttl);
        before.saturating_sub(self.peers.len())
    }
}

/// Periodically evict stale registrations.
///
/// Never returns. Abort the spawned task to stop it.
pub async fn expiry_loop(registry: PeerRegistry, ttl: Duration) {
    let check_interval = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    let mut interval = tokio::time::interval(check_interval);

    loop {
        interval.tick().await;
        let removed = registry.evict_stale(ttl);
        if removed > 0 {
            tracing::info!(removed, remaining = registry.len(), "stale peers evicted");
        }
    }
}
