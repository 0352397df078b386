//! Connections a peer has accepted, i.e. the broadcast targets.

use std::sync::Arc;

use dashmap::DashMap;
use tryst_core::PeerAddress;

#[derive(Clone, Default)]
pub struct PeerConnections {
    peers: Arc<DashMap<String, PeerAddress>>,
}

impl PeerConnections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `addr` as connected. Returns true if it was new.
    pub fn accept(&self, addr: PeerAddress) -> bool {
        self.peers.insert(addr.key(), addr).is_none()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.peers.contains_key(key)
    }

    /// Peer-keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.peers.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Owned copy of the set. Iterate this, not the live map.
    pub fn snapshot(&self) -> Vec<PeerAddress> {
        self.peers.iter().map(|e| e.value().clone()).collect()
    }

    /// Remove every listed key. Returns how many were present.
    pub fn remove_all<'a>(&self, keys: impl IntoIterator<Item = &'a String>) -> usize {
        keys.into_iter()
            .filter(|k| self.peers.remove(k.as_str()).is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
