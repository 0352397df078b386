//! Tracker-side connection graph.
//!
//! Undirected: every edge is stored once in each endpoint's neighbour list.
//! Neighbour membership compares addresses, not generated identifiers.

use std::collections::BTreeMap;

use tokio::sync::Mutex;
use tryst_core::PeerAddress;

#[derive(Default)]
pub struct ConnectionGraph {
    edges: Mutex<BTreeMap<String, Vec<PeerAddress>>>,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `addr` has an entry, possibly with no neighbours.
    pub async fn ensure(&self, addr: &PeerAddress) {
        self.edges.lock().await.entry(addr.key()).or_default();
    }

    /// Link `a` and `b` in both directions. Returns true if either
    /// direction was new.
    pub async fn link(&self, a: &PeerAddress, b: &PeerAddress) -> bool {
        let mut edges = self.edges.lock().await;
        let forward = push_unique(edges.entry(a.key()).or_default(), b);
        let backward = push_unique(edges.entry(b.key()).or_default(), a);
        forward || backward
    }

    pub async fn neighbors(&self, key: &str) -> Vec<PeerAddress> {
        self.edges.lock().await.get(key).cloned().unwrap_or_default()
    }

    pub async fn snapshot(&self) -> BTreeMap<String, Vec<PeerAddress>> {
        self.edges.lock().await.clone()
    }

    /// Number of directed entries across all neighbour lists.
    pub async fn edge_count(&self) -> usize {
        self.edges.lock().await.values().map(Vec::len).sum()
    }
}

fn push_unique(list: &mut Vec<PeerAddress>, addr: &PeerAddress) -> bool {
    if list.contains(addr) {
        return false;
    }
    list.push(addr.clone());
    true
}
