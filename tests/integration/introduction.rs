use crate::*;

use serde_json::json;

fn connect_body(from: &PeerAddress, to: &PeerAddress) -> serde_json::Value {
    json!({
        "from": {"ip": from.host, "port": from.port},
        "to": {"ip": to.host, "port": to.port},
    })
}

/// The notice reaches the target, which then lists the initiator.
#[tokio::test]
async fn test_connect_peer_notifies_target() {
    let tracker = start_tracker().await;
    let a = start_peer().await;
    let b = start_peer().await;

    let resp = post_json(&tracker.url("/connect-peer"), connect_body(&a.addr, &b.addr))
        .await
        .unwrap();
    assert_eq!(resp["status"], "ok");

    assert!(b.state.connections.contains(&a.addr.key()));
    assert!(!a.state.connections.contains(&b.addr.key()));

    let graph = get_json(&tracker.url("/get-connections")).await.unwrap();
    assert_eq!(graph["connected_peers"][a.addr.key()][0]["port"], b.addr.port);
    assert_eq!(graph["connected_peers"][b.addr.key()][0]["port"], a.addr.port);
}

/// Repeating an introduction leaves one edge per direction.
#[tokio::test]
async fn test_connect_peer_is_idempotent() {
    let tracker = start_tracker().await;
    let a = start_peer().await;
    let b = start_peer().await;

    for _ in 0..3 {
        post_json(&tracker.url("/connect-peer"), connect_body(&a.addr, &b.addr))
            .await
            .unwrap();
    }
    assert_eq!(tracker.state.graph.edge_count().await, 2);
    assert_eq!(b.state.connections.len(), 1);
}

/// A dead target still yields ok; the edges stay.
#[tokio::test]
async fn test_connect_peer_to_dead_target_still_succeeds() {
    let tracker = start_tracker().await;
    let a = start_peer().await;
    let dead = PeerAddress::new("127.0.0.1", free_port());

    let resp = post_json(&tracker.url("/connect-peer"), connect_body(&a.addr, &dead))
        .await
        .unwrap();
    assert_eq!(resp["status"], "ok");
    assert_eq!(tracker.state.graph.neighbors(&a.addr.key()).await, vec![dead.clone()]);
    assert_eq!(tracker.state.graph.neighbors(&dead.key()).await, vec![a.addr.clone()]);
}

#[tokio::test]
async fn test_get_connections_is_a_mapping_when_empty() {
    let tracker = start_tracker().await;
    let graph = get_json(&tracker.url("/get-connections")).await.unwrap();
    assert_eq!(graph["status"], "ok");
    assert_eq!(graph["connected_peers"], json!({}));
}

/// The tracker's own /accept-connection only records the entry.
#[tokio::test]
async fn test_tracker_accept_connection_creates_empty_entry() {
    let tracker = start_tracker().await;
    let resp = post_json(
        &tracker.url("/accept-connection"),
        json!({"from": {"host": "127.0.0.1", "port": 8009}}),
    )
    .await
    .unwrap();
    assert_eq!(resp["status"], "ok");
    let graph = get_json(&tracker.url("/get-connections")).await.unwrap();
    assert_eq!(graph["connected_peers"]["127.0.0.1:8009"], json!([]));
}
