use crate::*;

fn client(tracker: &Tracker) -> TrackerClient {
    TrackerClient::new(&tracker.addr, Duration::from_secs(2)).unwrap()
}

/// Register, list, introduce and read the graph through the typed client.
#[tokio::test]
async fn test_tracker_client_round_trip() {
    let tracker = start_tracker().await;
    let a = start_peer().await;
    let b = start_peer().await;
    let client = client(&tracker);

    for peer in [&a, &b, &a] {
        let resp = client.register(&peer.addr).await.unwrap();
        assert_eq!(resp.status, "ok");
    }
    let mut expected = vec![a.addr.clone(), b.addr.clone()];
    expected.sort_by_key(|p| p.key());
    assert_eq!(client.peer_list().await.unwrap(), expected);

    let resp = client.connect(&a.addr, &b.addr).await.unwrap();
    assert_eq!(resp.status, "ok");
    assert!(b.state.connections.contains(&a.addr.key()));

    let graph = client.connections().await.unwrap();
    assert_eq!(graph.status, "ok");
    assert_eq!(graph.connected_peers.len(), 2);
    assert_eq!(graph.connected_peers[&a.addr.key()], vec![b.addr.clone()]);
    assert_eq!(graph.connected_peers[&b.addr.key()], vec![a.addr.clone()]);
}

#[tokio::test]
async fn test_tracker_client_sees_empty_tracker() {
    let tracker = start_tracker().await;
    let client = client(&tracker);
    assert!(client.peer_list().await.unwrap().is_empty());
    assert!(client.connections().await.unwrap().connected_peers.is_empty());
}
