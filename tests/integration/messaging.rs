use crate::*;

use serde_json::json;

async fn send(peer: &Peer, sender: &str, content: &str) -> serde_json::Value {
    post_json(&peer.url("/send-message"), json!({"sender": sender, "content": content}))
        .await
        .unwrap()
}

/// The newest entry is the one just sent; the window holds 50.
#[tokio::test]
async fn test_send_message_then_get_messages_window() {
    let peer = start_peer().await;

    let resp = send(&peer, "alice", "hi").await;
    assert_eq!(resp["status"], "ok");
    let msgs = get_json(&peer.url("/get-messages")).await.unwrap();
    let last = msgs["messages"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["sender"], "alice");
    assert_eq!(last["content"], "hi");

    for i in 1..51 {
        send(&peer, "alice", &format!("m{i}")).await;
    }
    let msgs = get_json(&peer.url("/get-messages")).await.unwrap();
    let list = msgs["messages"].as_array().unwrap();
    assert_eq!(list.len(), 50);
    assert_eq!(list[0]["content"], "m1");
    assert_eq!(list[49]["content"], "m50");
}

/// Raw payloads get exactly `OK` and land in the log.
#[tokio::test]
async fn test_raw_payload_is_acknowledged_and_logged() {
    let peer = start_peer().await;

    let reply = exchange(&peer.addr, b"bob: over the wire").await.unwrap();
    assert_eq!(reply, b"OK");

    let msgs = get_json(&peer.url("/get-messages")).await.unwrap();
    let last = &msgs["messages"][0];
    assert_eq!(last["content"], "bob: over the wire");
    assert!(last["sender"].as_str().unwrap().starts_with("127.0.0.1:"));
}

/// Broadcast reaches live connections and prunes the dead one.
#[tokio::test]
async fn test_broadcast_prunes_unreachable_peers() {
    let sender = start_peer().await;
    let alive = start_peer().await;
    let dead = PeerAddress::new("127.0.0.1", free_port());

    sender.state.connections.accept(alive.addr.clone());
    sender.state.connections.accept(dead.clone());

    let resp = send(&sender, "carol", "hello all").await;
    assert_eq!(resp["delivered"], 1);
    assert_eq!(resp["pruned"], 1);
    assert_eq!(sender.state.connections.keys(), vec![alive.addr.key()]);

    let msgs = get_json(&alive.url("/get-messages")).await.unwrap();
    assert_eq!(msgs["messages"][0]["content"], "carol: hello all");

    let resp = send(&sender, "carol", "second").await;
    assert_eq!(resp["delivered"], 1);
    assert_eq!(resp["pruned"], 0);
}

/// Tracker introduction, then chat flows from the initiator's partner.
#[tokio::test]
async fn test_introduced_peer_receives_broadcast() {
    let tracker = start_tracker().await;
    let a = start_peer().await;
    let b = start_peer().await;

    post_json(
        &tracker.url("/connect-peer"),
        json!({"from": {"host": a.addr.host, "port": a.addr.port}, "to": {"host": b.addr.host, "port": b.addr.port}}),
    )
    .await
    .unwrap();

    // b learned about a, so b's broadcasts reach a.
    let resp = send(&b, "bob", "hey a").await;
    assert_eq!(resp["delivered"], 1);
    let msgs = get_json(&a.url("/get-messages")).await.unwrap();
    assert_eq!(msgs["messages"][0]["content"], "bob: hey a");
}

#[tokio::test]
async fn test_send_message_with_bad_body_is_400() {
    let peer = start_peer().await;
    let resp = http(&peer.addr, "POST", "/send-message", &[], r#"{"sender":"x"}"#)
        .await
        .unwrap();
    assert_eq!(resp.status, 400);
    assert!(peer.state.messages.is_empty());
}

#[tokio::test]
async fn test_peer_serves_landing_page() {
    let peer = start_peer().await;
    let resp = http(&peer.addr, "GET", "/", &[], "").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, LANDING_PAGE);
}
