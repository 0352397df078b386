use crate::*;

use serde_json::json;

/// Registration is an upsert keyed by host:port; discovery returns the set.
#[tokio::test]
async fn test_get_list_returns_each_registered_peer_once() {
    let tracker = start_tracker().await;

    for port in [8003, 8001, 8002, 8001, 8003] {
        let resp = post_json(&tracker.url("/submit-info"), json!({"ip": "127.0.0.1", "port": port}))
            .await
            .unwrap();
        assert_eq!(resp["status"], "ok");
    }

    let list = get_json(&tracker.url("/get-list")).await.unwrap();
    assert_eq!(list["status"], "ok");
    let ports: Vec<u64> = list["peers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["port"].as_u64().unwrap())
        .collect();
    assert_eq!(ports, vec![8001, 8002, 8003]);
    assert_eq!(list["peers"][0]["host"], "127.0.0.1");
}

/// A body that is not JSON is rejected and changes nothing.
#[tokio::test]
async fn test_submit_info_rejects_unparsable_body() {
    let tracker = start_tracker().await;
    post_json(&tracker.url("/submit-info"), json!({"host": "10.0.0.1", "port": 9000}))
        .await
        .unwrap();

    let resp = http(&tracker.addr, "POST", "/submit-info", &[], "{\"host\": ")
        .await
        .unwrap();
    assert_eq!(resp.status, 400);
    assert_eq!(resp.header("Content-Type"), Some("application/json"));
    assert!(!resp.json()["error"].as_str().unwrap().is_empty());

    let resp = http(&tracker.addr, "POST", "/submit-info", &[], r#"{"host":"10.0.0.2"}"#)
        .await
        .unwrap();
    assert_eq!(resp.status, 400);

    assert_eq!(tracker.state.registry.len(), 1);
}

/// The tracker's /get-messages needs a body; a bare GET is a 400.
#[tokio::test]
async fn test_tracker_get_messages_requires_body() {
    let tracker = start_tracker().await;

    let resp = http(&tracker.addr, "GET", "/get-messages", &[], "").await.unwrap();
    assert_eq!(resp.status, 400);
    assert!(resp.json()["error"].is_string());

    let resp = http(
        &tracker.addr,
        "GET",
        "/get-messages",
        &[],
        r#"{"from":"127.0.0.1:8001","message":"hi"}"#,
    )
    .await
    .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json()["status"], "received");
}

/// Every response carries the standard header set.
#[tokio::test]
async fn test_responses_carry_standard_headers() {
    let tracker = start_tracker().await;
    let resp = http(&tracker.addr, "GET", "/get-list", &[], "").await.unwrap();
    assert!(resp.head.starts_with("HTTP/1.1 200 OK"));
    assert_eq!(resp.header("Connection"), Some("close"));
    assert_eq!(resp.header("content-length"), Some(resp.body.len().to_string().as_str()));
    assert!(resp.header("Server").unwrap().starts_with("tryst/"));
    assert!(resp.header("Date").unwrap().ends_with("GMT"));
}

#[tokio::test]
async fn test_send_and_broadcast_peer_are_acknowledged() {
    let tracker = start_tracker().await;

    let resp = post_json(
        &tracker.url("/send-peer"),
        json!({"from": {"ip": "127.0.0.1", "port": 8001}, "message": "hi tracker"}),
    )
    .await
    .unwrap();
    assert_eq!(resp["status"], "ok");
    let logged = tracker.state.messages.recent(1);
    assert_eq!(logged[0].render(), "127.0.0.1:8001: hi tracker");

    let resp = post_json(&tracker.url("/broadcast-peer"), json!({"message": "all"}))
        .await
        .unwrap();
    assert_eq!(resp["status"], "ok");
}
