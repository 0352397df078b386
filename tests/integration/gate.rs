use crate::*;

/// Tracker listening on a port the gate does not exempt.
async fn gated_tracker() -> Tracker {
    let auth = AuthConfig {
        exempt_port: None,
        ..AuthConfig::default()
    };
    start_tracker_on(free_port(), auth, server_config()).await
}

async fn login(tracker: &Tracker, form: &str) -> RawResponse {
    http(
        &tracker.addr,
        "POST",
        "/login",
        &["Content-Type: application/x-www-form-urlencoded"],
        form,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_unauthenticated_request_redirects_to_login() {
    let tracker = gated_tracker().await;
    let resp = http(&tracker.addr, "GET", "/get-connections", &[], "").await.unwrap();
    assert_eq!(resp.status, 302);
    assert_eq!(resp.header("Location"), Some("/login.html"));

    // The login page itself is public.
    let resp = http(&tracker.addr, "GET", "/login.html", &[], "").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, LOGIN_PAGE);
}

#[tokio::test]
async fn test_exempt_port_skips_the_gate() {
    let tracker = start_tracker().await;
    let resp = http(&tracker.addr, "GET", "/get-connections", &[], "").await.unwrap();
    assert_eq!(resp.status, 200);
    assert!(resp.header("Set-Cookie").is_none());
}

#[tokio::test]
async fn test_public_tracker_endpoints_skip_the_gate() {
    let tracker = gated_tracker().await;
    let resp = http(&tracker.addr, "GET", "/get-list", &[], "").await.unwrap();
    assert_eq!(resp.status, 200);
}

#[tokio::test]
async fn test_login_sets_cookie_and_serves_landing_page() {
    let tracker = gated_tracker().await;

    let resp = login(&tracker, "username=admin&password=password").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, LANDING_PAGE);
    let cookie = resp.header("Set-Cookie").unwrap().to_string();
    assert!(cookie.starts_with("sessionid="), "{cookie}");
    assert!(cookie.contains("HttpOnly"));

    let token = cookie.split(';').next().unwrap();
    let cookie_line = format!("Cookie: {token}");
    let resp = http(&tracker.addr, "GET", "/get-connections", &[&cookie_line], "")
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json()["status"], "ok");

    let resp = http(&tracker.addr, "GET", "/get-connections", &["Cookie: sessionid=forged"], "")
        .await
        .unwrap();
    assert_eq!(resp.status, 302);
}

#[tokio::test]
async fn test_wrong_credentials_are_401() {
    let tracker = gated_tracker().await;
    let resp = login(&tracker, "username=admin&password=guess").await;
    assert_eq!(resp.status, 401);
    assert!(resp.body.contains("Invalid username or password."));
    assert!(resp.header("Set-Cookie").is_none());
}

#[tokio::test]
async fn test_unknown_path_and_garbage_are_404() {
    let tracker = start_tracker().await;
    let resp = http(&tracker.addr, "GET", "/missing.html", &[], "").await.unwrap();
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body, "404 Not Found");

    let raw = exchange(&tracker.addr, b"\x00\x01garbage").await.unwrap();
    assert!(raw.starts_with(b"HTTP/1.1 404"));
}

/// With every permit held, the next connection is shed with 503.
#[tokio::test]
async fn test_connection_limit_sheds_with_503() {
    let port = free_port();
    let server = ServerConfig {
        max_connections: 1,
        read_timeout_ms: 3_000,
        ..server_config()
    };
    let auth = AuthConfig {
        exempt_port: Some(port),
        ..AuthConfig::default()
    };
    let tracker = start_tracker_on(port, auth, server).await;

    // Connects and never writes, holding the only permit until the read
    // deadline.
    let _idle = TcpStream::connect(tracker.addr.key()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Read without writing: the 503 is sent right after accept.
    let mut shed = TcpStream::connect(tracker.addr.key()).await.unwrap();
    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), shed.read_to_end(&mut raw))
        .await
        .unwrap()
        .unwrap();
    assert!(raw.starts_with(b"HTTP/1.1 503"), "{}", String::from_utf8_lossy(&raw));
}
