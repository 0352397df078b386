pub mod handlers;

use std::sync::Arc;

use tryst_core::config::{AuthConfig, ServerConfig};
use tryst_http::{App, AuthGate, Method, RouteTable, SessionStore, StaticFiles};

pub use handlers::peer::PeerRawHandler;
pub use handlers::{PeerState, TrackerState};

use handlers::{peer, tracker, with_state};

/// Peer endpoints reachable without a session. The tracker calls
/// `/accept-connection` and peers have no login page of their own.
pub const PEER_PUBLIC_PATHS: &[&str] = &["/", "/accept-connection", "/get-messages", "/send-message"];

pub fn tracker_routes(state: Arc<TrackerState>) -> RouteTable {
    RouteTable::builder()
        .route(Method::Get, "/", with_state(&state, tracker::index))
        .route(Method::Post, "/submit-info", with_state(&state, tracker::submit_info))
        .route(Method::Get, "/get-list", with_state(&state, tracker::get_list))
        .route(Method::Post, "/connect-peer", with_state(&state, tracker::connect_peer))
        .route(
            Method::Post,
            "/accept-connection",
            with_state(&state, tracker::accept_connection),
        )
        .route(
            Method::Get,
            "/get-connections",
            with_state(&state, tracker::get_connections),
        )
        .route(Method::Post, "/broadcast-peer", with_state(&state, tracker::broadcast_peer))
        .route(Method::Post, "/send-peer", with_state(&state, tracker::send_peer))
        .route(Method::Get, "/get-messages", with_state(&state, tracker::get_messages))
        .build()
}

pub fn peer_routes(state: Arc<PeerState>) -> RouteTable {
    RouteTable::builder()
        .route(Method::Get, "/", with_state(&state, peer::index))
        .route(
            Method::Post,
            "/accept-connection",
            with_state(&state, peer::accept_connection),
        )
        .route(Method::Get, "/get-messages", with_state(&state, peer::get_messages))
        .route(Method::Post, "/send-message", with_state(&state, peer::send_message))
        .build()
}

/// Tracker pipeline: tracker routes behind the configured gate.
pub fn tracker_app(state: Arc<TrackerState>, auth: &AuthConfig, server: &ServerConfig, sessions: SessionStore) -> App {
    App::new(
        tracker_routes(state),
        AuthGate::from_config(auth, sessions),
        StaticFiles::new(&server.static_root),
    )
}

/// Peer pipeline: the gate additionally lets [`PEER_PUBLIC_PATHS`] through.
pub fn peer_app(state: Arc<PeerState>, auth: &AuthConfig, server: &ServerConfig, sessions: SessionStore) -> App {
    let mut auth = auth.clone();
    for path in PEER_PUBLIC_PATHS {
        if !auth.public_paths.iter().any(|p| p == path) {
            auth.public_paths.push(path.to_string());
        }
    }
    App::new(
        peer_routes(state),
        AuthGate::from_config(&auth, sessions),
        StaticFiles::new(&server.static_root),
    )
}
