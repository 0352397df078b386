//! peerd: a chat peer. HTTP and raw P2P messages share one port.
//!
//! Usage: peerd --ip <ip> --port <port> --tracker-ip <ip> --tracker-port <port>
//!
//! Flags are optional when the config file or TRYST_PEER__* variables
//! already provide the values.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use tryst_api::{peer_app, PeerRawHandler, PeerState};
use tryst_core::config::TrystConfig;
use tryst_core::PeerAddress;
use tryst_http::{session, RawPayloadHandler, Server, ServerLimits, SessionStore};
use tryst_services::{MessageLog, PeerConnections, TrackerClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = TrystConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let mut config = TrystConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        TrystConfig::default()
    });
    apply_flags(&mut config, std::env::args().skip(1))?;

    let bind_addr = resolve(&config.peer.host, config.peer.port).await?;
    let sessions = SessionStore::with_ttl(config.auth.session_ttl());
    if let Some(ttl) = config.auth.session_ttl() {
        tokio::spawn(session::expiry_loop(sessions.clone(), ttl));
    }

    let me = PeerAddress::new(config.peer.host.clone(), config.peer.port);
    tracing::info!(peer = %me, "peerd starting");

    let state = Arc::new(PeerState {
        me: me.clone(),
        connections: PeerConnections::new(),
        messages: MessageLog::new(),
        send_timeout: config.fanout.send_timeout(),
        static_root: config.server.static_root.clone(),
    });
    let raw: Arc<dyn RawPayloadHandler> = Arc::new(PeerRawHandler::new(state.clone()));
    let app = peer_app(state, &config.auth, &config.server, sessions);

    let server = Server::bind(bind_addr, app, ServerLimits::from(&config.server))
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %server.local_addr(), "listening (HTTP + P2P)");
    let serving = tokio::spawn(server.serve(Some(raw)));

    if config.peer.register_on_start {
        let tracker = PeerAddress::new(config.peer.tracker_host.clone(), config.peer.tracker_port);
        register(&tracker, &me, config.introduction.timeout()).await;
    }

    if let Err(e) = serving.await {
        tracing::error!(error = %e, "server task exited");
        bail!("server task exited: {e}");
    }
    Ok(())
}

/// Announce ourselves to the tracker. Failure is logged, not fatal.
async fn register(tracker: &PeerAddress, me: &PeerAddress, timeout: std::time::Duration) {
    let client = match TrackerClient::new(tracker, timeout) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "failed to build tracker client");
            return;
        }
    };
    match client.register(me).await {
        Ok(_) => tracing::info!(tracker = %tracker, "registered with tracker"),
        Err(e) => tracing::warn!(tracker = %tracker, error = %format!("{e:#}"), "registration failed"),
    }
}

/// Apply `--ip`, `--port`, `--tracker-ip`, `--tracker-port` over the config.
fn apply_flags(config: &mut TrystConfig, args: impl IntoIterator<Item = String>) -> Result<()> {
    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        let mut value = || args.next().with_context(|| format!("{flag} needs a value"));
        match flag.as_str() {
            "--ip" => config.peer.host = value()?,
            "--port" => config.peer.port = parse_port(&value()?)?,
            "--tracker-ip" => config.peer.tracker_host = value()?,
            "--tracker-port" => config.peer.tracker_port = parse_port(&value()?)?,
            "-h" | "--help" => {
                println!(
                    "usage: peerd --ip <ip> --port <port> --tracker-ip <ip> --tracker-port <port>"
                );
                std::process::exit(0);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(())
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .parse()
        .with_context(|| format!("invalid port: {value}"))
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve {host}:{port}"))?
        .next()
        .with_context(|| format!("no address for {host}:{port}"))
}
