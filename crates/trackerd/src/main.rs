//! trackerd: the rendezvous node peers register with.
//!
//! Usage: trackerd [--server-ip <ip>] [--server-port <port>]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use tryst_api::{tracker_app, TrackerState};
use tryst_core::config::TrystConfig;
use tryst_http::{session, Server, ServerLimits, SessionStore};
use tryst_services::{registry, ConnectionGraph, IntroductionNotifier, MessageLog, PeerRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = TrystConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let mut config = TrystConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        TrystConfig::default()
    });
    apply_flags(&mut config, std::env::args().skip(1))?;
    config.auth.follow_tracker_port(config.tracker.port);

    let addr = resolve(&config.tracker.host, config.tracker.port).await?;
    tracing::info!(%addr, "trackerd starting");

    // Shared state
    let registry = PeerRegistry::new();
    let sessions = SessionStore::with_ttl(config.auth.session_ttl());
    let notifier = IntroductionNotifier::new(config.introduction.timeout())
        .context("failed to build introduction client")?;
    let state = Arc::new(TrackerState {
        registry: registry.clone(),
        graph: ConnectionGraph::new(),
        messages: MessageLog::new(),
        notifier,
        static_root: config.server.static_root.clone(),
    });

    // Expiry
    if let Some(ttl) = config.auth.session_ttl() {
        tokio::spawn(session::expiry_loop(sessions.clone(), ttl));
    }
    if let Some(ttl) = config.registry.peer_ttl() {
        tracing::info!(ttl_secs = ttl.as_secs(), "peer expiry enabled");
        tokio::spawn(registry::expiry_loop(registry, ttl));
    }

    let app = tracker_app(state, &config.auth, &config.server, sessions);
    let server = Server::bind(addr, app, ServerLimits::from(&config.server))
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %server.local_addr(), "tracker listening");

    if let Err(e) = tokio::spawn(server.serve(None)).await {
        tracing::error!(error = %e, "server task exited");
        bail!("server task exited: {e}");
    }
    Ok(())
}

/// Apply `--server-ip` / `--server-port` over the loaded config.
fn apply_flags(config: &mut TrystConfig, args: impl IntoIterator<Item = String>) -> Result<()> {
    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--server-ip" => {
                config.tracker.host = args.next().context("--server-ip needs a value")?;
            }
            "--server-port" => {
                let value = args.next().context("--server-port needs a value")?;
                config.tracker.port = value
                    .parse()
                    .with_context(|| format!("invalid port: {value}"))?;
            }
            "-h" | "--help" => {
                println!("usage: trackerd [--server-ip <ip>] [--server-port <port>]");
                std::process::exit(0);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(())
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve {host}:{port}"))?
        .next()
        .with_context(|| format!("no address for {host}:{port}"))
}
