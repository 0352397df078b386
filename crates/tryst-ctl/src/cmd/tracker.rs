//! Tracker commands.

use anyhow::Result;
use tryst_core::PeerAddress;
use tryst_services::TrackerClient;

pub async fn cmd_peers(tracker: &TrackerClient) -> Result<()> {
    let peers = tracker.peer_list().await?;

    if peers.is_empty() {
        println!("No peers registered with {}.", tracker.base_url());
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Registered Peers ({})", peers.len());
    println!("═══════════════════════════════════════");
    for p in &peers {
        println!("  • {}", p.key());
    }

    Ok(())
}

pub async fn cmd_register(tracker: &TrackerClient, me: &PeerAddress) -> Result<()> {
    let resp = tracker.register(me).await?;
    println!("Registered {me} with {}: {}", tracker.base_url(), resp.status);
    Ok(())
}

pub async fn cmd_connect(tracker: &TrackerClient, from: &PeerAddress, to: &PeerAddress) -> Result<()> {
    let resp = tracker.connect(from, to).await?;
    println!("Introduced {from} ↔ {to}: {}", resp.status);
    Ok(())
}

pub async fn cmd_connections(tracker: &TrackerClient) -> Result<()> {
    let resp = tracker.connections().await?;

    if resp.connected_peers.is_empty() {
        println!("No connections recorded.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Connection Graph");
    println!("═══════════════════════════════════════");
    for (key, neighbours) in &resp.connected_peers {
        println!("  ┌─ {key}");
        if neighbours.is_empty() {
            println!("  └─ (no neighbours)");
            continue;
        }
        let last = neighbours.len() - 1;
        for (i, n) in neighbours.iter().enumerate() {
            let branch = if i == last { "└─" } else { "│ " };
            println!("  {branch} {}", n.key());
        }
    }

    Ok(())
}
