//! tryst-ctl: command-line client for tracker and peer nodes.

use std::time::Duration;

use anyhow::{Context, Result};
use tryst_core::config::DEFAULT_TRACKER_PORT;
use tryst_core::PeerAddress;
use tryst_services::TrackerClient;

mod cmd;

use cmd::{peer, tracker};

const DEFAULT_PEER_PORT: u16 = 8000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn print_usage() {
    println!("Usage: tryst-ctl [--tracker <host:port>] [--peer <host:port>] <command>");
    println!();
    println!("Tracker commands:");
    println!("  peers                       List registered peers");
    println!("  register <host> <port>      Register a peer address");
    println!("  connect <host:port> <host:port>");
    println!("                              Introduce two peers");
    println!("  connections                 Show the connection graph");
    println!();
    println!("Peer commands:");
    println!("  messages                    Show the last messages on the peer");
    println!("  send <sender> <content>     Send a message through the peer");
    println!();
    println!("Options:");
    println!("  --tracker <host:port>   Tracker address (default: 127.0.0.1:{DEFAULT_TRACKER_PORT})");
    println!("  --peer <host:port>      Peer address (default: 127.0.0.1:{DEFAULT_PEER_PORT})");
}

fn parse_addr(value: &str) -> Result<PeerAddress> {
    value
        .parse()
        .with_context(|| format!("expected host:port, got {value:?}"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --tracker / --peer options
    let mut tracker_addr = PeerAddress::new("127.0.0.1", DEFAULT_TRACKER_PORT);
    let mut peer_addr = PeerAddress::new("127.0.0.1", DEFAULT_PEER_PORT);
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--tracker" => {
                i += 1;
                tracker_addr = parse_addr(args.get(i).context("--tracker requires a value")?)?;
            }
            "--peer" => {
                i += 1;
                peer_addr = parse_addr(args.get(i).context("--peer requires a value")?)?;
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    let client = TrackerClient::new(&tracker_addr, REQUEST_TIMEOUT)?;

    match remaining.as_slice() {
        ["peers"] | [] => tracker::cmd_peers(&client).await,
        ["register", host, port] => {
            let port = port.parse().context("port must be a number")?;
            tracker::cmd_register(&client, &PeerAddress::new(*host, port)).await
        }
        ["connect", from, to] => {
            tracker::cmd_connect(&client, &parse_addr(from)?, &parse_addr(to)?).await
        }
        ["connections"] => tracker::cmd_connections(&client).await,
        ["messages"] => peer::cmd_messages(&peer_addr).await,
        ["send", sender, content @ ..] if !content.is_empty() => {
            peer::cmd_send(&peer_addr, sender, &content.join(" ")).await
        }
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
