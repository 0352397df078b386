//! Peer node commands.

use anyhow::Result;
use tryst_core::wire::{MessagesResponse, SendMessageRequest, SendMessageResponse};
use tryst_core::PeerAddress;

use super::http::{base_url, get_json, post_json_body};

pub async fn cmd_messages(peer: &PeerAddress) -> Result<()> {
    let resp: MessagesResponse = get_json(&format!("{}/get-messages", base_url(peer))).await?;

    if resp.messages.is_empty() {
        println!("No messages on {peer}.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Messages on {peer} ({})", resp.messages.len());
    println!("═══════════════════════════════════════");
    for m in &resp.messages {
        println!("  [{:>4}] {}", m.seq, m.render());
    }

    Ok(())
}

pub async fn cmd_send(peer: &PeerAddress, sender: &str, content: &str) -> Result<()> {
    let req = SendMessageRequest {
        sender: sender.to_string(),
        content: content.to_string(),
    };
    let resp: SendMessageResponse =
        post_json_body(&format!("{}/send-message", base_url(peer)), &req).await?;

    println!("Message sent:");
    println!("  delivered : {}", resp.delivered);
    println!("  pruned    : {}", resp.pruned);
    Ok(())
}
