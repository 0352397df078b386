//! HTTP helpers for peer commands. Tracker commands go through
//! `TrackerClient`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tryst_core::PeerAddress;

pub fn base_url(node: &PeerAddress) -> String {
    format!("http://{}", node.key())
}

pub async fn get_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T> {
    reqwest::get(url)
        .await
        .with_context(|| format!("failed to connect to {url}, is the node running?"))?
        .error_for_status()
        .with_context(|| format!("request to {url} was rejected"))?
        .json::<T>()
        .await
        .context("failed to parse response")
}

pub async fn post_json_body<T, R>(url: &str, body: &T) -> Result<R>
where
    T: Serialize,
    R: for<'de> Deserialize<'de>,
{
    reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .with_context(|| format!("failed to connect to {url}, is the node running?"))?
        .error_for_status()
        .with_context(|| format!("request to {url} was rejected"))?
        .json::<R>()
        .await
        .context("failed to parse response")
}
