//! Peer addressing.
//!
//! A peer is identified by its canonical key `host:port`. Two addresses
//! name the same peer iff their keys are equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Network address of a peer as announced over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddress {
    /// Accepts `ip` for payloads produced by older clients.
    #[serde(alias = "ip")]
    pub host: String,
    pub port: u16,
}

impl PeerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Canonical peer-key.
    pub fn key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("missing ':' in peer address {0:?}")]
    MissingPort(String),
    #[error("invalid port in peer address {0:?}")]
    InvalidPort(String),
    #[error("empty host in peer address {0:?}")]
    EmptyHost(String),
}

impl FromStr for PeerAddress {
    type Err = ParseAddressError;

    /// Parse `host:port`. The split happens on the last ':' so bracketless
    /// IPv6 hosts keep their colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseAddressError::MissingPort(s.to_string()))?;
        if host.is_empty() {
            return Err(ParseAddressError::EmptyHost(s.to_string()));
        }
        let port = port
            .parse()
            .map_err(|_| ParseAddressError::InvalidPort(s.to_string()))?;
        Ok(Self::new(host, port))
    }
}
