//! tryst-core: shared types, wire bodies, and configuration.
//! All other tryst crates depend on this one.

pub mod config;
pub mod message;
pub mod peer;
pub mod wire;

pub use message::{MessageLogEntry, RECENT_WINDOW};
pub use peer::PeerAddress;
