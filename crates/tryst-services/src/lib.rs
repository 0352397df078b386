//! tryst-services: rendezvous state and the outbound side of the overlay.
//!
//! The tracker owns a [`PeerRegistry`] and a [`ConnectionGraph`]; each peer
//! owns a [`PeerConnections`] set it broadcasts to. Both keep a
//! [`MessageLog`]. None of the shared structures hold a lock across socket I/O.

pub mod fanout;
pub mod graph;
pub mod introduction;
pub mod message_log;
pub mod peer_connections;
pub mod registry;
pub mod tracker_client;

pub use fanout::{broadcast, send_text, BroadcastReport, SendError};
pub use graph::ConnectionGraph;
pub use introduction::{introduce, IntroductionNotifier, IntroductionOutcome, NotifyError};
pub use message_log::MessageLog;
pub use peer_connections::PeerConnections;
pub use registry::{PeerRegistry, RegisteredPeer};
pub use tracker_client::TrackerClient;
