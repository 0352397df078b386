//! Chat message log entries.

use serde::{Deserialize, Serialize};

/// Number of entries returned by message log queries.
pub const RECENT_WINDOW: usize = 50;

/// One entry of a per-process message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLogEntry {
    /// Arrival order within the owning log, starting at 0.
    pub seq: u64,
    pub sender: String,
    pub content: String,
}

impl MessageLogEntry {
    /// Text form sent over raw peer-to-peer sockets.
    pub fn render(&self) -> String {
        format!("{}: {}", self.sender, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_joins_sender_and_content() {
        let entry = MessageLogEntry {
            seq: 3,
            sender: "alice".into(),
            content: "hi".into(),
        };
        assert_eq!(entry.render(), "alice: hi");
    }
}
