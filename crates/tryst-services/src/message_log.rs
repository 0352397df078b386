use std::sync::Mutex;

use tryst_core::MessageLogEntry;

/// Append-only per-process chat log.
///
/// The lock is never held across an await point, so a std mutex suffices.
#[derive(Default)]
pub struct MessageLog {
    inner: Mutex<LogInner>,
}

#[derive(Default)]
struct LogInner {
    next_seq: u64,
    entries: Vec<MessageLogEntry>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the stored entry.
    pub fn append(&self, sender: impl Into<String>, content: impl Into<String>) -> MessageLogEntry {
        let mut inner = self.lock();
        let entry = MessageLogEntry {
            seq: inner.next_seq,
            sender: sender.into(),
            content: content.into(),
        };
        inner.next_seq += 1;
        inner.entries.push(entry.clone());
        entry
    }

    /// Last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<MessageLogEntry> {
        let inner = self.lock();
        let start = inner.entries.len().saturating_sub(n);
        inner.entries[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
