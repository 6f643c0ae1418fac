//! Bounded record of recent external tool invocations, used by diagnostics.

use crate::models::CommandHistoryEntry;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const HISTORY_CAPACITY: usize = 100;

/// Append-only ring buffer of the most recent tracked invocations. Eviction
/// is strict FIFO with O(1) cost.
pub struct CommandHistoryLog {
    entries: Mutex<VecDeque<CommandHistoryEntry>>,
}

impl CommandHistoryLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
        }
    }

    pub fn record(&self, command: impl Into<String>, success: bool) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() == HISTORY_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(CommandHistoryEntry::new(command, success));
    }

    /// The last `n` entries in chronological order.
    pub fn recent(&self, n: usize) -> Vec<CommandHistoryEntry> {
        let entries = self.entries.lock().unwrap();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl Default for CommandHistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_never_exceeded() {
        let log = CommandHistoryLog::new();
        for i in 0..250 {
            log.record(format!("command {}", i), true);
        }

        assert_eq!(log.len(), HISTORY_CAPACITY);

        // The retained entries are the most recent ones, oldest first.
        let recent = log.recent(HISTORY_CAPACITY);
        assert_eq!(recent.first().map(|e| e.command.as_str()), Some("command 150"));
        assert_eq!(recent.last().map(|e| e.command.as_str()), Some("command 249"));
    }

    #[test]
    fn test_recent_returns_chronological_tail() {
        let log = CommandHistoryLog::new();
        log.record("first", true);
        log.record("second", false);
        log.record("third", true);

        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].command, "second");
        assert!(!recent[0].success);
        assert_eq!(recent[1].command, "third");
    }

    #[test]
    fn test_recent_larger_than_len() {
        let log = CommandHistoryLog::new();
        log.record("only", true);

        assert_eq!(log.recent(10).len(), 1);
        assert!(!log.is_empty());
    }
}
