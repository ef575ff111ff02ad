// src/log.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time since the Unix epoch.
    pub at: Duration,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", format_time_of_day(self.at), self.message)
    }
}

/// Per-game record of move outcomes. Owned by the game, never global.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self { EventLog::default() }

    /// Appends a timestamped line. Blank messages are ignored.
    pub fn add(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message.trim().is_empty() { return; }
        let at = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        self.entries.push(LogEntry { at, message });
    }

    /// Oldest first.
    pub fn entries(&self) -> &[LogEntry] { &self.entries }

    pub fn newest_first(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter().rev()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.entries.last().map(|e| e.message.as_str())
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.entries.len() { return false; }
        self.entries.remove(index);
        true
    }

    /// Drops every entry past the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) { self.entries.truncate(len); }
}

// HH:MM:SS (UTC)
fn format_time_of_day(since_epoch: Duration) -> String {
    let secs = since_epoch.as_secs() % SECONDS_PER_DAY;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_render_with_timestamp() {
        let entry = LogEntry { at: Duration::from_secs(3 * 3600 + 25 * 60 + 7), message: "Valid move: e2 to e4".into() };
        assert_eq!(entry.to_string(), "[03:25:07] Valid move: e2 to e4");
    }

    #[test]
    fn blank_messages_are_dropped_and_order_is_kept() {
        let mut log = EventLog::new();
        log.add("first");
        log.add("   ");
        log.add("second");
        assert_eq!(log.len(), 2);
        assert_eq!(log.newest_first().next().unwrap().message, "second");
        assert_eq!(log.last_message(), Some("second"));
        assert!(log.remove(0));
        assert!(!log.remove(5));
        assert_eq!(log.entries()[0].message, "second");
    }
}
