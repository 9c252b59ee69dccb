//! # Event Log
//!
//! Each manager records what it did in an append-only `EventLog`. Records are
//! numbered from zero in append order, which is also call order because
//! appends happen under the manager's write lock.

use serde::{Deserialize, Serialize};

use certify_core::Timestamp;

/// One appended event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord<E> {
    /// Position in the log, starting at zero.
    pub sequence: u64,
    /// When the event was appended.
    pub timestamp: Timestamp,
    /// The event payload.
    pub event: E,
}

/// Append-only event log.
#[derive(Debug, Clone)]
pub struct EventLog<E> {
    records: Vec<EventRecord<E>>,
}

impl<E: Clone> EventLog<E> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append an event and return its sequence number.
    pub fn append(&mut self, event: E) -> u64 {
        let sequence = self.records.len() as u64;
        self.records.push(EventRecord {
            sequence,
            timestamp: Timestamp::now(),
            event,
        });
        sequence
    }

    /// All records in order.
    pub fn records(&self) -> &[EventRecord<E>] {
        &self.records
    }

    /// Records with `sequence >= from`.
    pub fn since(&self, from: u64) -> Vec<EventRecord<E>> {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.records.len());
        self.records[start..].to_vec()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<E: Clone> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_follows_append_order() {
        let mut log = EventLog::new();
        assert_eq!(log.append("created"), 0);
        assert_eq!(log.append("renamed"), 1);
        let events: Vec<_> = log.records().iter().map(|r| r.event).collect();
        assert_eq!(events, vec!["created", "renamed"]);
    }

    #[test]
    fn test_since() {
        let mut log = EventLog::new();
        for i in 0..5u32 {
            log.append(i);
        }
        let tail = log.since(3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 3);
        assert!(log.since(10).is_empty());
    }

    #[test]
    fn test_record_serializes() {
        let mut log = EventLog::new();
        log.append(serde_json::json!({"kind": "ProfileCreated"}));
        let json = serde_json::to_value(&log.records()[0]).unwrap();
        assert_eq!(json["sequence"], 0);
        assert!(json["timestamp"].is_string());
    }
}
