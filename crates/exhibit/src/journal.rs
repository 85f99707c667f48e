use std::collections::VecDeque;

use serde::Serialize;

/// One diagnostics entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub kind: &'static str,
    pub message: String,
}

/// Bounded session journal for the diagnostics panel. The oldest entries
/// are dropped once `capacity` is reached.
#[derive(Debug)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
    next_sequence: u64,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 0,
        }
    }

    pub fn record(&mut self, kind: &'static str, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            sequence: self.next_sequence,
            kind,
            message: message.into(),
        });
        self.next_sequence += 1;
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<JournalEntry> {
        self.entries.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Journal;

    #[test]
    fn sequences_keep_counting_past_capacity() {
        let mut j = Journal::new(2);
        j.record("a", "one");
        j.record("b", "two");
        j.record("c", "three");
        let seqs: Vec<u64> = j.entries().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(j.entries().next().map(|e| e.kind), Some("b"));
    }

    #[test]
    fn drain_clears_entries() {
        let mut j = Journal::new(4);
        j.record("k", "m");
        assert_eq!(j.drain().len(), 1);
        assert!(j.is_empty());
        j.record("k", "again");
        assert_eq!(j.entries().next().map(|e| e.sequence), Some(1));
    }
}
