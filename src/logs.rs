use crate::types::LogEntry;

/// Default ceiling on retained entries.
pub const DEFAULT_LOG_CAPACITY: usize = 2000;

/// Entries kept when a full ring is trimmed.
pub const DEFAULT_LOG_RETAIN: usize = 1000;

/// Append-only, capacity-bounded activity log.
///
/// A full ring is trimmed in one batch down to the newest `retain` entries
/// before the next entry is pushed, so the trim runs once per
/// `capacity - retain` appends rather than on every insert.
#[derive(Debug, Clone)]
pub struct LogRing {
    entries: Vec<LogEntry>,
    capacity: usize,
    retain: usize,
}

impl LogRing {
    /// `retain` is clamped below `capacity`; config validation rejects
    /// anything else before it gets here.
    pub fn new(capacity: usize, retain: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::new(),
            capacity,
            retain: retain.min(capacity - 1),
        }
    }

    pub fn append(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.capacity {
            let excess = self.entries.len() - self.retain;
            self.entries.drain(..excess);
        }
        self.entries.push(entry);
    }

    /// All retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY, DEFAULT_LOG_RETAIN)
    }
}
