//! Fixed-capacity batching buffer
//!
//! Backed by a `HeapRb`; a push into a full buffer overwrites the oldest
//! record, so pushes never fail and capacity is never exceeded.

use std::fmt;

use bytes::Bytes;
use contracts::Record;
use ringbuf::{traits::*, HeapRb};

/// Ring of the most recent `capacity` records, in insertion order
pub struct BatchBuffer {
    ring: HeapRb<Record>,
    evicted: u64,
}

impl fmt::Debug for BatchBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("evicted", &self.evicted)
            .finish()
    }
}

impl BatchBuffer {
    /// Create a buffer holding at most `capacity` records
    ///
    /// A capacity of 0 is treated as 1; channels reject it before this point.
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: HeapRb::new(capacity.max(1)),
            evicted: 0,
        }
    }

    /// Append a record, evicting the oldest when full
    #[inline]
    pub fn push(&mut self, record: Record) {
        if self.ring.push_overwrite(record).is_some() {
            self.evicted += 1;
        }
    }

    /// Buffered records, oldest first, without consuming them
    pub fn snapshot(&self) -> Vec<Record> {
        self.ring.iter().cloned().collect()
    }

    /// Current snapshot encoded as a JSON array of strings
    pub fn serialize_batch(&self) -> Result<Bytes, serde_json::Error> {
        let records: Vec<&Record> = self.ring.iter().collect();
        serde_json::to_vec(&records).map(Bytes::from)
    }

    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity().get()
    }

    /// Records overwritten since construction
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
