use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Statistics about one ingestion pass over a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Lines read from the file
    pub lines_read: usize,

    /// Lines that passed validation and were folded in
    pub accepted: usize,

    /// Lines dropped by validation
    pub skipped: usize,

    /// Workers used (1 for sequential passes)
    pub workers: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl IngestStats {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    pub fn add_accepted(&mut self) {
        self.lines_read += 1;
        self.accepted += 1;
    }

    pub fn add_skipped(&mut self) {
        self.lines_read += 1;
        self.skipped += 1;
    }

    pub fn finish(&mut self, started: Instant) {
        #[allow(clippy::cast_possible_truncation)]
        {
            self.time_ms = started.elapsed().as_millis() as u64;
        }
    }

    /// Fold another pass into this one (used to total the auxiliary phase).
    pub fn merge(&mut self, other: &Self) {
        self.lines_read += other.lines_read;
        self.accepted += other.accepted;
        self.skipped += other.skipped;
        self.workers = self.workers.max(other.workers);
        self.time_ms += other.time_ms;
    }
}
