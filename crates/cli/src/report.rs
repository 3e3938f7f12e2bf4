use recommend_indexer::IngestStats;
use recommend_protocol::EmitReport;
use serde::Serialize;
use std::path::PathBuf;

/// Summary of one completed task run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub task: String,

    /// All auxiliary files, folded sequentially
    pub auxiliary: IngestStats,

    /// The primary entity file, folded by the worker pool
    pub primary: IngestStats,

    /// Entities that received a score
    pub candidates: usize,

    pub emitted: EmitReport,
    pub output: PathBuf,
    pub time_ms: u64,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "{}: {} candidates, {} written, {} skipped -> {} ({} ms)",
            self.task,
            self.candidates,
            self.emitted.written,
            self.emitted.skipped,
            self.output.display(),
            self.time_ms
        )
    }
}
