//! The two recommendation drivers and the pieces they share.
//!
//! Both run the same linear sequence of stages:
//!
//! ```text
//! ValidateInputs -> IngestAuxiliaryFiles -> IngestPrimaryFile -> AwaitCompletion
//!     -> Score -> Rank -> Emit -> Done
//! ```
//!
//! A failure before the primary phase aborts the run with no output written.

mod project;
mod user;

pub use project::ProjectRecommendTask;
pub use user::UserRecommendTask;

use anyhow::{bail, Context, Result};
use recommend_indexer::{ingest_activity_file, ActivityIndex, ActivitySource, IngestStats};
use recommend_protocol::{write_ndjson, EmitReport};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateInputs,
    IngestAuxiliaryFiles,
    IngestPrimaryFile,
    AwaitCompletion,
    Score,
    Rank,
    Emit,
    Done,
}

impl Stage {
    pub fn next(self) -> Self {
        match self {
            Self::ValidateInputs => Self::IngestAuxiliaryFiles,
            Self::IngestAuxiliaryFiles => Self::IngestPrimaryFile,
            Self::IngestPrimaryFile => Self::AwaitCompletion,
            Self::AwaitCompletion => Self::Score,
            Self::Score => Self::Rank,
            Self::Rank => Self::Emit,
            Self::Emit | Self::Done => Self::Done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidateInputs => "ValidateInputs",
            Self::IngestAuxiliaryFiles => "IngestAuxiliaryFiles",
            Self::IngestPrimaryFile => "IngestPrimaryFile",
            Self::AwaitCompletion => "AwaitCompletion",
            Self::Score => "Score",
            Self::Rank => "Rank",
            Self::Emit => "Emit",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Walks a driver through its stages, one step at a time.
pub struct StageTracker {
    task: &'static str,
    current: Stage,
    entered: Instant,
    started: Instant,
}

impl StageTracker {
    pub fn start(task: &'static str) -> Self {
        let now = Instant::now();
        log::info!("{task}: {}", Stage::ValidateInputs);
        Self {
            task,
            current: Stage::ValidateInputs,
            entered: now,
            started: now,
        }
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    /// Move to the following stage.
    pub fn advance(&mut self) {
        let next = self.current.next();
        log::debug!(
            "{}: {} finished in {} ms",
            self.task,
            self.current,
            self.entered.elapsed().as_millis()
        );
        log::info!("{}: {}", self.task, next);
        self.current = next;
        self.entered = Instant::now();
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Check the input count and that every input is an existing regular file.
pub(crate) fn validate_inputs(
    task: &str,
    roles: &[&str],
    inputs: &[PathBuf],
    output: &Path,
) -> Result<()> {
    if inputs.len() < roles.len() {
        bail!(
            "{task} needs {} input files ({}), got {}",
            roles.len(),
            roles.join(", "),
            inputs.len()
        );
    }
    if inputs.len() > roles.len() {
        log::warn!(
            "{task}: ignoring {} extra input file(s)",
            inputs.len() - roles.len()
        );
    }
    for (role, path) in roles.iter().zip(inputs) {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("{task}: cannot read {role} file {}", path.display()))?;
        if !meta.is_file() {
            bail!("{task}: {role} input {} is not a file", path.display());
        }
    }
    if output.as_os_str().is_empty() {
        bail!("{task}: output path is empty");
    }
    Ok(())
}

/// Fold each `(path, source)` pair into `index`, in order. Any I/O failure is fatal.
pub(crate) async fn ingest_auxiliary(
    index: &mut ActivityIndex,
    files: &[(&Path, ActivitySource)],
) -> Result<IngestStats> {
    let mut total = IngestStats::new(1);
    for (path, source) in files {
        let stats = ingest_activity_file(index, path, *source)
            .await
            .with_context(|| format!("Failed to ingest {}", path.display()))?;
        total.merge(&stats);
    }
    Ok(total)
}

pub(crate) fn create_output(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Cannot create output {}", path.display()))
}

/// Write `records` as NDJSON, one unbuffered write per line. A record whose write fails is
/// skipped; a failed flush is fatal.
pub(crate) fn emit<T, W>(writer: W, path: &Path, records: &[T]) -> Result<EmitReport>
where
    T: Serialize,
    W: Write,
{
    let report = write_ndjson(writer, records)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    if report.skipped > 0 {
        log::warn!(
            "{} of {} records could not be written to {}",
            report.skipped,
            records.len(),
            path.display()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recommend_protocol::UserRecommendation;
    use std::io;
    use tempfile::TempDir;

    /// Fails the first write, accepts everything after it.
    struct FailFirstWrite {
        failed: bool,
        lines: Vec<u8>,
    }

    impl Write for FailFirstWrite {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(io::Error::new(io::ErrorKind::Other, "disk hiccup"));
            }
            self.lines.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn recommendation(id: i64, score: f64) -> UserRecommendation {
        UserRecommendation {
            id,
            name: format!("u{id}"),
            description: String::new(),
            score,
        }
    }

    #[test]
    fn stages_advance_linearly_to_done() {
        let mut stage = Stage::ValidateInputs;
        let mut seen = vec![stage];
        while stage != Stage::Done {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(seen.len(), 8);
        assert_eq!(Stage::Done.next(), Stage::Done);
    }

    #[test]
    fn tracker_follows_stage_order() {
        let mut tracker = StageTracker::start("Test");
        tracker.advance();
        tracker.advance();
        assert_eq!(tracker.current(), Stage::IngestPrimaryFile);
    }

    #[test]
    fn validation_rejects_short_input_lists_and_missing_files() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("a.tsv");
        std::fs::write(&present, "").unwrap();
        let output = dir.path().join("out.json");

        let err = validate_inputs("T", &["a", "b"], &[present.clone()], &output).unwrap_err();
        assert!(err.to_string().contains("needs 2 input files"));

        let missing = dir.path().join("missing.tsv");
        let err = validate_inputs("T", &["a", "b"], &[present.clone(), missing], &output)
            .unwrap_err();
        assert!(err.to_string().contains("cannot read b file"));

        let err = validate_inputs("T", &["a"], &[dir.path().to_path_buf()], &output).unwrap_err();
        assert!(err.to_string().contains("not a file"));

        validate_inputs("T", &["a"], &[present], &output).unwrap();
    }

    #[test]
    fn emit_skips_only_the_record_whose_write_failed() {
        let records = vec![
            recommendation(1, 0.9),
            recommendation(2, 0.5),
            recommendation(3, 0.1),
        ];
        let mut writer = FailFirstWrite {
            failed: false,
            lines: Vec::new(),
        };

        let report = emit(&mut writer, Path::new("out.json"), &records).unwrap();

        assert_eq!(report, EmitReport { written: 2, skipped: 1 });
        let text = String::from_utf8(writer.lines).unwrap();
        let ids: Vec<i64> = text
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["id"].as_i64().unwrap()
            })
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn emit_to_file_writes_every_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let file = create_output(&path).unwrap();
        let records = vec![recommendation(1, 0.9), recommendation(2, 0.5)];

        let report = emit(file, &path, &records).unwrap();

        assert_eq!(report, EmitReport { written: 2, skipped: 0 });
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
