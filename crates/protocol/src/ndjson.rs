//! Newline-delimited JSON emission.
//!
//! Every record becomes one self-contained JSON object on its own line. A record that fails
//! to serialize or to write is skipped; the remaining records are still emitted.

use serde::Serialize;
use std::io::{self, Write};

/// Outcome of one emission pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmitReport {
    /// Records written as a full line
    pub written: usize,

    /// Records dropped because of a serialization or write error
    pub skipped: usize,
}

/// Write `records` to `writer` as NDJSON.
///
/// Each line goes out through a single `write_all`, so a write error belongs to the record
/// being written. Pass an unbuffered writer: a buffered one defers write errors to the final
/// flush, which is the only failure that fails the call.
pub fn write_ndjson<T, W>(mut writer: W, records: &[T]) -> io::Result<EmitReport>
where
    T: Serialize,
    W: Write,
{
    let mut report = EmitReport::default();

    for (position, record) in records.iter().enumerate() {
        let mut line = match serde_json::to_vec(record) {
            Ok(line) => line,
            Err(err) => {
                log::warn!("Skipping record #{position}: serialization failed: {err}");
                report.skipped += 1;
                continue;
            }
        };
        line.push(b'\n');

        if let Err(err) = writer.write_all(&line) {
            log::warn!("Skipping record #{position}: write failed: {err}");
            report.skipped += 1;
            continue;
        }
        report.written += 1;
    }

    writer.flush()?;
    Ok(report)
}
