//! Diagnostic error log
//!
//! Every rejected line of a run becomes one [`ErrorLogEntry`], appended to the
//! run's error log as a single text line:
//!
//! ```text
//! 2024-03-01 10:15:30 | line 3 | INVALID FORMAT | CALL 1234567890 ...
//! ```
//!
//! Entries are never rewritten. Each entry is flushed as soon as it is
//! written, so a failed write is returned for the line that caused it and the
//! reporter stays usable for the next line.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::models::{RawLine, RecordKind};

#[derive(Debug, Clone, Serialize)]
pub struct ErrorLogEntry {
    pub timestamp: DateTime<Local>,
    pub line_number: usize,
    pub kind: RecordKind,
    pub raw_text: String,
}

impl ErrorLogEntry {
    pub fn render(&self, timestamp_format: &str) -> String {
        format!(
            "{} | line {} | {} | {}",
            self.timestamp.format(timestamp_format),
            self.line_number,
            self.kind.label(),
            self.raw_text
        )
    }
}

pub struct ErrorReporter<W: Write> {
    writer: W,
    timestamp_format: String,
}

impl<W: Write> ErrorReporter<W> {
    pub fn new(writer: W, timestamp_format: impl Into<String>) -> Self {
        Self {
            writer,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Record a rejected line, stamped with the current wall-clock time.
    pub fn report(&mut self, line: &RawLine, kind: RecordKind) -> io::Result<()> {
        self.report_at(line, kind, Local::now())
    }

    pub fn report_at(
        &mut self,
        line: &RawLine,
        kind: RecordKind,
        timestamp: DateTime<Local>,
    ) -> io::Result<()> {
        debug_assert!(kind.is_failure(), "only failures are logged, got {kind:?}");

        let entry = ErrorLogEntry {
            timestamp,
            line_number: line.line_number,
            kind,
            raw_text: line.text.clone(),
        };

        writeln!(self.writer, "{}", entry.render(&self.timestamp_format))?;
        self.writer.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Open (or create) an error log for appending.
pub fn open_error_log(
    path: &Path,
    timestamp_format: &str,
) -> Result<ErrorReporter<BufWriter<File>>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create error log directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open error log: {}", path.display()))?;

    Ok(ErrorReporter::new(BufWriter::new(file), timestamp_format))
}
