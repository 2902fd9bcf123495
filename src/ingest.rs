//! Usage Log Ingestion
//!
//! This module drives one ingestion run over a usage log: every line is
//! classified, validated, checked against the account index and then either
//! dispatched to the billing backend or written to the diagnostic error log.
//!
//! ## Processing Pipeline
//!
//! 1. **Read**: lines are read one at a time; bytes that are not UTF-8 are
//!    replaced rather than aborting the run
//! 2. **Classify**: [`classify_line`] applies the record grammar
//! 3. **Account check**: the source phone of a well-formed record must resolve
//!    in the [`AccountIndex`], otherwise the line becomes `NoAccount`
//! 4. **Dispatch or log**: accepted records go to the [`UsageDispatcher`],
//!    failures to the [`ErrorReporter`]
//!
//! A failing line never stops the run. Delivery failures from the billing
//! backend and failed error-log writes are collected in the [`IngestSummary`]
//! instead of being turned into parse errors.
//!
//! ## Resources
//!
//! [`run_ingestion`] owns the input file, the error log and the accepted-record
//! output for the duration of one run. They are opened before the first line is
//! read and released when the run returns, whichever way it exits. A read
//! failure part way through the log still flushes both outputs; the error is
//! an [`IncompleteRun`] carrying the summary of the lines already processed.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::accounts::{AccountIndex, AccountSource};
use crate::classifier::classify_line;
use crate::dispatch::{BillingBackend, DiscardBackend, JsonlBillingSink, UsageDispatcher};
use crate::error::LineError;
use crate::error_log::{open_error_log, ErrorReporter};
use crate::models::{Classification, RawLine, RecordKind, UsageRecord};

/// Accepted record that the billing backend refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub line_number: usize,
    pub kind: RecordKind,
    pub message: String,
}

/// Rejected line whose diagnostic entry could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogWriteFailure {
    pub line_number: usize,
    pub message: String,
}

/// Counts for one run, plus the failures that did not stop it.
///
/// Error log entries are flushed one at a time, so a write failure shows up in
/// `log_write_failures` against the line that caused it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub lines_read: usize,
    pub text: usize,
    pub call: usize,
    pub internet: usize,
    pub comments: usize,
    pub invalid_format: usize,
    pub unknown: usize,
    pub no_account: usize,
    pub delivery_failures: Vec<DeliveryFailure>,
    pub log_write_failures: Vec<LogWriteFailure>,
}

impl IngestSummary {
    fn record(&mut self, kind: RecordKind) {
        self.lines_read += 1;
        match kind {
            RecordKind::Text => self.text += 1,
            RecordKind::Call => self.call += 1,
            RecordKind::Internet => self.internet += 1,
            RecordKind::Comment => self.comments += 1,
            RecordKind::Unknown => self.unknown += 1,
            RecordKind::InvalidFormat => self.invalid_format += 1,
            RecordKind::NoAccount => self.no_account += 1,
        }
    }

    /// Records that passed validation, whether or not delivery succeeded.
    pub fn accepted(&self) -> usize {
        self.text + self.call + self.internet
    }

    pub fn rejected(&self) -> usize {
        self.invalid_format + self.unknown + self.no_account
    }

    pub fn dispatched(&self) -> usize {
        self.accepted() - self.delivery_failures.len()
    }
}

/// Reading the usage log failed before its end. Every line read up to that
/// point was processed and both outputs were flushed.
#[derive(Debug, Error)]
#[error("Failed to read usage log after line {}", .summary.lines_read)]
pub struct IncompleteRun {
    pub summary: IngestSummary,
    #[source]
    pub source: io::Error,
}

/// Classify a line and resolve its source phone. Pure: the same line and
/// index always give the same result.
pub fn evaluate_line(text: &str, accounts: &AccountIndex) -> Result<Classification, LineError> {
    let classification = classify_line(text)?;
    if let Classification::Usage(record) = &classification {
        if accounts
            .lookup_account_for_phone(record.source_phone())
            .is_none()
        {
            return Err(LineError::NoAccount {
                phone: record.source_phone().to_string(),
            });
        }
    }
    Ok(classification)
}

/// Line-by-line ingestion state for one run.
pub struct UsageIngestor<'a, B: BillingBackend, W: Write> {
    accounts: &'a AccountIndex,
    dispatcher: UsageDispatcher<B>,
    reporter: ErrorReporter<W>,
    line_number: usize,
    summary: IngestSummary,
}

impl<'a, B: BillingBackend, W: Write> UsageIngestor<'a, B, W> {
    pub fn new(
        accounts: &'a AccountIndex,
        dispatcher: UsageDispatcher<B>,
        reporter: ErrorReporter<W>,
    ) -> Self {
        Self {
            accounts,
            dispatcher,
            reporter,
            line_number: 0,
            summary: IngestSummary::default(),
        }
    }

    /// Process the next line of the log and return its outcome.
    pub fn process_line(&mut self, text: &str) -> RecordKind {
        self.line_number += 1;
        let line = RawLine::new(self.line_number, text);

        let kind = match evaluate_line(&line.text, self.accounts) {
            Ok(Classification::Comment) => RecordKind::Comment,
            Ok(Classification::Usage(record)) => {
                self.deliver(&line, &record);
                record.kind()
            }
            Err(err) => {
                debug!(line_number = line.line_number, error = %err, "Rejected line");
                self.log_rejection(&line, err.kind());
                err.kind()
            }
        };

        self.summary.record(kind);
        kind
    }

    fn deliver(&mut self, line: &RawLine, record: &UsageRecord) {
        if let Err(err) = self.dispatcher.dispatch(record) {
            warn!(
                line_number = line.line_number,
                kind = %record.kind(),
                error = %err,
                "Billing backend refused usage record"
            );
            self.summary.delivery_failures.push(DeliveryFailure {
                line_number: line.line_number,
                kind: record.kind(),
                message: err.to_string(),
            });
        }
    }

    fn log_rejection(&mut self, line: &RawLine, kind: RecordKind) {
        if let Err(err) = self.reporter.report(line, kind) {
            warn!(line_number = line.line_number, error = %err, "Failed to write error log entry");
            self.summary.log_write_failures.push(LogWriteFailure {
                line_number: line.line_number,
                message: err.to_string(),
            });
        }
    }

    /// Feed every line of `reader` through [`Self::process_line`].
    pub fn ingest_reader<R: BufRead>(&mut self, mut reader: R) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }
            if buf.ends_with(b"\n") {
                buf.pop();
                if buf.ends_with(b"\r") {
                    buf.pop();
                }
            }
            let text = String::from_utf8_lossy(&buf);
            self.process_line(&text);
        }
        Ok(())
    }

    pub fn summary(&self) -> &IngestSummary {
        &self.summary
    }

    /// Flush the backend and the error log and hand back the run summary.
    pub fn finish(mut self) -> Result<IngestSummary> {
        self.dispatcher
            .flush()
            .context("Failed to flush accepted usage records")?;
        self.reporter.flush().context("Failed to flush error log")?;
        Ok(self.summary)
    }

    /// Ingest all of `reader` and finish the run. The outputs are flushed even
    /// when reading stops early, in which case the error is an
    /// [`IncompleteRun`].
    pub fn run<R: BufRead>(mut self, reader: R) -> Result<IngestSummary> {
        let read_result = self.ingest_reader(reader);
        if let Err(err) = &read_result {
            warn!(
                line_number = self.line_number + 1,
                error = %err,
                "Usage log read failed, finishing run early"
            );
        }

        let summary = self.finish()?;
        match read_result {
            Ok(()) => Ok(summary),
            Err(source) => Err(IncompleteRun { summary, source }.into()),
        }
    }
}

/// Paths and formatting for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub input: PathBuf,
    pub error_log: PathBuf,
    /// Where accepted records are written as JSON lines; `None` discards them.
    pub accepted_output: Option<PathBuf>,
    pub timestamp_format: String,
}

/// Run one ingestion over `options.input`.
///
/// Fails without reading a single line if the account index cannot be loaded
/// or any of the input, error log or output files cannot be opened.
pub fn run_ingestion(options: &IngestOptions, accounts: &dyn AccountSource) -> Result<IngestSummary> {
    let run_id = Uuid::new_v4();
    let span = info_span!("ingest_run", run_id = %run_id, input = %options.input.display());
    let _enter = span.enter();

    let index = accounts.load_accounts()?;
    info!(accounts = index.len(), "Loaded account index");

    let input = File::open(&options.input)
        .with_context(|| format!("Failed to open usage log: {}", options.input.display()))?;
    let reporter = open_error_log(&options.error_log, &options.timestamp_format)?;
    let backend = open_backend(options.accepted_output.as_deref())?;

    let ingestor = UsageIngestor::new(&index, UsageDispatcher::new(backend), reporter);
    let summary = ingestor.run(BufReader::new(input))?;

    info!(
        lines = summary.lines_read,
        accepted = summary.accepted(),
        rejected = summary.rejected(),
        delivery_failures = summary.delivery_failures.len(),
        "Ingestion run complete"
    );

    Ok(summary)
}

fn open_backend(path: Option<&Path>) -> Result<Box<dyn BillingBackend>> {
    let Some(path) = path else {
        return Ok(Box::new(DiscardBackend));
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    Ok(Box::new(JsonlBillingSink::new(BufWriter::new(file))))
}
