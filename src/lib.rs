//! Usage Ingest Library
//!
//! Ingestion pipeline for telecom usage logs. A usage log is a line-oriented
//! text file describing customer text, call and internet activity:
//!
//! ```text
//! - nightly batch 2024-03-01
//! TEXT 1234567890 9876543210 2024-03-01;10:15:30 512B
//! CALL 1234567890 9876543210 2024-03-01;09:00:00 2024-03-01;10:00:00
//! INTERNET 1234567890 2024-03-01;08:00:00 100MB
//! ```
//!
//! Every line is classified, validated and normalized. Accepted records are
//! handed to a [`dispatch::BillingBackend`]; rejected lines are written to a
//! diagnostic error log with their line number and error kind.
//!
//! ## Architecture Overview
//!
//! - [`normalizers`] / [`timestamp_parser`] - Phone, quantity and timestamp tokens
//! - [`validators`] - One validator per record kind
//! - [`classifier`] - Comment/blank detection and keyword dispatch
//! - [`error_log`] - Append-only diagnostic log of rejected lines
//! - [`ingest`] - The per-run driver and its summary
//! - [`dispatch`] - Billing backend seam and the JSONL sink
//! - [`accounts`] - Phone-to-account index
//! - [`config`] / [`logging`] / [`display`] - Ambient CLI plumbing
//!
//! ## Example
//!
//! ```rust
//! use usage_ingest::accounts::AccountIndex;
//! use usage_ingest::dispatch::{DiscardBackend, UsageDispatcher};
//! use usage_ingest::error_log::ErrorReporter;
//! use usage_ingest::ingest::UsageIngestor;
//! use usage_ingest::models::{AccountId, RecordKind};
//!
//! let accounts = AccountIndex::from_entries([("1234567890", AccountId("ACC-1".into()))]);
//! let mut ingestor = UsageIngestor::new(
//!     &accounts,
//!     UsageDispatcher::new(DiscardBackend),
//!     ErrorReporter::new(Vec::new(), "%Y-%m-%d %H:%M:%S"),
//! );
//!
//! let kind = ingestor.process_line("INTERNET 1234567890 2024-03-01;08:00:00 100MB");
//! assert_eq!(kind, RecordKind::Internet);
//! ```

pub mod accounts;
pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod error_log;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod normalizers;
pub mod timestamp_parser;
pub mod validators;

pub use classifier::classify_line;
pub use ingest::{run_ingestion, IncompleteRun, IngestOptions, IngestSummary, UsageIngestor};
pub use models::*;
