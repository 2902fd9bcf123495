//! Core Data Models
//!
//! This module defines the data structures that flow through the ingestion
//! pipeline, from a raw log line to a normalized usage record.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`RawLine`] - One line read from the usage log, with its 1-based number
//! 2. **Classification**: [`Classification`] - A comment or a validated [`UsageRecord`]
//! 3. **Records**: [`TextRecord`], [`CallRecord`], [`InternetRecord`] - Normalized events
//!    handed to the billing backend
//!
//! ## Core Types
//!
//! - [`RecordKind`] - Tag of every possible line outcome, success or failure
//! - [`Timestamp`] - Calendar-checked `YYYY-MM-DD;HH:MM:SS` instant
//! - [`AccountId`] - Opaque account identifier owned by the billing system
//!
//! ## Features
//!
//! - **Serde Integration**: records serialize as tagged JSON objects with canonical
//!   timestamps, which is what the JSONL billing sink writes
//! - **Type Safety**: a [`Timestamp`] or record can only exist once every field passed
//!   validation

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TimestampError;

pub const MIN_YEAR: u64 = 1900;
pub const MAX_YEAR: u64 = 2100;

/// One line of the usage log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub line_number: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(line_number: usize, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
        }
    }
}

/// Tag of a classified line. `Text`, `Call`, `Internet` and `Comment` are
/// successful outcomes; the remaining kinds are logged as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Text,
    Call,
    Internet,
    Comment,
    Unknown,
    InvalidFormat,
    NoAccount,
}

impl RecordKind {
    /// Label written to the diagnostic log.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Text => "TEXT",
            RecordKind::Call => "CALL",
            RecordKind::Internet => "INTERNET",
            RecordKind::Comment => "COMMENT",
            RecordKind::Unknown => "UNKNOWN RECORD TYPE",
            RecordKind::InvalidFormat => "INVALID FORMAT",
            RecordKind::NoAccount => "NO ACCOUNT",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RecordKind::Unknown | RecordKind::InvalidFormat | RecordKind::NoAccount
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated instant between 1900-01-01;00:00:00 and 2100-12-31;23:59:59.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Build a timestamp from its components, checking every range before
    /// anything is constructed.
    pub fn new(
        year: u64,
        month: u64,
        day: u64,
        hour: u64,
        minute: u64,
        second: u64,
    ) -> Result<Self, TimestampError> {
        check_range("year", year, MIN_YEAR, MAX_YEAR)?;
        check_range("month", month, 1, 12)?;
        check_range("day", day, 1, 31)?;
        check_range("hour", hour, 0, 23)?;
        check_range("minute", minute, 0, 59)?;
        check_range("second", second, 0, 59)?;

        // Ranges above keep every cast lossless.
        let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).ok_or(
            TimestampError::OutOfRange {
                field: "day",
                value: day,
            },
        )?;
        let datetime = date
            .and_hms_opt(hour as u32, minute as u32, second as u32)
            .ok_or(TimestampError::Malformed)?;

        Ok(Self(datetime))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), TimestampError> {
    if value < min || value > max {
        return Err(TimestampError::OutOfRange { field, value });
    }
    Ok(())
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d;%H:%M:%S"))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRecord {
    pub source_phone: String,
    pub dest_phone: String,
    pub sent_at: Timestamp,
    pub byte_count: u64,
}

/// A completed call; `end_at` is always strictly after `start_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub source_phone: String,
    pub dest_phone: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
}

impl CallRecord {
    pub fn duration_seconds(&self) -> i64 {
        (self.end_at.as_naive() - self.start_at.as_naive()).num_seconds()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternetRecord {
    pub source_phone: String,
    pub used_at: Timestamp,
    pub megabytes: u64,
}

/// A validated usage event of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UsageRecord {
    Text(TextRecord),
    Call(CallRecord),
    Internet(InternetRecord),
}

impl UsageRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            UsageRecord::Text(_) => RecordKind::Text,
            UsageRecord::Call(_) => RecordKind::Call,
            UsageRecord::Internet(_) => RecordKind::Internet,
        }
    }

    /// The phone that gets billed.
    pub fn source_phone(&self) -> &str {
        match self {
            UsageRecord::Text(r) => &r.source_phone,
            UsageRecord::Call(r) => &r.source_phone,
            UsageRecord::Internet(r) => &r.source_phone,
        }
    }
}

/// Successful outcome of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Comment,
    Usage(UsageRecord),
}

impl Classification {
    pub fn kind(&self) -> RecordKind {
        match self {
            Classification::Comment => RecordKind::Comment,
            Classification::Usage(record) => record.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
