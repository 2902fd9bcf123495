//! Typed rejection reasons
//!
//! Per-line failures never abort a run. They are plain values carried in
//! `Result`s so the ingestion loop can match on them and move to the next
//! line. Run-level failures (cannot open a file, bad configuration) use
//! `anyhow` instead.

use crate::models::RecordKind;
use thiserror::Error;

/// Why a `YYYY-MM-DD;HH:MM:SS` token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("expected YYYY-MM-DD;HH:MM:SS")]
    Malformed,
    #[error("`{0}` is not an unsigned number")]
    NotNumeric(String),
    #[error("{field} {value} is out of range")]
    OutOfRange { field: &'static str, value: u64 },
}

/// Why a unit-suffixed quantity such as `512B` was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("missing `{unit}` suffix")]
    MissingUnit { unit: &'static str },
    #[error("`{0}` is not an unsigned number")]
    NotNumeric(String),
    #[error("{value} is outside [{min}, {max}]")]
    OutOfRange { value: u64, min: u64, max: u64 },
}

/// Syntax or range violation anywhere in a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("blank line")]
    Blank,
    #[error("wrong token count for {keyword}: expected {expected}, found {found}")]
    Arity {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("phone `{token}` does not contain exactly 10 digits")]
    Phone { token: String },
    #[error("timestamp `{token}`: {source}")]
    Timestamp {
        token: String,
        #[source]
        source: TimestampError,
    },
    #[error("quantity `{token}`: {source}")]
    Quantity {
        token: String,
        #[source]
        source: QuantityError,
    },
    #[error("call ends at {end} which is not after its start {start}")]
    CallNotAfterStart { start: String, end: String },
}

/// Terminal-failure outcome of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("invalid format: {0}")]
    InvalidFormat(#[from] FormatError),
    #[error("unknown record type `{keyword}`")]
    Unknown { keyword: String },
    #[error("no account for phone {phone}")]
    NoAccount { phone: String },
}

impl LineError {
    pub fn kind(&self) -> RecordKind {
        match self {
            LineError::InvalidFormat(_) => RecordKind::InvalidFormat,
            LineError::Unknown { .. } => RecordKind::Unknown,
            LineError::NoAccount { .. } => RecordKind::NoAccount,
        }
    }
}

/// Failure reported by the billing collaborator after a record was accepted.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("billing backend rejected the record: {0}")]
    Rejected(String),
    #[error("failed to write usage event")]
    Io(#[from] std::io::Error),
    #[error("failed to encode usage event")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_error_kinds() {
        assert_eq!(
            LineError::from(FormatError::Blank).kind(),
            RecordKind::InvalidFormat
        );
        assert_eq!(
            LineError::Unknown { keyword: "FAX".into() }.kind(),
            RecordKind::Unknown
        );
        assert_eq!(
            LineError::NoAccount { phone: "1234567890".into() }.kind(),
            RecordKind::NoAccount
        );
    }

    #[test]
    fn test_arity_message() {
        let err = FormatError::Arity {
            keyword: "CALL",
            expected: 5,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "wrong token count for CALL: expected 5, found 4"
        );
    }
}
