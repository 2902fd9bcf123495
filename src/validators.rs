//! Record validators
//!
//! One validator per record kind. Each receives the full whitespace-split
//! token list of a line, keyword included, and either returns a normalized
//! record or the first [`FormatError`] it meets. Validators hold no state, so
//! validating the same tokens twice always gives the same answer.

use crate::error::FormatError;
use crate::models::{CallRecord, InternetRecord, TextRecord, Timestamp};
use crate::normalizers::{normalize_phone, parse_quantity, QuantityUnit, BYTES, MEGABYTES};
use crate::timestamp_parser::TimestampParser;

pub const TEXT_KEYWORD: &str = "TEXT";
pub const CALL_KEYWORD: &str = "CALL";
pub const INTERNET_KEYWORD: &str = "INTERNET";

/// `TEXT src dst time bytes`
pub fn validate_text(tokens: &[&str]) -> Result<TextRecord, FormatError> {
    let [_, src, dst, time, bytes] = expect_tokens::<5>(TEXT_KEYWORD, tokens)?;

    Ok(TextRecord {
        source_phone: phone(src)?,
        dest_phone: phone(dst)?,
        sent_at: timestamp(time)?,
        byte_count: quantity(bytes, BYTES)?,
    })
}

/// `CALL src dst start end`, where `end` must be strictly after `start`.
pub fn validate_call(tokens: &[&str]) -> Result<CallRecord, FormatError> {
    let [_, src, dst, start, end] = expect_tokens::<5>(CALL_KEYWORD, tokens)?;

    let source_phone = phone(src)?;
    let dest_phone = phone(dst)?;
    let start_at = timestamp(start)?;
    let end_at = timestamp(end)?;

    if end_at <= start_at {
        return Err(FormatError::CallNotAfterStart {
            start: start_at.to_string(),
            end: end_at.to_string(),
        });
    }

    Ok(CallRecord {
        source_phone,
        dest_phone,
        start_at,
        end_at,
    })
}

/// `INTERNET src time megabytes`
pub fn validate_internet(tokens: &[&str]) -> Result<InternetRecord, FormatError> {
    let [_, src, time, megabytes] = expect_tokens::<4>(INTERNET_KEYWORD, tokens)?;

    Ok(InternetRecord {
        source_phone: phone(src)?,
        used_at: timestamp(time)?,
        megabytes: quantity(megabytes, MEGABYTES)?,
    })
}

fn expect_tokens<'a, const N: usize>(
    keyword: &'static str,
    tokens: &[&'a str],
) -> Result<[&'a str; N], FormatError> {
    tokens.try_into().map_err(|_| FormatError::Arity {
        keyword,
        expected: N,
        found: tokens.len(),
    })
}

fn phone(token: &str) -> Result<String, FormatError> {
    normalize_phone(token).ok_or_else(|| FormatError::Phone {
        token: token.to_string(),
    })
}

fn timestamp(token: &str) -> Result<Timestamp, FormatError> {
    TimestampParser::parse(token).map_err(|source| FormatError::Timestamp {
        token: token.to_string(),
        source,
    })
}

fn quantity(token: &str, unit: QuantityUnit) -> Result<u64, FormatError> {
    parse_quantity(token, unit).map_err(|source| FormatError::Quantity {
        token: token.to_string(),
        source,
    })
}
