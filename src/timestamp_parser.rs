//! Timestamp tokens
//!
//! Splits `YYYY-MM-DD;HH:MM:SS` into its six numeric components and hands them
//! to [`Timestamp::new`] for range and calendar checks.

use crate::error::TimestampError;
use crate::models::Timestamp;
use crate::normalizers::parse_unsigned;

/// Handles parsing `YYYY-MM-DD;HH:MM:SS` timestamp tokens from usage logs
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp token into a calendar-checked [`Timestamp`]
    pub fn parse(token: &str) -> Result<Timestamp, TimestampError> {
        let [date, time] = split_exact::<2>(token, ';')?;
        let [year, month, day] = split_exact::<3>(date, '-')?;
        let [hour, minute, second] = split_exact::<3>(time, ':')?;

        Timestamp::new(
            component(year)?,
            component(month)?,
            component(day)?,
            component(hour)?,
            component(minute)?,
            component(second)?,
        )
    }
}

fn split_exact<const N: usize>(s: &str, sep: char) -> Result<[&str; N], TimestampError> {
    let parts: Vec<&str> = s.split(sep).collect();
    parts.try_into().map_err(|_| TimestampError::Malformed)
}

fn component(part: &str) -> Result<u64, TimestampError> {
    parse_unsigned(part).ok_or_else(|| TimestampError::NotNumeric(part.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let ts = TimestampParser::parse("2024-03-01;10:15:30").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 3);
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 15);
        assert_eq!(ts.second(), 30);
    }

    #[test]
    fn test_parse_unpadded_components() {
        let ts = TimestampParser::parse("2024-3-1;8:5:9").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01;08:05:09");
    }

    #[test]
    fn test_parse_wrong_separators() {
        assert_eq!(
            TimestampParser::parse("2024-03-01T10:15:30"),
            Err(TimestampError::Malformed)
        );
        assert_eq!(
            TimestampParser::parse("2024-03-01;10:15:30;00"),
            Err(TimestampError::Malformed)
        );
        assert_eq!(
            TimestampParser::parse("2024-03;10:15:30"),
            Err(TimestampError::Malformed)
        );
        assert_eq!(
            TimestampParser::parse("2024-03-01;10:15"),
            Err(TimestampError::Malformed)
        );
    }

    #[test]
    fn test_parse_non_numeric() {
        assert_eq!(
            TimestampParser::parse("2024-MAR-01;10:15:30"),
            Err(TimestampError::NotNumeric("MAR".into()))
        );
        assert!(TimestampParser::parse("2024-03-01;10:+5:30").is_err());
        assert!(TimestampParser::parse("2024-03-;10:15:30").is_err());
    }

    #[test]
    fn test_parse_calendar_bounds() {
        assert!(TimestampParser::parse("2024-02-29;00:00:00").is_ok());
        assert!(TimestampParser::parse("2023-02-29;00:00:00").is_err());
        assert!(TimestampParser::parse("2024-06-31;00:00:00").is_err());
        assert!(TimestampParser::parse("2024-06-30;23:59:60").is_err());
    }

    #[test]
    fn test_parse_rejects_oversized_components() {
        // 2^32 + 1 would wrap to 1 if narrowed before the range check
        assert_eq!(
            TimestampParser::parse("2024-03-4294967297;10:15:30"),
            Err(TimestampError::OutOfRange {
                field: "day",
                value: 4_294_967_297
            })
        );
        assert!(TimestampParser::parse("4294969320-03-01;10:15:30").is_err());
        assert!(TimestampParser::parse("2024-4294967299-01;10:15:30").is_err());
        assert!(TimestampParser::parse("2024-03-01;4294967306:15:30").is_err());
        assert!(TimestampParser::parse("2024-03-01;10:4294967311:30").is_err());
        assert!(TimestampParser::parse("2024-03-01;10:15:4294967326").is_err());
    }
}
