//! Field normalizers
//!
//! Pure functions turning raw tokens into normalized field values. Phone tokens
//! keep only their digits; quantity tokens lose their unit suffix. Timestamps
//! live in [`crate::timestamp_parser`].

use crate::error::QuantityError;

pub const PHONE_DIGITS: usize = 10;

/// Unit suffix and inclusive bounds of a quantity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityUnit {
    pub suffix: &'static str,
    pub min: u64,
    pub max: u64,
}

/// Bytes of a text message.
pub const BYTES: QuantityUnit = QuantityUnit {
    suffix: "B",
    min: 0,
    max: 1_000_000,
};

/// Megabytes of an internet session.
pub const MEGABYTES: QuantityUnit = QuantityUnit {
    suffix: "MB",
    min: 1,
    max: 100_000,
};

/// Strip formatting characters from a phone token. Returns the digits when
/// exactly ten remain.
pub fn normalize_phone(token: &str) -> Option<String> {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == PHONE_DIGITS).then_some(digits)
}

/// Parse a quantity token such as `512B` or `50MB`.
pub fn parse_quantity(token: &str, unit: QuantityUnit) -> Result<u64, QuantityError> {
    let number = token
        .strip_suffix(unit.suffix)
        .ok_or(QuantityError::MissingUnit { unit: unit.suffix })?;
    let value =
        parse_unsigned(number).ok_or_else(|| QuantityError::NotNumeric(number.to_string()))?;

    if value < unit.min || value > unit.max {
        return Err(QuantityError::OutOfRange {
            value,
            min: unit.min,
            max: unit.max,
        });
    }
    Ok(value)
}

/// Decimal digits only: no sign, no whitespace, no empty string.
pub(crate) fn parse_unsigned(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_plain() {
        assert_eq!(normalize_phone("1234567890").as_deref(), Some("1234567890"));
    }

    #[test]
    fn test_phone_formatting_stripped() {
        assert_eq!(
            normalize_phone("(123)456-7890").as_deref(),
            Some("1234567890")
        );
        assert_eq!(normalize_phone("+1-234.567.8901"), None);
        assert_eq!(normalize_phone("123.456.7890").as_deref(), Some("1234567890"));
    }

    #[test]
    fn test_phone_wrong_digit_count() {
        assert_eq!(normalize_phone("123456789"), None);
        assert_eq!(normalize_phone("12345678901"), None);
        assert_eq!(normalize_phone("phone"), None);
        assert_eq!(normalize_phone(""), None);
    }

    #[test]
    fn test_quantity_round_trip() {
        assert_eq!(parse_quantity("512B", BYTES), Ok(512));
        assert_eq!(parse_quantity("0B", BYTES), Ok(0));
        assert_eq!(parse_quantity("1000000B", BYTES), Ok(1_000_000));
        assert_eq!(parse_quantity("50MB", MEGABYTES), Ok(50));
        assert_eq!(parse_quantity("100000MB", MEGABYTES), Ok(100_000));
    }

    #[test]
    fn test_quantity_out_of_range() {
        assert_eq!(
            parse_quantity("1000001B", BYTES),
            Err(QuantityError::OutOfRange {
                value: 1_000_001,
                min: 0,
                max: 1_000_000
            })
        );
        assert!(parse_quantity("100001MB", MEGABYTES).is_err());
        assert!(parse_quantity("0MB", MEGABYTES).is_err());
    }

    #[test]
    fn test_quantity_rejects_signs_and_units() {
        assert_eq!(
            parse_quantity("-5B", BYTES),
            Err(QuantityError::NotNumeric("-5".into()))
        );
        assert!(parse_quantity("+5B", BYTES).is_err());
        assert_eq!(
            parse_quantity("512", BYTES),
            Err(QuantityError::MissingUnit { unit: "B" })
        );
        assert_eq!(
            parse_quantity("50KB", MEGABYTES),
            Err(QuantityError::MissingUnit { unit: "MB" })
        );
        // `50MB` as bytes leaves `50M`
        assert!(parse_quantity("50MB", BYTES).is_err());
        assert!(parse_quantity("B", BYTES).is_err());
        assert!(parse_quantity("99999999999999999999999B", BYTES).is_err());
    }
}
