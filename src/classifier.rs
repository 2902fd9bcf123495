//! Line classifier
//!
//! Decides whether a log line is a comment or one of the usage record kinds,
//! and runs the matching validator.

use crate::error::{FormatError, LineError};
use crate::models::{Classification, UsageRecord};
use crate::validators::{
    validate_call, validate_internet, validate_text, CALL_KEYWORD, INTERNET_KEYWORD, TEXT_KEYWORD,
};

const COMMENT_MARKER: char = '-';

/// Classify one line of a usage log and validate it against the grammar of
/// its record kind.
///
/// Account resolution is not done here; a well-formed line whose source
/// phone has no account is still returned as `Ok`.
pub fn classify_line(text: &str) -> Result<Classification, LineError> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Err(FormatError::Blank.into());
    }
    if trimmed.starts_with(COMMENT_MARKER) {
        return Ok(Classification::Comment);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let record = match tokens[0] {
        TEXT_KEYWORD => UsageRecord::Text(validate_text(&tokens)?),
        CALL_KEYWORD => UsageRecord::Call(validate_call(&tokens)?),
        INTERNET_KEYWORD => UsageRecord::Internet(validate_internet(&tokens)?),
        keyword => {
            return Err(LineError::Unknown {
                keyword: keyword.to_string(),
            })
        }
    };

    Ok(Classification::Usage(record))
}
