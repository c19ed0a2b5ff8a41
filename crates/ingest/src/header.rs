//! Header grammar: one kind letter followed by nine decimal digits.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. length of the trimmed, uppercased header is exactly 10
//! 2. characters 1..10 are ASCII digits
//! 3. character 0 is `S`, `E` or `T`
use crate::error::ValidationError;
use crate::types::{MessageHeader, MessageKind};

pub const HEADER_LEN: usize = 10;

/// Parse and classify a raw header.
///
/// ```rust
/// use ingest::{parse_header, MessageKind};
///
/// let header = parse_header(" e000000042 ").unwrap();
/// assert_eq!(header.text, "E000000042");
/// assert_eq!(header.kind, MessageKind::Email);
/// assert_eq!(header.id, 42);
/// ```
pub fn parse_header(raw: &str) -> Result<MessageHeader, ValidationError> {
    let text = raw.trim().to_uppercase();

    let actual = text.chars().count();
    if actual != HEADER_LEN {
        return Err(ValidationError::HeaderLengthInvalid { actual });
    }

    let mut chars = text.chars();
    let Some(prefix) = chars.next() else {
        return Err(ValidationError::HeaderLengthInvalid { actual });
    };
    let digits: String = chars.collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::HeaderNotNumeric { digits });
    }
    // Nine digits always fit in a u32.
    let id = digits
        .parse::<u32>()
        .map_err(|_| ValidationError::HeaderNotNumeric {
            digits: digits.clone(),
        })?;

    let kind =
        MessageKind::from_prefix(prefix).ok_or(ValidationError::HeaderKindUnrecognised { prefix })?;

    Ok(MessageHeader { text, kind, id })
}
