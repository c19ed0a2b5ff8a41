//! Error types produced by the validation stage.
//!
//! Every rejection is typed so the caller can show the message verbatim or
//! branch on the variant. Validation runs strictly before any aggregate is
//! touched, so none of these errors ever leaves stored state half-updated.
//!
//! | Error | Raised when |
//! |-------|-------------|
//! | [`HeaderLengthInvalid`](ValidationError::HeaderLengthInvalid) | trimmed header is not 10 characters |
//! | [`HeaderNotNumeric`](ValidationError::HeaderNotNumeric) | characters 1..10 are not all digits |
//! | [`HeaderKindUnrecognised`](ValidationError::HeaderKindUnrecognised) | prefix is not S, E or T |
//! | [`PlaceholderNotReplaced`](ValidationError::PlaceholderNotReplaced) | body still starts with the input prompt |
//! | [`BodyIncomplete`](ValidationError::BodyIncomplete) | too few body lines for the kind |
//! | [`BodyTooLong`](ValidationError::BodyTooLong) | message text over the kind's limit |
//! | [`SenderInvalid`](ValidationError::SenderInvalid) | phone number or email address malformed |
//! | [`HandleInvalid`](ValidationError::HandleInvalid) | tweet sender is not an `@` handle of ≤16 chars |
//! | [`SubjectLengthInvalid`](ValidationError::SubjectLengthInvalid) | subject too long, or SIR subject not 12 chars |
//! | [`IncidentUnrecognised`](ValidationError::IncidentUnrecognised) | nature of incident not in the catalog |
use thiserror::Error;

use crate::types::MessageKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("header must be exactly 10 characters, got {actual}")]
    HeaderLengthInvalid { actual: usize },

    #[error("header characters 2-10 must be numeric: {digits:?}")]
    HeaderNotNumeric { digits: String },

    #[error("header must start with S, E or T, got {prefix:?}")]
    HeaderKindUnrecognised { prefix: char },

    #[error("{kind} body needs at least {expected} lines, got {actual}")]
    BodyIncomplete {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} character limit ({limit}) exceeded: {actual} characters")]
    BodyTooLong {
        kind: MessageKind,
        limit: usize,
        actual: usize,
    },

    /// Phone number (SMS) or email address (email) did not match its grammar.
    #[error("no valid sender found for {kind}: {sender:?}")]
    SenderInvalid { kind: MessageKind, sender: String },

    #[error("invalid twitter ID {handle:?}: must start with '@' and be at most {limit} characters")]
    HandleInvalid { handle: String, limit: usize },

    #[error("subject {subject:?} has invalid length: expected {expected}")]
    SubjectLengthInvalid { subject: String, expected: String },

    #[error("incident {0:?} is not a recognised nature of incident")]
    IncidentUnrecognised(String),

    #[error("message body still contains the input prompt")]
    PlaceholderNotReplaced,
}

impl ValidationError {
    /// True for failures that concern the header rather than the body.
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            ValidationError::HeaderLengthInvalid { .. }
                | ValidationError::HeaderNotNumeric { .. }
                | ValidationError::HeaderKindUnrecognised { .. }
        )
    }
}
