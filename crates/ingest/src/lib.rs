//! Msgdesk Ingest Layer
//!
//! This is where pasted messages enter the desk. We take a raw header and a
//! raw body, work out whether the message is an SMS, an email or a tweet, and
//! check the body against that kind's rules. What comes out is a typed
//! [`ParsedMessage`] the sanitiser can transform without re-parsing anything.
//!
//! ## What we do here
//!
//! - **Classify** - The header is one kind letter (`S`, `E`, `T`) plus nine
//!   digits. Anything else is rejected before the body is looked at.
//! - **Validate senders** - Phone numbers for SMS, email addresses for email,
//!   `@` handles for tweets.
//! - **Enforce limits** - Text, subject and handle lengths per kind.
//! - **Parse incident reports** - Emails with an `SIR` subject carry a sort
//!   code and a nature of incident, checked against the [`IncidentCatalog`].
//! - **Log everything** - Structured logs via tracing for every accept/reject.
//!
//! Nothing in this crate performs I/O or holds state between calls.
//!
//! ## Example
//!
//! ```
//! use ingest::{classify_and_validate, MessageKind, MessageBody};
//!
//! let msg = classify_and_validate("S123456789", "+447911123456\nHello there").unwrap();
//! assert_eq!(msg.kind(), MessageKind::Sms);
//! assert_eq!(msg.sender, "+447911123456");
//! assert_eq!(msg.body, MessageBody::Text("Hello there".into()));
//! ```
use std::time::Instant;

use tracing::{info, warn, Level};

mod body;
mod config;
mod error;
mod header;
mod incidents;
mod sender;
mod types;

pub use crate::config::{ConfigError, ValidationConfig};
pub use crate::error::ValidationError;
pub use crate::header::{parse_header, HEADER_LEN};
pub use crate::incidents::{IncidentCatalog, NATURES_OF_INCIDENT};
pub use crate::sender::{is_email_address, is_phone_number, is_twitter_handle};
pub use crate::types::{IncidentReport, MessageBody, MessageHeader, MessageKind, ParsedMessage};

/// Classify and validate a raw submission using the default limits.
pub fn classify_and_validate(header: &str, body: &str) -> Result<ParsedMessage, ValidationError> {
    classify_and_validate_with_config(header, body, &ValidationConfig::default())
}

/// Classify and validate a raw submission with explicit limits.
pub fn classify_and_validate_with_config(
    header: &str,
    body: &str,
    cfg: &ValidationConfig,
) -> Result<ParsedMessage, ValidationError> {
    let start = Instant::now();

    let header = match parse_header(header) {
        Ok(header) => header,
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(error = %err, elapsed_micros, "validate_failure");
            return Err(err);
        }
    };

    // Pasted bodies often carry stray blank lines or indentation.
    let body = body.trim();

    let span = tracing::span!(
        Level::INFO,
        "ingest.validate",
        header = %header.text,
        kind = %header.kind
    );
    let _guard = span.enter();

    match validate_body(&header, body, cfg) {
        Ok(validated) => {
            let elapsed_micros = start.elapsed().as_micros();
            info!(
                sender = %validated.sender,
                incident = validated.body.is_incident(),
                text_len = validated.body.text().chars().count(),
                elapsed_micros,
                "validate_success"
            );
            Ok(ParsedMessage {
                header,
                sender: validated.sender,
                subject: validated.subject,
                body: validated.body,
            })
        }
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(error = %err, elapsed_micros, "validate_failure");
            Err(err)
        }
    }
}

fn validate_body(
    header: &MessageHeader,
    body: &str,
    cfg: &ValidationConfig,
) -> Result<body::ValidatedBody, ValidationError> {
    match header.kind {
        MessageKind::Sms => body::validate_sms(body, cfg),
        MessageKind::Email => body::validate_email(body, cfg, &IncidentCatalog::standard()),
        MessageKind::Tweet => body::validate_tweet(body, cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_length_checked_for_any_body() {
        for header in ["", "S", "S12345678", "S1234567890", "EMAIL"] {
            let res = classify_and_validate(header, "+447911123456\nHello");
            assert!(
                matches!(res, Err(ValidationError::HeaderLengthInvalid { .. })),
                "{header:?}"
            );
        }
    }

    #[test]
    fn header_checked_before_body() {
        let res = classify_and_validate("X000000000", "Sender prompt still here");
        assert_eq!(
            res,
            Err(ValidationError::HeaderKindUnrecognised { prefix: 'X' })
        );
    }

    #[test]
    fn leading_blank_line_in_body_ignored() {
        let msg = classify_and_validate("S123456789", "\n+447911123456\nHello there\n\n")
            .expect("surrounding whitespace is trimmed");
        assert_eq!(msg.sender, "+447911123456");
        assert_eq!(msg.body.text(), "Hello there");
    }

    #[test]
    fn indented_prompt_is_placeholder() {
        let res = classify_and_validate(
            "E000000001",
            "  Sender\nSubject (if applicable)\nMessage body",
        );
        assert_eq!(res, Err(ValidationError::PlaceholderNotReplaced));
    }

    #[test]
    fn sms_accepted_unchanged() {
        let msg = classify_and_validate("S123456789", "+447911123456\nHello there")
            .expect("sms should validate");
        assert_eq!(msg.header_text(), "S123456789");
        assert_eq!(msg.subject, None);
        assert_eq!(msg.body.text(), "Hello there");
    }

    #[test]
    fn sms_over_limit_rejected() {
        let body = format!("+447911123456\n{}", "a".repeat(141));
        assert!(matches!(
            classify_and_validate("S123456789", &body),
            Err(ValidationError::BodyTooLong {
                kind: MessageKind::Sms,
                limit: 140,
                actual: 141,
            })
        ));
    }

    #[test]
    fn email_carries_subject() {
        let msg = classify_and_validate(
            "E000000001",
            "jane@napier.ac.uk\nQuarterly\nSee https://example.com/x",
        )
        .expect("email should validate");
        assert_eq!(msg.kind(), MessageKind::Email);
        assert_eq!(msg.subject.as_deref(), Some("Quarterly"));
        assert!(!msg.is_incident_report());
    }

    #[test]
    fn sir_email_is_incident_report() {
        let msg = classify_and_validate(
            "e000000002",
            "jane@napier.ac.uk\nSIR 01/01/23\nSC001\nTheft\nWallet taken",
        )
        .expect("sir should validate");
        assert!(msg.is_incident_report());
        let report = msg.body.incident().expect("incident body");
        assert_eq!(report.sort_code, "SC001");
        assert_eq!(report.nature_of_incident, "Theft");
        assert_eq!(report.text, "Wallet taken");
    }

    #[test]
    fn tweet_handle_validated() {
        let msg = classify_and_validate("T999999999", "@desk\nGreat #deals today")
            .expect("tweet should validate");
        assert_eq!(msg.kind(), MessageKind::Tweet);
        assert_eq!(msg.sender, "@desk");

        assert!(matches!(
            classify_and_validate("T999999999", "desk\nhello"),
            Err(ValidationError::HandleInvalid { .. })
        ));
    }

    #[test]
    fn custom_limits_respected() {
        let cfg = ValidationConfig {
            tweet_max_chars: 5,
            ..Default::default()
        };
        assert!(matches!(
            classify_and_validate_with_config("T000000001", "@desk\nhello!", &cfg),
            Err(ValidationError::BodyTooLong { limit: 5, .. })
        ));
    }
}
