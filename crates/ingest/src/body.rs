//! Per-kind body grammars.
//!
//! Bodies are line oriented:
//!
//! ```text
//! SMS / tweet      email                 SIR email
//! -----------      -----------------     -----------------
//! sender           sender                sender
//! text...          subject               subject (SIR ...)
//!                  text...               sort code
//!                                        nature of incident
//!                                        text...
//! ```
//!
//! SMS and tweet text is the second line only; anything after it is dropped.
//! Email text runs from the last fixed field to the end of the body. An SIR
//! is measured as it is stored, sort code and nature of incident included.
use tracing::debug;

use crate::config::ValidationConfig;
use crate::error::ValidationError;
use crate::incidents::IncidentCatalog;
use crate::sender::{is_email_address, is_phone_number, is_twitter_handle};
use crate::types::{IncidentReport, MessageBody, MessageKind};

const SIR_PREFIX: &str = "SIR";
const SMS_LINES: usize = 2;
const TWEET_LINES: usize = 2;
const EMAIL_LINES: usize = 3;
const SIR_LINES: usize = 5;

/// Sender, optional subject and body of a validated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidatedBody {
    pub(crate) sender: String,
    pub(crate) subject: Option<String>,
    pub(crate) body: MessageBody,
}

/// Splits a body into lines, tolerating CRLF and ignoring one trailing newline.
pub(crate) fn split_lines(body: &str) -> Vec<&str> {
    body.lines().collect()
}

fn ensure_lines(kind: MessageKind, lines: &[&str], expected: usize) -> Result<(), ValidationError> {
    if lines.len() < expected {
        return Err(ValidationError::BodyIncomplete {
            kind,
            expected,
            actual: lines.len(),
        });
    }
    Ok(())
}

fn ensure_text_len(kind: MessageKind, text: &str, cfg: &ValidationConfig) -> Result<(), ValidationError> {
    let limit = cfg.max_chars_for(kind);
    let actual = text.chars().count();
    if actual > limit {
        return Err(ValidationError::BodyTooLong {
            kind,
            limit,
            actual,
        });
    }
    Ok(())
}

fn ensure_filled_in(body: &str, cfg: &ValidationConfig) -> Result<(), ValidationError> {
    if !cfg.placeholder_prefix.is_empty() && body.starts_with(cfg.placeholder_prefix.as_str()) {
        return Err(ValidationError::PlaceholderNotReplaced);
    }
    Ok(())
}

/// The single text line of an SMS or tweet.
fn text_line<'a>(kind: MessageKind, lines: &[&'a str]) -> &'a str {
    if lines.len() > 2 {
        debug!(kind = %kind, ignored = lines.len() - 2, "extra_body_lines_ignored");
    }
    lines[1]
}

pub(crate) fn validate_sms(body: &str, cfg: &ValidationConfig) -> Result<ValidatedBody, ValidationError> {
    let kind = MessageKind::Sms;
    ensure_filled_in(body, cfg)?;

    let lines = split_lines(body);
    ensure_lines(kind, &lines, SMS_LINES)?;

    let sender = lines[0].trim();
    if !is_phone_number(sender, cfg.min_phone_chars) {
        return Err(ValidationError::SenderInvalid {
            kind,
            sender: sender.to_string(),
        });
    }

    let text = text_line(kind, &lines).to_string();
    ensure_text_len(kind, &text, cfg)?;

    Ok(ValidatedBody {
        sender: sender.to_string(),
        subject: None,
        body: MessageBody::Text(text),
    })
}

pub(crate) fn validate_tweet(
    body: &str,
    cfg: &ValidationConfig,
) -> Result<ValidatedBody, ValidationError> {
    let kind = MessageKind::Tweet;
    ensure_filled_in(body, cfg)?;

    let lines = split_lines(body);
    ensure_lines(kind, &lines, TWEET_LINES)?;

    let sender = lines[0].trim();
    if !is_twitter_handle(sender, cfg.handle_max_chars) {
        return Err(ValidationError::HandleInvalid {
            handle: sender.to_string(),
            limit: cfg.handle_max_chars,
        });
    }

    let text = text_line(kind, &lines).to_string();
    ensure_text_len(kind, &text, cfg)?;

    Ok(ValidatedBody {
        sender: sender.to_string(),
        subject: None,
        body: MessageBody::Text(text),
    })
}

pub(crate) fn validate_email(
    body: &str,
    cfg: &ValidationConfig,
    catalog: &IncidentCatalog,
) -> Result<ValidatedBody, ValidationError> {
    let kind = MessageKind::Email;
    ensure_filled_in(body, cfg)?;

    let lines = split_lines(body);
    ensure_lines(kind, &lines, EMAIL_LINES)?;

    let sender = lines[0].trim();
    let subject = lines[1].trim();
    let is_incident = subject.starts_with(SIR_PREFIX);
    if is_incident {
        ensure_lines(kind, &lines, SIR_LINES)?;
    }

    if !is_email_address(sender) {
        return Err(ValidationError::SenderInvalid {
            kind,
            sender: sender.to_string(),
        });
    }

    let subject_len = subject.chars().count();
    if subject_len > cfg.subject_max_chars {
        return Err(ValidationError::SubjectLengthInvalid {
            subject: subject.to_string(),
            expected: format!("at most {}", cfg.subject_max_chars),
        });
    }

    let body = if is_incident {
        if subject_len != cfg.sir_subject_chars {
            return Err(ValidationError::SubjectLengthInvalid {
                subject: subject.to_string(),
                expected: format!("exactly {} for an SIR", cfg.sir_subject_chars),
            });
        }

        let nature = lines[3].trim();
        if !catalog.contains(nature) {
            return Err(ValidationError::IncidentUnrecognised(nature.to_string()));
        }

        let sort_code = lines[2].trim();
        let text = trimmed_text(&lines[4..]);
        ensure_text_len(kind, &format!("{sort_code}\n{nature}\n{text}"), cfg)?;
        MessageBody::Incident(IncidentReport {
            sort_code: sort_code.to_string(),
            nature_of_incident: nature.to_string(),
            text,
        })
    } else {
        let text = trimmed_text(&lines[2..]);
        ensure_text_len(kind, &text, cfg)?;
        MessageBody::Text(text)
    };

    Ok(ValidatedBody {
        sender: sender.to_string(),
        subject: Some(subject.to_string()),
        body,
    })
}

fn trimmed_text(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ValidationConfig {
        ValidationConfig::default()
    }

    #[test]
    fn crlf_and_lf_split_alike() {
        assert_eq!(split_lines("a\r\nb\r\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
    }

    #[test]
    fn sms_drops_lines_after_text() {
        let out = validate_sms("+447911123456\nfirst\nsecond", &cfg()).expect("valid sms");
        assert_eq!(out.body, MessageBody::Text("first".into()));
        assert_eq!(out.subject, None);
    }

    #[test]
    fn tweet_extra_lines_do_not_count_toward_limit() {
        let body = format!("@desk\nshort\n{}", "x".repeat(200));
        let out = validate_tweet(&body, &cfg()).expect("valid tweet");
        assert_eq!(out.body, MessageBody::Text("short".into()));
    }

    #[test]
    fn sms_missing_text_is_incomplete() {
        assert!(matches!(
            validate_sms("+447911123456\n", &cfg()),
            Err(ValidationError::BodyIncomplete {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn sms_invalid_sender() {
        assert!(matches!(
            validate_sms("not-a-number\nhello", &cfg()),
            Err(ValidationError::SenderInvalid {
                kind: MessageKind::Sms,
                ..
            })
        ));
    }

    #[test]
    fn sms_limit_counts_characters_not_bytes() {
        let text = "\u{e9}".repeat(140);
        assert!(validate_sms(&format!("+447911123456\n{text}"), &cfg()).is_ok());
    }

    #[test]
    fn placeholder_detected_for_every_kind() {
        let body = "Sender: type here\nMessage";
        assert_eq!(
            validate_sms(body, &cfg()),
            Err(ValidationError::PlaceholderNotReplaced)
        );
        assert_eq!(
            validate_tweet(body, &cfg()),
            Err(ValidationError::PlaceholderNotReplaced)
        );
        assert_eq!(
            validate_email(body, &cfg(), &IncidentCatalog::standard()),
            Err(ValidationError::PlaceholderNotReplaced)
        );
    }

    #[test]
    fn tweet_handle_rules() {
        assert!(validate_tweet("@napierbank\nhi", &cfg()).is_ok());
        assert!(matches!(
            validate_tweet("napierbank\nhi", &cfg()),
            Err(ValidationError::HandleInvalid { .. })
        ));
        assert!(matches!(
            validate_tweet("@averyveryverylonghandle\nhi", &cfg()),
            Err(ValidationError::HandleInvalid { limit: 16, .. })
        ));
    }

    #[test]
    fn standard_email_fields_trimmed() {
        let body = " ops@napier.ac.uk \n Weekly report \n  All quiet.  ";
        let out = validate_email(body, &cfg(), &IncidentCatalog::standard()).expect("valid email");
        assert_eq!(out.sender, "ops@napier.ac.uk");
        assert_eq!(out.subject.as_deref(), Some("Weekly report"));
        assert_eq!(out.body, MessageBody::Text("All quiet.".into()));
    }

    #[test]
    fn email_subject_too_long() {
        let body = "ops@napier.ac.uk\nThis subject is far too long\ntext";
        assert!(matches!(
            validate_email(body, &cfg(), &IncidentCatalog::standard()),
            Err(ValidationError::SubjectLengthInvalid { .. })
        ));
    }

    #[test]
    fn sir_email_parsed_into_sections() {
        let body = "ops@napier.ac.uk\nSIR 01/01/23\n11-22-33\nstaff attack\nTeller assaulted.";
        let out = validate_email(body, &cfg(), &IncidentCatalog::standard()).expect("valid sir");
        assert_eq!(
            out.body,
            MessageBody::Incident(IncidentReport {
                sort_code: "11-22-33".into(),
                nature_of_incident: "staff attack".into(),
                text: "Teller assaulted.".into(),
            })
        );
    }

    #[test]
    fn sir_needs_five_lines() {
        let body = "ops@napier.ac.uk\nSIR 01/01/23\n11-22-33\nTheft";
        assert!(matches!(
            validate_email(body, &cfg(), &IncidentCatalog::standard()),
            Err(ValidationError::BodyIncomplete {
                expected: 5,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn sir_subject_must_be_exact_length() {
        let body = "ops@napier.ac.uk\nSIR20230101\n11-22-33\nTheft\ntext";
        assert!(matches!(
            validate_email(body, &cfg(), &IncidentCatalog::standard()),
            Err(ValidationError::SubjectLengthInvalid { .. })
        ));
    }

    #[test]
    fn sir_unknown_incident() {
        let body = "ops@napier.ac.uk\nSIR 01/01/23\n11-22-33\nShoplifting\ntext";
        assert_eq!(
            validate_email(body, &cfg(), &IncidentCatalog::standard()),
            Err(ValidationError::IncidentUnrecognised("Shoplifting".into()))
        );
    }

    #[test]
    fn sir_limit_includes_sort_code_and_incident() {
        // 8 + 1 + 5 + 1 + 1014 = 1029
        let body = format!(
            "ops@napier.ac.uk\nSIR 01/01/23\n11-22-33\nTheft\n{}",
            "x".repeat(1014)
        );
        assert_eq!(
            validate_email(&body, &cfg(), &IncidentCatalog::standard()),
            Err(ValidationError::BodyTooLong {
                kind: MessageKind::Email,
                limit: 1028,
                actual: 1029,
            })
        );

        let fits = format!(
            "ops@napier.ac.uk\nSIR 01/01/23\n11-22-33\nTheft\n{}",
            "x".repeat(1013)
        );
        assert!(validate_email(&fits, &cfg(), &IncidentCatalog::standard()).is_ok());
    }

    #[test]
    fn email_text_limit() {
        let body = format!("ops@napier.ac.uk\nHello\n{}", "x".repeat(1029));
        assert!(matches!(
            validate_email(&body, &cfg(), &IncidentCatalog::standard()),
            Err(ValidationError::BodyTooLong {
                limit: 1028,
                actual: 1029,
                ..
            })
        ));
    }
}
