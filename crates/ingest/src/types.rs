//! Core message types produced by the validation stage.
//!
//! A raw submission is a `(header, body)` pair of free text. Validation turns
//! it into a [`ParsedMessage`]: a typed record whose shape already reflects the
//! message kind, so downstream stages never re-parse the body to find out what
//! they are looking at.
//!
//! # Type Overview
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`MessageKind`] | SMS, email or tweet, derived from the header prefix |
//! | [`MessageHeader`] | The normalised 10-character header and its numeric id |
//! | [`MessageBody`] | Plain text, or the three sections of an incident report |
//! | [`IncidentReport`] | Sort code, nature of incident and message text of an SIR |
//! | [`ParsedMessage`] | The complete validated record handed to sanitisation |
use std::fmt;

use serde::{Deserialize, Serialize};

/// Message category, selected by the first character of the header.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Header prefix `S`.
    Sms,
    /// Header prefix `E`.
    Email,
    /// Header prefix `T`.
    Tweet,
}

impl MessageKind {
    /// Resolve a header prefix (case-insensitive) to a kind.
    ///
    /// ```rust
    /// use ingest::MessageKind;
    ///
    /// assert_eq!(MessageKind::from_prefix('t'), Some(MessageKind::Tweet));
    /// assert_eq!(MessageKind::from_prefix('X'), None);
    /// ```
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'S' => Some(MessageKind::Sms),
            'E' => Some(MessageKind::Email),
            'T' => Some(MessageKind::Tweet),
            _ => None,
        }
    }

    pub fn prefix(self) -> char {
        match self {
            MessageKind::Sms => 'S',
            MessageKind::Email => 'E',
            MessageKind::Tweet => 'T',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Sms => "sms",
            MessageKind::Email => "email",
            MessageKind::Tweet => "tweet",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A header that passed all three header checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageHeader {
    /// Trimmed, uppercased header text (always 10 characters).
    pub text: String,
    /// Kind derived from the first character.
    pub kind: MessageKind,
    /// Numeric id carried in characters 1..10.
    pub id: u32,
}

/// The three sections of a Suspicious Incident Report body.
///
/// Incident emails are carried as a structured triple once past validation,
/// so no separator character ever has to be re-parsed out of user text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentReport {
    pub sort_code: String,
    pub nature_of_incident: String,
    pub text: String,
}

/// Validated message body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageBody {
    /// SMS text, tweet text, or the text of a standard email.
    Text(String),
    /// Body of an email whose subject starts with `SIR`.
    Incident(IncidentReport),
}

impl MessageBody {
    /// Free text portion of the body, ignoring incident sections.
    pub fn text(&self) -> &str {
        match self {
            MessageBody::Text(text) => text,
            MessageBody::Incident(report) => &report.text,
        }
    }

    pub fn incident(&self) -> Option<&IncidentReport> {
        match self {
            MessageBody::Text(_) => None,
            MessageBody::Incident(report) => Some(report),
        }
    }

    pub fn is_incident(&self) -> bool {
        matches!(self, MessageBody::Incident(_))
    }
}

/// A message that passed header and body validation.
///
/// Only [`classify_and_validate`](crate::classify_and_validate) builds these;
/// `subject` is `Some` exactly when `header.kind` is [`MessageKind::Email`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedMessage {
    pub header: MessageHeader,
    pub sender: String,
    pub subject: Option<String>,
    pub body: MessageBody,
}

impl ParsedMessage {
    pub fn kind(&self) -> MessageKind {
        self.header.kind
    }

    pub fn header_text(&self) -> &str {
        &self.header.text
    }

    /// True for emails whose subject marks them as incident reports.
    pub fn is_incident_report(&self) -> bool {
        self.body.is_incident()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_round_trips_for_every_kind() {
        for kind in [MessageKind::Sms, MessageKind::Email, MessageKind::Tweet] {
            assert_eq!(MessageKind::from_prefix(kind.prefix()), Some(kind));
            assert_eq!(
                MessageKind::from_prefix(kind.prefix().to_ascii_lowercase()),
                Some(kind)
            );
        }
    }

    #[test]
    fn body_text_of_incident_is_message_section() {
        let body = MessageBody::Incident(IncidentReport {
            sort_code: "11-22-33".into(),
            nature_of_incident: "Theft".into(),
            text: "Card stolen at branch".into(),
        });
        assert_eq!(body.text(), "Card stolen at branch");
        assert!(body.is_incident());
        assert_eq!(body.incident().map(|r| r.sort_code.as_str()), Some("11-22-33"));
    }
}
