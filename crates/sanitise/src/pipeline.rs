use ingest::{MessageBody, MessageKind, ParsedMessage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abbreviations::AbbreviationTable;
use crate::effects::SideEffect;
use crate::message::SanitisedMessage;
use crate::token::{map_lines, tokenize};
use crate::url::{is_absolute_url, URL_QUARANTINED};

/// Sanitised message plus the aggregate updates it asks for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sanitised {
    pub message: SanitisedMessage,
    pub effects: Vec<SideEffect>,
}

/// Main entry point. Transforms a validated message according to its kind.
///
/// - SMS: abbreviations expanded in place, no effects.
/// - Email: absolute URLs replaced with `<URL Quarantined>`, one
///   [`SideEffect::QuarantineUrl`] per occurrence; incident reports also emit
///   [`SideEffect::RecordSir`] and are laid out as sort code, nature of
///   incident and text on three lines.
/// - Tweet: abbreviations expanded, then every `#tag` and `@handle` token of
///   the expanded text reported.
pub fn sanitise(parsed: ParsedMessage, abbreviations: &AbbreviationTable) -> Sanitised {
    let kind = parsed.kind();
    let ParsedMessage {
        header,
        sender,
        subject,
        body,
    } = parsed;

    let mut effects = Vec::new();
    let body = match (kind, body) {
        (MessageKind::Sms, body) => expand_abbreviations(body.text(), abbreviations),
        (MessageKind::Tweet, body) => map_lines(body.text().trim(), |line| {
            let tokens = expand_tokens(line, abbreviations);
            collect_tweet_effects(&tokens, &mut effects);
            tokens.join(" ")
        }),
        (MessageKind::Email, MessageBody::Text(text)) => quarantine_urls(&text, &mut effects),
        (MessageKind::Email, MessageBody::Incident(report)) => {
            let text = quarantine_urls(&report.text, &mut effects);
            let body = format!(
                "{}\n{}\n{}",
                report.sort_code, report.nature_of_incident, text
            );
            effects.push(SideEffect::RecordSir {
                sort_code: report.sort_code,
                nature_of_incident: report.nature_of_incident,
            });
            body
        }
    };

    debug!(
        header = %header.text,
        kind = %kind,
        effects = effects.len(),
        "sanitise_complete"
    );

    Sanitised {
        message: SanitisedMessage {
            header: header.text,
            sender,
            subject,
            body,
        },
        effects,
    }
}

/// Inserts `<expansion>` after every token found in the table. The original
/// token is kept.
pub fn expand_abbreviations(text: &str, abbreviations: &AbbreviationTable) -> String {
    map_lines(text.trim(), |line| {
        expand_tokens(line, abbreviations).join(" ")
    })
}

/// Token sequence of one line after expansion. Each `<expansion>` is a single
/// token however many words it holds.
fn expand_tokens(line: &str, abbreviations: &AbbreviationTable) -> Vec<String> {
    let mut out = Vec::new();
    for token in tokenize(line) {
        out.push(token.to_string());
        if let Some(expansion) = abbreviations.expand(token) {
            out.push(format!("<{expansion}>"));
        }
    }
    out
}

/// Replaces every absolute URL token with the quarantine marker.
pub fn quarantine_urls(text: &str, effects: &mut Vec<SideEffect>) -> String {
    map_lines(text.trim(), |line| {
        tokenize(line)
            .into_iter()
            .map(|token| {
                if is_absolute_url(token) {
                    effects.push(SideEffect::QuarantineUrl(token.to_string()));
                    URL_QUARANTINED
                } else {
                    token
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    })
}

fn collect_tweet_effects(tokens: &[String], effects: &mut Vec<SideEffect>) {
    for token in tokens {
        if token.len() <= 1 {
            continue;
        }
        if token.starts_with('#') {
            effects.push(SideEffect::ObserveTag(token.clone()));
        } else if token.starts_with('@') {
            effects.push(SideEffect::ObserveMention(token.clone()));
        }
    }
}
