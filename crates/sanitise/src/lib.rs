//! Msgdesk sanitisation layer.
//!
//! Takes a validated message and rewrites its body the way the desk wants
//! it stored: textspeak expanded, links defused, tags and handles picked out.
//!
//! ## What we do
//!
//! - SMS and tweets: append `<expansion>` after every known abbreviation
//! - Emails: replace absolute URLs with `<URL Quarantined>`
//! - Incident reports: lay out sort code, nature of incident and text
//! - Tweets: report `#tags` and `@handles`
//!
//! ## Pure function guarantee
//!
//! No I/O, no shared state. [`sanitise`] returns the new message together
//! with a list of [`SideEffect`]s; applying them is the aggregate store's job.
//! Same message + same abbreviation table = same output.

mod abbreviations;
mod effects;
mod message;
mod pipeline;
mod token;
mod url;

pub use crate::abbreviations::AbbreviationTable;
pub use crate::effects::SideEffect;
pub use crate::message::SanitisedMessage;
pub use crate::pipeline::{expand_abbreviations, quarantine_urls, sanitise, Sanitised};
pub use crate::token::tokenize;
pub use crate::url::{is_absolute_url, URL_QUARANTINED};
